pub mod broadcast;
pub mod catalog;
pub mod downloader;
pub mod engine;
pub mod posted;
pub mod selector;
pub mod verifier;

pub use crate::domain::model::{CatalogRecord, DispatchReceipt, RunReport, VerifiedImage};
pub use crate::domain::ports::{Broadcaster, ImageVerifier, Storage};
pub use crate::utils::error::Result;

pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::{CliConfig, DownloadArgs};
pub use config::{BroadcastConfig, DownloadConfig};

pub use adapters::resend::ResendClient;
pub use adapters::storage::LocalStorage;
pub use crate::core::broadcast::{BroadcastTemplate, ResendBroadcaster};
pub use crate::core::engine::{BroadcastEngine, RetryPolicy};
pub use crate::core::posted::{PostedSet, PostedStore};
pub use crate::core::verifier::HttpImageVerifier;
pub use domain::model::{RunReport, SendConfirmation};
pub use utils::error::{BroadcastError, Result};

// Adapters layer: concrete implementations for external systems.

pub mod archive;
pub mod resend;
pub mod storage;

use guard_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClockError {
    #[error("Watermark persistence failed: {0}")]
    Persistence(#[from] StoreError),

    #[error("Network time unavailable: {0}")]
    NetworkTime(String),
}

use guard_crypto::CryptoError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage backend failure: {0}")]
    Backend(String),

    #[error("Record sealing failed: {0}")]
    Sealing(#[from] CryptoError),

    #[error("Record encoding failed: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("Nothing to import")]
    EmptyImport,
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Backend(e.to_string())
    }
}

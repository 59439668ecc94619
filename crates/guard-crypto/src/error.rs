use thiserror::Error;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("Invalid salt length: expected {expected} bytes, got {got}")]
    InvalidSaltLength { expected: usize, got: usize },

    #[error("Envelope too short")]
    EnvelopeTooShort,

    #[error("Invalid recipient identifier: {0}")]
    InvalidRecipient(String),

    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Decryption failed: {0}")]
    DecryptionFailed(String),

    #[error("Random number generation failed: {0}")]
    RngFailed(String),
}

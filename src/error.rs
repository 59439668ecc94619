use guard_clock::ClockError;
use guard_crypto::CryptoError;
use guard_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LinkError {
    #[error("Invalid recipient identifier")]
    InvalidRecipient,

    #[error("Nothing to share")]
    EmptyInput,

    #[error("Malformed distribution link")]
    MalformedUri,

    /// Uniform verdict for every decrypt failure: wrong device, corruption,
    /// and tampering are deliberately indistinguishable.
    #[error("This link was issued to a different device")]
    NotForThisDevice,

    #[error("This link has expired")]
    Expired,

    #[error("Device clock appears to have been rolled back")]
    ClockTampered,

    #[error("No profile is selected")]
    NothingSelected,

    #[error("Cryptography failure: {0}")]
    Crypto(#[from] CryptoError),

    #[error("Profile store failure: {0}")]
    Store(#[from] StoreError),

    #[error("Clock failure: {0}")]
    Clock(#[from] ClockError),
}

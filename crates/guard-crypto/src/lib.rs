//! Cryptographic core for device-bound configuration distribution.
//!
//! Key derivation (PBKDF2-HMAC-SHA256), the AES-256-GCM envelope format,
//! the transport and at-rest cipher instances, and the device identity the
//! whole scheme is keyed from.

pub mod device_lock;
pub mod encoding;
pub mod envelope;
pub mod error;
pub mod identity;
pub mod kdf;
pub mod types;
pub mod vault;

pub use device_lock::{is_valid_recipient, open, seal, PUBLIC_RECIPIENT_ID};
pub use encoding::{base64_decode, base64_encode, base64url_decode, base64url_encode};
pub use envelope::{open_raw, seal_raw};
pub use error::CryptoError;
pub use identity::{
    is_valid_fingerprint, DeviceIdentity, DEFECTIVE_PLATFORM_IDS, FALLBACK_SEED,
    FINGERPRINT_LENGTH,
};
pub use kdf::{derive_key, APP_SECRET};
pub use types::{
    AES_GCM_IV_LENGTH, AES_GCM_TAG_LENGTH, AES_KEY_LENGTH, KDF_SALT_LENGTH, MIN_ENVELOPE_LENGTH,
    PBKDF2_ITERATIONS,
};
pub use vault::{looks_encrypted, VaultCipher};

//! AES-256-GCM envelope core shared by the transport and at-rest ciphers.
//!
//! Wire format: [16 bytes: salt][12 bytes: IV][N bytes: ciphertext + tag]
//! The salt feeds key derivation; the IV feeds AES-GCM directly. Both are
//! freshly random per envelope and never reused.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};

use crate::error::CryptoError;
use crate::kdf::derive_key;
use crate::types::{AES_GCM_IV_LENGTH, KDF_SALT_LENGTH, MIN_ENVELOPE_LENGTH};

fn random_bytes<const N: usize>() -> Result<[u8; N], CryptoError> {
    let mut buf = [0u8; N];
    getrandom::getrandom(&mut buf).map_err(|e| CryptoError::RngFailed(e.to_string()))?;
    Ok(buf)
}

/// Seal `plaintext` for `identifier` with a fresh salt and IV.
pub fn seal_raw(identifier: &str, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let salt = random_bytes::<KDF_SALT_LENGTH>()?;
    let iv = random_bytes::<AES_GCM_IV_LENGTH>()?;

    let key = derive_key(identifier, &salt)?;
    let cipher = Aes256Gcm::new_from_slice(&key)
        .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;
    let nonce = Nonce::from_slice(&iv);
    let ciphertext = cipher
        .encrypt(nonce, plaintext)
        .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;

    let mut envelope = Vec::with_capacity(KDF_SALT_LENGTH + AES_GCM_IV_LENGTH + ciphertext.len());
    envelope.extend_from_slice(&salt);
    envelope.extend_from_slice(&iv);
    envelope.extend_from_slice(&ciphertext);
    Ok(envelope)
}

/// Open an envelope with the caller-supplied `identifier`.
///
/// The salt is read from the envelope itself; blobs shorter than
/// salt + IV + tag are rejected before any key derivation. Wrong identifier,
/// corruption, and tampering all surface as the same decryption error.
pub fn open_raw(identifier: &str, envelope: &[u8]) -> Result<Vec<u8>, CryptoError> {
    if envelope.len() < MIN_ENVELOPE_LENGTH {
        return Err(CryptoError::EnvelopeTooShort);
    }

    let salt = &envelope[..KDF_SALT_LENGTH];
    let iv = &envelope[KDF_SALT_LENGTH..KDF_SALT_LENGTH + AES_GCM_IV_LENGTH];
    let ciphertext = &envelope[KDF_SALT_LENGTH + AES_GCM_IV_LENGTH..];

    let key = derive_key(identifier, salt)?;
    let cipher = Aes256Gcm::new_from_slice(&key)
        .map_err(|e| CryptoError::DecryptionFailed(e.to_string()))?;
    let nonce = Nonce::from_slice(iv);
    cipher
        .decrypt(nonce, ciphertext)
        .map_err(|e| CryptoError::DecryptionFailed(e.to_string()))
}

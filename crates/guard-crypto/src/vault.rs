//! At-rest cipher session for locally persisted profile data.
//!
//! One session is constructed per process from the device seed and passed by
//! reference to callers; a seed change means constructing a new session.
//! Encryption fails closed: a failure is an error, never the plaintext
//! echoed back. Decryption is uniform, any failure is `None`.

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::encoding::{base64_decode, base64_encode};
use crate::envelope::{open_raw, seal_raw};
use crate::error::CryptoError;
use crate::types::MIN_ENVELOPE_LENGTH;

/// At-rest cipher session keyed from the device seed.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct VaultCipher {
    seed: String,
}

impl VaultCipher {
    /// Create a session keyed from the device seed.
    pub fn new(seed: impl Into<String>) -> Self {
        Self { seed: seed.into() }
    }

    /// Encrypt a record payload to the standard-base64 at-rest envelope.
    pub fn encrypt(&self, plaintext: &str) -> Result<String, CryptoError> {
        let envelope = seal_raw(&self.seed, plaintext.as_bytes())?;
        Ok(base64_encode(&envelope))
    }

    /// Decrypt an at-rest envelope. `None` on any failure.
    pub fn decrypt(&self, blob: &str) -> Option<String> {
        let envelope = base64_decode(blob).ok()?;
        let plaintext = open_raw(&self.seed, &envelope).ok()?;
        String::from_utf8(plaintext).ok()
    }
}

impl std::fmt::Debug for VaultCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultCipher").finish_non_exhaustive()
    }
}

/// Heuristic used while loading stored records: does `text` look like an
/// at-rest envelope rather than a legacy plaintext entry?
pub fn looks_encrypted(text: &str) -> bool {
    match base64_decode(text) {
        Ok(bytes) => bytes.len() >= MIN_ENVELOPE_LENGTH,
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encrypt_decrypt_round_trip() {
        let vault = VaultCipher::new("device-seed");
        let blob = vault.encrypt("{\"server\":\"10.0.0.1\"}").unwrap();
        assert_eq!(vault.decrypt(&blob).as_deref(), Some("{\"server\":\"10.0.0.1\"}"));
    }

    #[test]
    fn blob_is_standard_base64() {
        let vault = VaultCipher::new("device-seed");
        let blob = vault.encrypt("payload").unwrap();
        assert!(!blob.contains('-'));
        assert!(!blob.contains('_'));
    }

    #[test]
    fn other_session_decrypts_nothing() {
        let vault = VaultCipher::new("device-seed");
        let other = VaultCipher::new("another-seed");
        let blob = vault.encrypt("payload").unwrap();
        assert_eq!(other.decrypt(&blob), None);
    }

    #[test]
    fn same_seed_new_session_decrypts() {
        let blob = VaultCipher::new("device-seed").encrypt("payload").unwrap();
        let fresh = VaultCipher::new("device-seed");
        assert_eq!(fresh.decrypt(&blob).as_deref(), Some("payload"));
    }

    #[test]
    fn garbage_decrypts_to_none() {
        let vault = VaultCipher::new("device-seed");
        assert_eq!(vault.decrypt("not base64"), None);
        assert_eq!(vault.decrypt(""), None);
        assert_eq!(vault.decrypt("AAAA"), None);
    }

    #[test]
    fn looks_encrypted_on_fresh_envelope() {
        let vault = VaultCipher::new("device-seed");
        let blob = vault.encrypt("payload").unwrap();
        assert!(looks_encrypted(&blob));
    }

    #[test]
    fn looks_encrypted_rejects_plaintext() {
        assert!(!looks_encrypted("vmess://eyJhIjoxfQ=="));
        assert!(!looks_encrypted("plain text line"));
        assert!(!looks_encrypted(""));
    }

    #[test]
    fn debug_hides_seed() {
        let vault = VaultCipher::new("super-secret-seed");
        assert!(!format!("{:?}", vault).contains("super-secret-seed"));
    }
}

//! PBKDF2-HMAC-SHA256 key derivation for device-bound envelopes.

use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::error::CryptoError;
use crate::types::{AES_KEY_LENGTH, KDF_SALT_LENGTH, PBKDF2_ITERATIONS};

/// Application constant appended to every identifier before derivation.
///
/// Not secret in practice: confidentiality comes from the per-message random
/// salt and from the identifier being something only the legitimate device
/// supplies on decryption.
pub const APP_SECRET: &str = "CG-2025-xK9#mP@vL3";

/// Derive a 256-bit key from an identifier and a per-message salt.
///
/// # Arguments
/// * `identifier` - Recipient fingerprint or device seed
/// * `salt` - 16-byte random salt, transmitted alongside the ciphertext
///
/// # Returns
/// 32-byte derived key
pub fn derive_key(identifier: &str, salt: &[u8]) -> Result<[u8; AES_KEY_LENGTH], CryptoError> {
    if salt.len() != KDF_SALT_LENGTH {
        return Err(CryptoError::InvalidSaltLength {
            expected: KDF_SALT_LENGTH,
            got: salt.len(),
        });
    }
    let password = Zeroizing::new(format!("{}{}", identifier, APP_SECRET));
    let mut key = [0u8; AES_KEY_LENGTH];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, PBKDF2_ITERATIONS, &mut key);
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic() {
        let salt = [0x11u8; KDF_SALT_LENGTH];
        let a = derive_key("A3F7-B2C1-D9E4", &salt).unwrap();
        let b = derive_key("A3F7-B2C1-D9E4", &salt).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn different_salts_different_keys() {
        let a = derive_key("A3F7-B2C1-D9E4", &[0x01u8; KDF_SALT_LENGTH]).unwrap();
        let b = derive_key("A3F7-B2C1-D9E4", &[0x02u8; KDF_SALT_LENGTH]).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn different_identifiers_different_keys() {
        let salt = [0x11u8; KDF_SALT_LENGTH];
        let a = derive_key("A3F7-B2C1-D9E4", &salt).unwrap();
        let b = derive_key("0000-0000-0000", &salt).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn rejects_wrong_salt_length() {
        let err = derive_key("A3F7-B2C1-D9E4", &[0u8; 8]).unwrap_err();
        assert!(err.to_string().contains("salt length"));
    }
}

//! Stable device identity: seed resolution and display fingerprint.
//!
//! The seed is the root of the at-rest vault keying; the fingerprint is the
//! short human-enterable form an operator types to address an envelope to
//! this install. Neither is ever regenerated once resolved from a stable
//! platform identifier.

use sha2::{Digest, Sha256};

/// Seed used when the platform identifier is unusable.
pub const FALLBACK_SEED: &str = "v2rayNG-custom-vpn-2024";

/// Platform identifiers known to be shared across whole device batches
/// (emulator images, one infamous handset generation). Treated as absent.
pub const DEFECTIVE_PLATFORM_IDS: &[&str] = &["9774d56d682e549c"];

/// Display fingerprint length: three groups of four hex digits.
pub const FINGERPRINT_LENGTH: usize = 14;

/// A resolved device identity.
#[derive(Clone, PartialEq, Eq)]
pub struct DeviceIdentity {
    seed: String,
}

impl DeviceIdentity {
    /// Resolve the identity from the platform-stable identifier, falling
    /// back to [`FALLBACK_SEED`] when it is missing, blank, or denylisted.
    pub fn resolve(platform_id: Option<&str>) -> Self {
        let seed = match platform_id {
            Some(id) if !id.trim().is_empty() && !DEFECTIVE_PLATFORM_IDS.contains(&id) => {
                id.to_string()
            }
            _ => FALLBACK_SEED.to_string(),
        };
        Self { seed }
    }

    /// Build an identity from an already-known seed.
    pub fn from_seed(seed: impl Into<String>) -> Self {
        Self { seed: seed.into() }
    }

    /// The stable seed backing this identity.
    pub fn seed(&self) -> &str {
        &self.seed
    }

    /// `XXXX-XXXX-XXXX`: first 6 bytes of SHA-256(seed), uppercase hex,
    /// separated every four characters. Pure function of the seed.
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(self.seed.as_bytes());
        let mut out = String::with_capacity(FINGERPRINT_LENGTH);
        for (i, byte) in digest[..6].iter().enumerate() {
            if i > 0 && i % 2 == 0 {
                out.push('-');
            }
            out.push_str(&format!("{:02X}", byte));
        }
        out
    }
}

impl std::fmt::Debug for DeviceIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceIdentity")
            .field("fingerprint", &self.fingerprint())
            .finish()
    }
}

/// Exactly 14 characters, `HHHH-HHHH-HHHH`, uppercase hex digits.
pub fn is_valid_fingerprint(text: &str) -> bool {
    let bytes = text.as_bytes();
    if bytes.len() != FINGERPRINT_LENGTH {
        return false;
    }
    bytes.iter().enumerate().all(|(i, &b)| match i {
        4 | 9 => b == b'-',
        _ => matches!(b, b'0'..=b'9' | b'A'..=b'F'),
    })
}

//! Transport cipher for the device-lock distribution protocol.
//!
//! Envelopes are sealed against a recipient fingerprint and travel as
//! URL-safe base64. Sealing fails closed; opening is uniform, wrong
//! recipient, corruption, and tampering are all `None`, so the result never
//! acts as a decryption oracle.

use crate::encoding::{base64url_decode, base64url_encode};
use crate::envelope::{open_raw, seal_raw};
use crate::error::CryptoError;
use crate::identity::is_valid_fingerprint;

/// Recipient sentinel accepted by every install; envelopes sealed for it
/// are openable anywhere.
pub const PUBLIC_RECIPIENT_ID: &str = "PUBLIC-0000-0000";

/// True for identifiers `seal` accepts as a recipient.
pub fn is_valid_recipient(id: &str) -> bool {
    id == PUBLIC_RECIPIENT_ID || is_valid_fingerprint(id)
}

/// Seal `plaintext` for `recipient`, producing the URL-safe transport blob.
///
/// The recipient must be a well-formed fingerprint or the public sentinel;
/// anything else is rejected before key derivation.
pub fn seal(plaintext: &str, recipient: &str) -> Result<String, CryptoError> {
    if !is_valid_recipient(recipient) {
        return Err(CryptoError::InvalidRecipient(recipient.to_string()));
    }
    let envelope = seal_raw(recipient, plaintext.as_bytes())?;
    Ok(base64url_encode(&envelope))
}

/// Open a transport blob with the local fingerprint, then with the public
/// sentinel. `None` on any failure.
pub fn open(blob: &str, local_fingerprint: &str) -> Option<String> {
    let envelope = base64url_decode(blob).ok()?;
    let plaintext = open_raw(local_fingerprint, &envelope)
        .or_else(|_| open_raw(PUBLIC_RECIPIENT_ID, &envelope))
        .ok()?;
    String::from_utf8(plaintext).ok()
}

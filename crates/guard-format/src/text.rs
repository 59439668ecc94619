//! Tolerant text helpers for subscription bodies and link payloads.

use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD, URL_SAFE, URL_SAFE_NO_PAD};
use base64::Engine;

/// Decode base64 accepting either alphabet, padded or not, with embedded
/// whitespace stripped first. Subscription feeds disagree on all three.
pub fn decode_base64_tolerant(text: &str) -> Option<Vec<u8>> {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return None;
    }
    for engine in [&STANDARD, &STANDARD_NO_PAD, &URL_SAFE, &URL_SAFE_NO_PAD] {
        if let Ok(bytes) = engine.decode(&compact) {
            return Some(bytes);
        }
    }
    None
}

/// [`decode_base64_tolerant`] narrowed to UTF-8 text.
pub fn decode_base64_text(text: &str) -> Option<String> {
    decode_base64_tolerant(text).and_then(|bytes| String::from_utf8(bytes).ok())
}

/// Split input into trimmed, non-empty lines.
pub fn non_empty_lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines().map(str::trim).filter(|line| !line.is_empty())
}

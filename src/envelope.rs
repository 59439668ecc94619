//! Optional-expiry wrapper carried inside the sealed payload.
//!
//! A payload with an expiry travels as the two-field JSON object
//! `{"l": <line>, "e": <epoch ms>}`; one without travels as the bare line.
//! Decoding accepts both, so links minted before expiries existed keep
//! working.

use serde_json::Value;

/// Wrap a payload line, attaching `expires_at` when it is a positive
/// timestamp.
pub fn wrap(line: &str, expires_at: Option<i64>) -> String {
    match expires_at {
        Some(at) if at > 0 => serde_json::json!({ "l": line, "e": at }).to_string(),
        _ => line.to_string(),
    }
}

/// Recover the payload and its expiry. Anything that is not the two-field
/// object form, legacy bare lines included, comes back whole with no
/// expiry.
pub fn unwrap(text: &str) -> (String, Option<i64>) {
    let trimmed = text.trim();
    if !trimmed.starts_with('{') {
        return (text.to_string(), None);
    }
    let Ok(value) = serde_json::from_str::<Value>(trimmed) else {
        return (text.to_string(), None);
    };
    let Some(line) = value.get("l").and_then(Value::as_str) else {
        return (text.to_string(), None);
    };
    (line.to_string(), value.get("e").and_then(expiry_millis))
}

fn expiry_millis(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().filter(|ms| *ms > 0),
        Value::String(s) => s.trim().parse().ok().filter(|ms: &i64| *ms > 0),
        _ => None,
    }
}

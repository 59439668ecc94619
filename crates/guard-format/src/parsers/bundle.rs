//! Full multi-outbound bundle documents: a JSON object (or array of
//! objects) carrying `inbounds`, `outbounds`, and `routing` at top level.
//! Each document becomes one `Custom` record with the re-serialized
//! document kept as its raw backup.

use serde_json::Value;

use crate::error::FormatError;
use crate::profile::{Protocol, ProfileRecord};

const BUNDLE_KEYS: [&str; 3] = ["inbounds", "outbounds", "routing"];

fn is_bundle_object(value: &Value) -> bool {
    match value {
        Value::Object(map) => BUNDLE_KEYS.iter().all(|key| map.contains_key(*key)),
        _ => false,
    }
}

/// True when `text` parses as a bundle document or as a non-empty array of
/// bundle documents.
pub fn looks_like_bundle(text: &str) -> bool {
    match serde_json::from_str::<Value>(text.trim()) {
        Ok(Value::Array(items)) => !items.is_empty() && items.iter().all(is_bundle_object),
        Ok(value) => is_bundle_object(&value),
        Err(_) => false,
    }
}

/// Best-effort endpoint of the first outbound, for display and selection
/// continuity. Bundles without a recognizable endpoint keep an empty server.
fn first_outbound_endpoint(doc: &Value) -> (String, u16) {
    let candidates = [
        ["settings", "vnext"].as_slice(),
        ["settings", "servers"].as_slice(),
    ];
    let Some(outbound) = doc.get("outbounds").and_then(|o| o.get(0)) else {
        return (String::new(), 0);
    };
    for path in candidates {
        let mut node = outbound;
        for key in path {
            match node.get(key) {
                Some(next) => node = next,
                None => break,
            }
        }
        let Some(server) = node.get(0) else { continue };
        let address = server
            .get("address")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let port = super::json_port(server.get("port")).unwrap_or(0);
        if !address.is_empty() {
            return (address.to_string(), port);
        }
    }
    (String::new(), 0)
}

fn record_from_document(doc: &Value) -> Result<ProfileRecord, FormatError> {
    let raw = serde_json::to_string(doc).map_err(|e| FormatError::InvalidJson(e.to_string()))?;
    let (server, port) = first_outbound_endpoint(doc);
    let mut record = ProfileRecord::new(Protocol::Custom, server, port);
    record.remarks = doc
        .get("remarks")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    record.raw_config = Some(raw);
    Ok(record)
}

/// Parse a bundle input into records, in document order.
pub fn parse_bundle(text: &str) -> Result<Vec<ProfileRecord>, FormatError> {
    let value: Value =
        serde_json::from_str(text.trim()).map_err(|e| FormatError::InvalidJson(e.to_string()))?;
    match value {
        Value::Array(items) => {
            if items.is_empty() || !items.iter().all(is_bundle_object) {
                return Err(FormatError::malformed("bundle", "not an array of bundles"));
            }
            items.iter().map(record_from_document).collect()
        }
        value if is_bundle_object(&value) => Ok(vec![record_from_document(&value)?]),
        _ => Err(FormatError::malformed("bundle", "missing bundle keys")),
    }
}

//! VMess links: `vmess://` followed by a base64-encoded JSON body.

use serde_json::Value;

use crate::error::FormatError;
use crate::parsers::json_port;
use crate::profile::{Protocol, ProfileRecord};
use crate::text::decode_base64_text;

fn field(doc: &Value, key: &str) -> Option<String> {
    doc.get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .filter(|v| !v.is_empty())
}

pub fn parse(line: &str) -> Result<ProfileRecord, FormatError> {
    let body = line
        .trim()
        .strip_prefix("vmess://")
        .ok_or(FormatError::UnrecognizedScheme)?;
    let decoded = decode_base64_text(body).ok_or(FormatError::InvalidBase64)?;
    let doc: Value =
        serde_json::from_str(&decoded).map_err(|e| FormatError::InvalidJson(e.to_string()))?;

    let server = field(&doc, "add")
        .ok_or_else(|| FormatError::malformed("vmess", "missing server address"))?;
    let port = json_port(doc.get("port"))
        .ok_or_else(|| FormatError::malformed("vmess", "missing or invalid port"))?;
    let user_id =
        field(&doc, "id").ok_or_else(|| FormatError::malformed("vmess", "missing user id"))?;

    let mut record = ProfileRecord::new(Protocol::Vmess, server, port);
    record.remarks = field(&doc, "ps").unwrap_or_default();
    record.user_id = Some(user_id);
    record.method = field(&doc, "scy");
    record.network = field(&doc, "net");
    record.security = field(&doc, "tls");
    record.sni = field(&doc, "sni");
    Ok(record)
}

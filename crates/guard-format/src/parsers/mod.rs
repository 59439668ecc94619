//! Protocol-specific link parsers. Each submodule owns one link syntax and
//! produces a [`ProfileRecord`](crate::profile::ProfileRecord); the registry
//! decides which one runs.

pub mod bundle;
pub mod hysteria2;
pub mod shadowsocks;
pub mod socks;
pub mod trojan;
pub mod vless;
pub mod vmess;
pub mod wireguard;

use percent_encoding::percent_decode_str;
use url::Url;

use crate::error::FormatError;

/// Parse a link with the `url` crate, verifying the expected scheme.
pub(crate) fn parse_url(line: &str, protocol: &'static str) -> Result<Url, FormatError> {
    Url::parse(line.trim()).map_err(|e| FormatError::malformed(protocol, e.to_string()))
}

/// Percent-decoded, non-empty username part of the userinfo.
pub(crate) fn decoded_username(url: &Url) -> Option<String> {
    let raw = url.username();
    if raw.is_empty() {
        return None;
    }
    Some(percent_decode_str(raw).decode_utf8_lossy().into_owned())
}

/// Full percent-decoded userinfo. The URL parser splits `user:pass` at the
/// first colon; protocols whose credential is one opaque token (which may
/// itself contain colons) want the two halves rejoined.
pub(crate) fn decoded_userinfo(url: &Url) -> Option<String> {
    let user = decoded_username(url)?;
    match url.password() {
        Some(pass) => Some(format!(
            "{}:{}",
            user,
            percent_decode_str(pass).decode_utf8_lossy()
        )),
        None => Some(user),
    }
}

/// Host and port, both mandatory for every link syntax handled here.
pub(crate) fn host_port(url: &Url, protocol: &'static str) -> Result<(String, u16), FormatError> {
    let host = url
        .host_str()
        .filter(|h| !h.is_empty())
        .ok_or_else(|| FormatError::malformed(protocol, "missing host"))?;
    let port = url
        .port()
        .ok_or_else(|| FormatError::malformed(protocol, "missing port"))?;
    Ok((host.to_string(), port))
}

/// First non-empty value of a query parameter.
pub(crate) fn query_param(url: &Url, key: &str) -> Option<String> {
    url.query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
        .filter(|v| !v.is_empty())
}

/// Percent-decoded fragment, the conventional remarks slot.
pub(crate) fn fragment_remarks(url: &Url) -> String {
    url.fragment()
        .map(|f| percent_decode_str(f).decode_utf8_lossy().into_owned())
        .unwrap_or_default()
}

/// Port from a JSON value that may be a number or a numeric string.
pub(crate) fn json_port(value: Option<&serde_json::Value>) -> Option<u16> {
    match value {
        Some(serde_json::Value::Number(n)) => n.as_u64().and_then(|n| u16::try_from(n).ok()),
        Some(serde_json::Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    }
}

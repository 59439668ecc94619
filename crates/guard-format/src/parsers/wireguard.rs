//! WireGuard profiles, two syntaxes:
//!
//! - link form: `wireguard://<privatekey>@host:port?publickey=...#remarks`
//! - tunnel configuration file: `[Interface]` / `[Peer]` sections, imported
//!   as a single record with the whole file kept as raw backup.

use crate::error::FormatError;
use crate::parsers::{decoded_userinfo, fragment_remarks, host_port, parse_url, query_param};
use crate::profile::{Protocol, ProfileRecord};

pub fn parse(line: &str) -> Result<ProfileRecord, FormatError> {
    let url = parse_url(line, "wireguard")?;
    let private_key = decoded_userinfo(&url)
        .ok_or_else(|| FormatError::malformed("wireguard", "missing private key"))?;
    let (server, port) = host_port(&url, "wireguard")?;

    let mut record = ProfileRecord::new(Protocol::Wireguard, server, port);
    record.remarks = fragment_remarks(&url);
    record.password = Some(private_key);
    record.public_key = query_param(&url, "publickey");
    Ok(record)
}

/// True when `text` is a tunnel configuration file: it must begin with the
/// `[Interface]` header and also carry a `[Peer]` section.
pub fn looks_like_tunnel_conf(text: &str) -> bool {
    text.trim_start().starts_with("[Interface]") && text.contains("[Peer]")
}

/// Parse a tunnel configuration file into one record.
pub fn parse_conf(text: &str) -> Result<ProfileRecord, FormatError> {
    if !looks_like_tunnel_conf(text) {
        return Err(FormatError::malformed("wireguard", "not a tunnel configuration"));
    }

    let mut section = "";
    let mut private_key = None;
    let mut public_key = None;
    let mut endpoint = None;
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if line.starts_with('[') {
            section = line;
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let (key, value) = (key.trim(), value.trim());
        match (section, key) {
            ("[Interface]", "PrivateKey") => private_key = Some(value.to_string()),
            ("[Peer]", "PublicKey") => public_key = Some(value.to_string()),
            ("[Peer]", "Endpoint") => endpoint = Some(value.to_string()),
            _ => {}
        }
    }

    let endpoint =
        endpoint.ok_or_else(|| FormatError::malformed("wireguard", "missing peer endpoint"))?;
    let (server, port) = endpoint
        .rsplit_once(':')
        .and_then(|(host, port)| Some((host.to_string(), port.parse().ok()?)))
        .ok_or_else(|| FormatError::malformed("wireguard", "invalid peer endpoint"))?;

    let mut record = ProfileRecord::new(Protocol::Wireguard, server, port);
    record.password = private_key;
    record.public_key = public_key;
    record.raw_config = Some(text.to_string());
    Ok(record)
}

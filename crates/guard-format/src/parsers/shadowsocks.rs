//! Shadowsocks links, both encodings:
//!
//! - SIP002: `ss://base64(method:password)@host:port#remarks`
//! - legacy: `ss://base64(method:password@host:port)#remarks`

use percent_encoding::percent_decode_str;

use crate::error::FormatError;
use crate::profile::{Protocol, ProfileRecord};
use crate::text::decode_base64_text;

fn split_host_port(endpoint: &str) -> Result<(String, u16), FormatError> {
    let (host, port) = endpoint
        .rsplit_once(':')
        .ok_or_else(|| FormatError::malformed("shadowsocks", "missing port"))?;
    if host.is_empty() {
        return Err(FormatError::malformed("shadowsocks", "missing host"));
    }
    let port = port
        .parse()
        .map_err(|_| FormatError::malformed("shadowsocks", format!("invalid port: {}", port)))?;
    Ok((host.to_string(), port))
}

fn split_method_password(userinfo: &str) -> Result<(String, String), FormatError> {
    let (method, password) = userinfo
        .split_once(':')
        .ok_or_else(|| FormatError::malformed("shadowsocks", "missing cipher method"))?;
    Ok((method.to_string(), password.to_string()))
}

pub fn parse(line: &str) -> Result<ProfileRecord, FormatError> {
    let body = line
        .trim()
        .strip_prefix("ss://")
        .ok_or(FormatError::UnrecognizedScheme)?;
    let (body, fragment) = match body.split_once('#') {
        Some((b, f)) => (b, Some(f)),
        None => (body, None),
    };
    let remarks = fragment
        .map(|f| percent_decode_str(f).decode_utf8_lossy().into_owned())
        .unwrap_or_default();

    let (method, password, server, port) = match body.split_once('@') {
        // SIP002: userinfo is base64(method:password)
        Some((userinfo, endpoint)) => {
            let userinfo = decode_base64_text(userinfo).ok_or(FormatError::InvalidBase64)?;
            let (method, password) = split_method_password(&userinfo)?;
            let (server, port) = split_host_port(endpoint)?;
            (method, password, server, port)
        }
        // Legacy: the whole body is base64(method:password@host:port)
        None => {
            let decoded = decode_base64_text(body).ok_or(FormatError::InvalidBase64)?;
            let (userinfo, endpoint) = decoded
                .rsplit_once('@')
                .ok_or_else(|| FormatError::malformed("shadowsocks", "missing endpoint"))?;
            let (method, password) = split_method_password(userinfo)?;
            let (server, port) = split_host_port(endpoint)?;
            (method, password, server, port)
        }
    };

    let mut record = ProfileRecord::new(Protocol::Shadowsocks, server, port);
    record.remarks = remarks;
    record.method = Some(method);
    record.password = Some(password);
    Ok(record)
}

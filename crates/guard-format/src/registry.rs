//! Scheme dispatch. One static table maps link prefixes to their parsers;
//! adding a protocol means adding a row, not another branch.

use crate::error::FormatError;
use crate::parsers;
use crate::profile::{Protocol, ProfileRecord};

/// One row of the dispatch table: the protocol it yields, the URI prefixes
/// that select it, and the parser that runs.
pub struct SchemeParser {
    pub protocol: Protocol,
    pub prefixes: &'static [&'static str],
    parse: fn(&str) -> Result<ProfileRecord, FormatError>,
}

pub static SCHEME_PARSERS: &[SchemeParser] = &[
    SchemeParser {
        protocol: Protocol::Vmess,
        prefixes: &["vmess://"],
        parse: parsers::vmess::parse,
    },
    SchemeParser {
        protocol: Protocol::Shadowsocks,
        prefixes: &["ss://"],
        parse: parsers::shadowsocks::parse,
    },
    SchemeParser {
        protocol: Protocol::Socks,
        prefixes: &["socks://"],
        parse: parsers::socks::parse,
    },
    SchemeParser {
        protocol: Protocol::Trojan,
        prefixes: &["trojan://"],
        parse: parsers::trojan::parse,
    },
    SchemeParser {
        protocol: Protocol::Vless,
        prefixes: &["vless://"],
        parse: parsers::vless::parse,
    },
    SchemeParser {
        protocol: Protocol::Wireguard,
        prefixes: &["wireguard://"],
        parse: parsers::wireguard::parse,
    },
    SchemeParser {
        protocol: Protocol::Hysteria2,
        prefixes: &["hysteria2://", "hy2://"],
        parse: parsers::hysteria2::parse,
    },
];

/// What a single input chunk turned out to be.
pub enum LineKind {
    /// A one-line share link handled by the table.
    Scheme(&'static SchemeParser),
    /// A JSON bundle document (or array of them).
    Bundle,
    /// An INI-style tunnel configuration file.
    TunnelConf,
}

/// Decide how a chunk of input should be parsed. Prefix checks run first;
/// the sniffer fallbacks only when no scheme matches.
pub fn classify(text: &str) -> Option<LineKind> {
    let text = text.trim_start();
    for parser in SCHEME_PARSERS {
        if parser.prefixes.iter().any(|p| text.starts_with(p)) {
            return Some(LineKind::Scheme(parser));
        }
    }
    if parsers::wireguard::looks_like_tunnel_conf(text) {
        return Some(LineKind::TunnelConf);
    }
    if parsers::bundle::looks_like_bundle(text) {
        return Some(LineKind::Bundle);
    }
    None
}

/// Parse one share link (or tunnel conf) into a record. Records that come
/// back without remarks get the masked endpoint as a display name. Bundle
/// documents are rejected here; they go through
/// [`parsers::bundle::parse_bundle`] as whole documents.
pub fn parse_line(line: &str) -> Result<ProfileRecord, FormatError> {
    let line = line.trim();
    let mut record = match classify(line) {
        Some(LineKind::Scheme(parser)) => (parser.parse)(line)?,
        Some(LineKind::TunnelConf) => parsers::wireguard::parse_conf(line)?,
        Some(LineKind::Bundle) => return Err(FormatError::BundleDocument),
        None => return Err(FormatError::UnrecognizedScheme),
    };
    if record.remarks.trim().is_empty() {
        record.remarks = record.masked_description();
    }
    Ok(record)
}

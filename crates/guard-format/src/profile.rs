//! Canonical profile records produced by the protocol parsers.

use serde::{Deserialize, Serialize};

/// Supported proxy protocols. `Custom` marks records imported from a full
/// multi-outbound bundle document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Vmess,
    Shadowsocks,
    Socks,
    Vless,
    Trojan,
    Wireguard,
    Hysteria2,
    Custom,
}

impl std::fmt::Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Protocol::Vmess => "vmess",
            Protocol::Shadowsocks => "shadowsocks",
            Protocol::Socks => "socks",
            Protocol::Vless => "vless",
            Protocol::Trojan => "trojan",
            Protocol::Wireguard => "wireguard",
            Protocol::Hysteria2 => "hysteria2",
            Protocol::Custom => "custom",
        };
        f.write_str(name)
    }
}

/// One stored proxy profile: the parsed syntax of a single link (or bundle
/// element), plus the bookkeeping the store stamps on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub protocol: Protocol,
    #[serde(default)]
    pub remarks: String,
    #[serde(default)]
    pub server: String,
    #[serde(default)]
    pub port: u16,

    /// VMess/VLESS user id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Trojan/Shadowsocks/Hysteria2 password, SOCKS password, or the
    /// WireGuard private key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// SOCKS user name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Shadowsocks cipher, or the VMess `scy` value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    /// Transport security layer (tls, reality, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security: Option<String>,
    /// Stream transport (tcp, ws, grpc, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sni: Option<String>,
    /// WireGuard peer key, or a REALITY public key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,

    /// Original document backup for bundle-derived and tunnel-file records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_config: Option<String>,

    /// Owning group (subscription) id; empty for standalone imports.
    #[serde(default)]
    pub group_id: String,
    /// Absolute expiry in epoch milliseconds; `None` means never.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
    /// Last measured connection delay; `None` or non-positive means untested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_delay_ms: Option<i64>,
}

impl ProfileRecord {
    pub fn new(protocol: Protocol, server: impl Into<String>, port: u16) -> Self {
        Self {
            protocol,
            remarks: String::new(),
            server: server.into(),
            port,
            user_id: None,
            password: None,
            username: None,
            method: None,
            security: None,
            network: None,
            sni: None,
            public_key: None,
            raw_config: None,
            group_id: String::new(),
            expires_at: None,
            test_delay_ms: None,
        }
    }

    /// Identity under which two records count as duplicates of each other.
    pub fn identity_key(&self) -> ProfileKey {
        ProfileKey {
            protocol: self.protocol,
            server: self.server.clone(),
            port: self.port,
            credential: self
                .user_id
                .clone()
                .or_else(|| self.password.clone())
                .unwrap_or_default(),
            network: self.network.clone().unwrap_or_default(),
            security: self.security.clone().unwrap_or_default(),
        }
    }

    /// True when this record points at `server:port`, the test used to
    /// restore the active selection across a group refresh.
    pub fn same_endpoint(&self, server: &str, port: u16) -> bool {
        !self.server.is_empty() && self.server == server && self.port == port
    }

    /// Privacy-redacted display form of the endpoint: the host tail is
    /// replaced with `***`, the port kept.
    pub fn masked_description(&self) -> String {
        if self.server.is_empty() {
            return String::new();
        }
        let addr = if self.server.contains(':') {
            let head: Vec<&str> = self.server.split(':').take(2).collect();
            format!("{}:***", head.join(":"))
        } else {
            let parts: Vec<&str> = self.server.split('.').collect();
            format!("{}.***", parts[..parts.len() - 1].join("."))
        };
        format!("{} : {}", addr, self.port)
    }
}

/// Duplicate-detection key: protocol + endpoint + credential + transport.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProfileKey {
    pub protocol: Protocol,
    pub server: String,
    pub port: u16,
    pub credential: String,
    pub network: String,
    pub security: String,
}

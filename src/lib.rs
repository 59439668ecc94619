//! Device-bound configuration distribution for the CyberGuard VPN client.
//!
//! An operator seals proxy-configuration links to one designated device,
//! identified by a short human-enterable fingerprint, optionally with a
//! validity window. The receiving install decrypts, enforces the window,
//! and imports the configurations into its vault-sealed profile store; a
//! persisted time watermark keeps the expiry honest against local clock
//! rollback.
//!
//! The crates underneath split the work: `guard-crypto` (identity, key
//! derivation, envelope ciphers), `guard-format` (link parsing),
//! `guard-store` (persistence, import, reaping), `guard-clock` (rollback
//! detection, network time). This crate carries the protocol itself (expiry
//! envelope, distribution URI, issuance and redemption) and the
//! [`LinkService`] facade the host application talks to.

pub mod envelope;
pub mod error;
pub mod issue;
pub mod preflight;
pub mod redeem;
pub mod service;
pub mod uri;

pub use error::LinkError;
pub use issue::{issue, ExpiryChoice, IssueOutcome, EXPIRY_PRESET_DAYS};
pub use redeem::redeem;
pub use service::LinkService;
pub use uri::{parse_import_uri, render_import_uri, IMPORT_HOST, URI_SCHEME};

pub use guard_clock::{current_millis, TamperClock};
pub use guard_crypto::{DeviceIdentity, VaultCipher, PUBLIC_RECIPIENT_ID};
pub use guard_format::{ProfileRecord, Protocol};
pub use guard_store::{
    ImportReport, MemoryBackend, ProfileStore, SqliteBackend, StorageBackend,
};

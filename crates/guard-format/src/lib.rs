//! Share-link and bundle parsing.
//!
//! Turns the text a user pastes (or a distribution payload carries) into
//! [`ProfileRecord`]s: one parser per link scheme, a sniffer for full JSON
//! bundle documents, and another for INI-style tunnel configuration files.
//! Dispatch runs off a static scheme table.

pub mod error;
pub mod parsers;
pub mod profile;
pub mod registry;
pub mod text;

pub use error::FormatError;
pub use parsers::bundle::{looks_like_bundle, parse_bundle};
pub use parsers::wireguard::looks_like_tunnel_conf;
pub use profile::{Protocol, ProfileKey, ProfileRecord};
pub use registry::{classify, parse_line, LineKind, SchemeParser, SCHEME_PARSERS};
pub use text::{decode_base64_text, decode_base64_tolerant, non_empty_lines};

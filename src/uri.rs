//! The distribution URI: `cyberguard://import?data=<envelope>`.

use url::Url;

use crate::error::LinkError;

pub const URI_SCHEME: &str = "cyberguard";
pub const IMPORT_HOST: &str = "import";

/// Render a sealed envelope as a distribution URI. The envelope is already
/// URL-safe base64, so it rides in the query untouched.
pub fn render_import_uri(envelope: &str) -> String {
    format!("{}://{}?data={}", URI_SCHEME, IMPORT_HOST, envelope)
}

/// Extract the envelope from a distribution URI. Only the `import` host
/// with a non-empty `data` parameter is accepted.
pub fn parse_import_uri(uri: &str) -> Result<String, LinkError> {
    let url = Url::parse(uri.trim()).map_err(|_| LinkError::MalformedUri)?;
    if url.scheme() != URI_SCHEME || url.host_str() != Some(IMPORT_HOST) {
        return Err(LinkError::MalformedUri);
    }
    url.query_pairs()
        .find(|(key, _)| key == "data")
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
        .ok_or(LinkError::MalformedUri)
}

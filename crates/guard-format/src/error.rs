use thiserror::Error;

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("Unrecognized scheme")]
    UnrecognizedScheme,

    #[error("Bundle documents are imported as whole documents, not lines")]
    BundleDocument,

    #[error("Invalid base64 payload")]
    InvalidBase64,

    #[error("Invalid JSON payload: {0}")]
    InvalidJson(String),

    #[error("Malformed {protocol} link: {reason}")]
    MalformedLink {
        protocol: &'static str,
        reason: String,
    },
}

impl FormatError {
    pub(crate) fn malformed(protocol: &'static str, reason: impl Into<String>) -> Self {
        FormatError::MalformedLink {
            protocol,
            reason: reason.into(),
        }
    }
}

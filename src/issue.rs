//! Issuance: the operator side of the protocol. Each non-blank input line
//! is wrapped with the chosen expiry, sealed to the recipient, and rendered
//! as a distribution URI; failures are reported as an aggregate count.

use tracing::debug;

use guard_crypto::device_lock;
use guard_format::non_empty_lines;

use crate::envelope;
use crate::error::LinkError;
use crate::uri;

/// Preset validity windows offered at issue time, in days.
pub const EXPIRY_PRESET_DAYS: &[i64] = &[7, 15, 30, 60, 90];

const DAY_MS: i64 = 86_400_000;

/// The operator's expiry choice for a batch of links.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryChoice {
    Never,
    /// Valid for this many days from issue time.
    Days(i64),
    /// Valid until an absolute epoch-millisecond timestamp.
    At(i64),
}

impl ExpiryChoice {
    /// Resolve to an absolute expiry relative to `now_ms`.
    pub fn resolve(self, now_ms: i64) -> Option<i64> {
        match self {
            ExpiryChoice::Never => None,
            ExpiryChoice::Days(days) => Some(now_ms + days * DAY_MS),
            ExpiryChoice::At(at) => Some(at),
        }
    }
}

#[derive(Debug)]
pub struct IssueOutcome {
    /// One distribution URI per successfully sealed line, in input order.
    pub links: Vec<String>,
    /// How many lines could not be sealed. Which ones is deliberately not
    /// reported.
    pub failed: usize,
}

/// Seal every non-blank line of `text` to `recipient`.
///
/// The recipient must be a device fingerprint or the public sentinel;
/// blank input is rejected before any cryptography runs.
pub fn issue(
    text: &str,
    recipient: &str,
    expires_at: Option<i64>,
) -> Result<IssueOutcome, LinkError> {
    if !device_lock::is_valid_recipient(recipient) {
        return Err(LinkError::InvalidRecipient);
    }
    let lines: Vec<&str> = non_empty_lines(text).collect();
    if lines.is_empty() {
        return Err(LinkError::EmptyInput);
    }

    let mut links = Vec::new();
    let mut failed = 0;
    for line in lines {
        let wrapped = envelope::wrap(line, expires_at);
        match device_lock::seal(&wrapped, recipient) {
            Ok(blob) => links.push(uri::render_import_uri(&blob)),
            Err(e) => {
                debug!(error = %e, "line could not be sealed");
                failed += 1;
            }
        }
    }
    debug!(issued = links.len(), failed, "issuance finished");
    Ok(IssueOutcome { links, failed })
}

//! Network time observation via the `Date` header of a well-known
//! endpoint. Best effort: offline devices keep relying on the local
//! watermark, so every failure here is a silent no-op.

use std::time::Duration;

use chrono::DateTime;
use tracing::debug;

use crate::error::ClockError;
use crate::tamper::TamperClock;

/// Returns an empty body and a `Date` header, nothing else needed.
pub const DEFAULT_TIME_URL: &str = "https://www.gstatic.com/generate_204";

pub const FETCH_TIMEOUT: Duration = Duration::from_secs(5);

/// Fetch the current time from the `Date` response header of `url`.
pub async fn fetch_network_time(url: &str) -> Result<i64, ClockError> {
    let client = reqwest::Client::builder()
        .timeout(FETCH_TIMEOUT)
        .build()
        .map_err(|e| ClockError::NetworkTime(e.to_string()))?;
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| ClockError::NetworkTime(e.to_string()))?;
    let header = response
        .headers()
        .get(reqwest::header::DATE)
        .ok_or_else(|| ClockError::NetworkTime("response carries no Date header".into()))?;
    let text = header
        .to_str()
        .map_err(|e| ClockError::NetworkTime(e.to_string()))?;
    parse_http_date(text)
}

/// Parse an HTTP `Date` header (RFC 2822 form) into epoch milliseconds.
pub fn parse_http_date(text: &str) -> Result<i64, ClockError> {
    DateTime::parse_from_rfc2822(text.trim())
        .map(|date| date.timestamp_millis())
        .map_err(|e| ClockError::NetworkTime(format!("unparsable Date header: {}", e)))
}

/// Fetch network time and feed it into the clock. Returns the observed
/// time, or `None` when the network was unreachable or the response
/// unusable. Dropping the future cancels the fetch.
pub async fn reconcile(clock: &TamperClock, url: &str) -> Option<i64> {
    match fetch_network_time(url).await {
        Ok(observed) => match clock.update_last_seen(observed) {
            Ok(_) => {
                debug!(observed, "network time observed");
                Some(observed)
            }
            Err(e) => {
                debug!(error = %e, "network time observed but not persisted");
                None
            }
        },
        Err(e) => {
            debug!(error = %e, "network time unavailable");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use guard_store::{MemoryBackend, StorageBackend};

    #[test]
    fn parses_gmt_date_header() {
        assert_eq!(
            parse_http_date("Tue, 21 Nov 2023 07:28:00 GMT").unwrap(),
            1_700_551_680_000
        );
    }

    #[test]
    fn parses_offset_date_header() {
        assert_eq!(
            parse_http_date("Tue, 21 Nov 2023 02:28:00 -0500").unwrap(),
            1_700_551_680_000
        );
        assert_eq!(
            parse_http_date(" Tue, 21 Nov 2023 07:28:00 +0000 ").unwrap(),
            1_700_551_680_000
        );
    }

    #[test]
    fn rejects_garbage_date_header() {
        assert!(parse_http_date("not a date").is_err());
        assert!(parse_http_date("").is_err());
    }

    #[tokio::test]
    async fn reconcile_is_silent_on_unreachable_endpoint() {
        let backend: Arc<dyn StorageBackend> = Arc::new(MemoryBackend::new());
        let clock = TamperClock::load(backend).unwrap();
        clock.update_last_seen(1_000).unwrap();

        assert_eq!(reconcile(&clock, "not a url at all").await, None);
        assert_eq!(clock.last_seen(), 1_000);
    }
}

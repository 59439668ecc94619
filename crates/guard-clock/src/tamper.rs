//! Clock-rollback detection via a monotonic watermark.
//!
//! Every trustworthy time observation (system time on foreground, network
//! time when reachable) pushes the watermark forward; it never moves back.
//! A wall clock behind the watermark means someone wound it back, and
//! expiry decisions stop being trustworthy.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;

use guard_store::StorageBackend;

use crate::error::ClockError;

const WATERMARK_KEY: &str = "clock.last-seen-ms";

pub struct TamperClock {
    backend: Arc<dyn StorageBackend>,
    watermark: Mutex<i64>,
}

impl TamperClock {
    /// Load the persisted watermark; a fresh (or unreadable) value starts
    /// at zero, which no sane wall clock precedes.
    pub fn load(backend: Arc<dyn StorageBackend>) -> Result<Self, ClockError> {
        let watermark = backend
            .get_meta(WATERMARK_KEY)?
            .and_then(|value| value.parse().ok())
            .unwrap_or(0);
        Ok(Self {
            backend,
            watermark: Mutex::new(watermark),
        })
    }

    /// Feed an observed wall-clock time (epoch ms). The watermark only
    /// advances; older observations are ignored. Returns the watermark
    /// after the observation.
    pub fn update_last_seen(&self, observed_ms: i64) -> Result<i64, ClockError> {
        let mut watermark = self.watermark.lock();
        if observed_ms > *watermark {
            *watermark = observed_ms;
            self.backend.set_meta(WATERMARK_KEY, &watermark.to_string())?;
        }
        Ok(*watermark)
    }

    /// Observe the current system time.
    pub fn observe_now(&self) -> Result<i64, ClockError> {
        self.update_last_seen(current_millis())
    }

    pub fn last_seen(&self) -> i64 {
        *self.watermark.lock()
    }

    /// True when `now_ms` sits before a time this install has already seen.
    pub fn is_tampered_at(&self, now_ms: i64) -> bool {
        now_ms < *self.watermark.lock()
    }

    pub fn is_tampered(&self) -> bool {
        self.is_tampered_at(current_millis())
    }
}

/// Current system time in epoch milliseconds, the reading every clock
/// observation starts from.
pub fn current_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or(0)
}

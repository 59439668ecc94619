//! Rollback-resistant time for expiry enforcement: a persisted monotonic
//! watermark plus best-effort network time reconciliation.

pub mod error;
pub mod nettime;
pub mod tamper;

pub use error::ClockError;
pub use nettime::{fetch_network_time, parse_http_date, reconcile, DEFAULT_TIME_URL};
pub use tamper::{current_millis, TamperClock};

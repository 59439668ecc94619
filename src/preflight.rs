//! The connection gate: the checks that must pass before the tunnel is
//! allowed to come up.

use guard_clock::TamperClock;
use guard_format::ProfileRecord;
use guard_store::{reaper, ProfileStore};

use crate::error::LinkError;

/// Gate a connection attempt at `now_ms`.
///
/// A rolled-back clock blocks outright; expiry decisions cannot be
/// trusted on it. Otherwise the observation feeds the watermark, expired
/// records are swept, and the surviving selection is returned. A selection
/// that was just swept reports [`LinkError::Expired`] rather than the
/// generic missing-selection case.
pub fn check(
    store: &ProfileStore,
    clock: &TamperClock,
    now_ms: i64,
) -> Result<(String, ProfileRecord), LinkError> {
    if clock.is_tampered_at(now_ms) {
        return Err(LinkError::ClockTampered);
    }
    clock.update_last_seen(now_ms)?;

    let had_selection = store.selected().is_some();
    reaper::sweep(store, now_ms)?;

    match store.selected_record() {
        Some(selection) => Ok(selection),
        None if had_selection => Err(LinkError::Expired),
        None => Err(LinkError::NothingSelected),
    }
}

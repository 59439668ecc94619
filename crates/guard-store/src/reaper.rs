//! Removal of expired records. Runs on foreground/resume and after any
//! clock observation that may have newly pushed a record past its expiry.

use tracing::debug;

use crate::error::StoreError;
use crate::store::ProfileStore;

/// Remove every record whose expiry is set and has passed at `now`
/// (epoch milliseconds). Idempotent; an immediate repeat removes nothing.
pub fn sweep(store: &ProfileStore, now: i64) -> Result<usize, StoreError> {
    let expired: Vec<String> = store
        .list()
        .into_iter()
        .filter(|(_, record)| record.expires_at.is_some_and(|at| at <= now))
        .map(|(guid, _)| guid)
        .collect();

    let mut removed = 0;
    for guid in &expired {
        if store.remove(guid)? {
            removed += 1;
        }
    }
    if removed > 0 {
        debug!(removed, "expired profiles swept");
    }
    Ok(removed)
}

//! Redemption: the receiving side. Unwraps a distribution URI with the
//! local device key, enforces the expiry before anything is stored, and
//! hands the payload to the batch importer.

use tracing::debug;

use guard_crypto::{device_lock, DeviceIdentity};
use guard_store::{import_batch, ImportReport, ProfileStore};

use crate::envelope;
use crate::error::LinkError;
use crate::uri;

/// Redeem a distribution URI into the store.
///
/// Fails with [`LinkError::NotForThisDevice`] when the envelope does not
/// open under this device's key, and with [`LinkError::Expired`] when the
/// validity window has passed. The two are reported distinctly so the
/// holder of a stale link is not told their device is wrong.
pub fn redeem(
    store: &ProfileStore,
    identity: &DeviceIdentity,
    link: &str,
    now_ms: i64,
) -> Result<ImportReport, LinkError> {
    let blob = uri::parse_import_uri(link)?;
    let Some(payload) = device_lock::open(&blob, &identity.fingerprint()) else {
        return Err(LinkError::NotForThisDevice);
    };

    let (line, expires_at) = envelope::unwrap(&payload);
    if expires_at.is_some_and(|at| at <= now_ms) {
        return Err(LinkError::Expired);
    }

    let report = import_batch(store, &line, "", true, expires_at)?;
    debug!(
        profiles = report.profiles,
        bundles = report.bundles,
        "distribution link redeemed"
    );
    Ok(report)
}

//! One object wiring the whole distribution core together for the host
//! application: device identity, vault-sealed profile store, and the
//! tamper-resistant clock, over a single shared storage backend.

use std::sync::Arc;

use tracing::debug;

use guard_clock::{current_millis, nettime, TamperClock};
use guard_crypto::{DeviceIdentity, VaultCipher};
use guard_format::ProfileRecord;
use guard_store::{import_batch, reaper, ImportReport, ProfileStore, StorageBackend};

use crate::error::LinkError;
use crate::issue::{self, ExpiryChoice, IssueOutcome};
use crate::{preflight, redeem};

pub struct LinkService {
    identity: DeviceIdentity,
    store: Arc<ProfileStore>,
    clock: TamperClock,
    time_url: String,
}

impl LinkService {
    /// Open the distribution core over `backend`. `platform_id` is the
    /// host-supplied stable identifier; unusable values fall back to the
    /// fixed seed.
    pub fn open(
        backend: Arc<dyn StorageBackend>,
        platform_id: Option<&str>,
    ) -> Result<Self, LinkError> {
        let identity = DeviceIdentity::resolve(platform_id);
        let vault = VaultCipher::new(identity.seed());
        let store = Arc::new(ProfileStore::open(Arc::clone(&backend), vault)?);
        let clock = TamperClock::load(backend)?;
        debug!(fingerprint = %identity.fingerprint(), "distribution core opened");
        Ok(Self {
            identity,
            store,
            clock,
            time_url: nettime::DEFAULT_TIME_URL.to_string(),
        })
    }

    /// The fingerprint an operator needs to issue links to this install.
    pub fn fingerprint(&self) -> String {
        self.identity.fingerprint()
    }

    pub fn store(&self) -> &Arc<ProfileStore> {
        &self.store
    }

    pub fn clock(&self) -> &TamperClock {
        &self.clock
    }

    /// Override the endpoint used for network time observation.
    pub fn set_time_url(&mut self, url: impl Into<String>) {
        self.time_url = url.into();
    }

    // ------------------------------------------------------------------
    // Distribution protocol
    // ------------------------------------------------------------------

    /// Issue distribution links for every non-blank line of `text`.
    pub fn issue(
        &self,
        text: &str,
        recipient: &str,
        expiry: ExpiryChoice,
    ) -> Result<IssueOutcome, LinkError> {
        issue::issue(text, recipient, expiry.resolve(current_millis()))
    }

    /// Redeem a distribution link into this device's store.
    pub fn redeem(&self, link: &str) -> Result<ImportReport, LinkError> {
        redeem::redeem(&self.store, &self.identity, link, current_millis())
    }

    /// Import pasted text directly (no envelope), as from the clipboard or
    /// a subscription body.
    pub fn import(
        &self,
        text: &str,
        group_id: &str,
        append: bool,
    ) -> Result<ImportReport, LinkError> {
        Ok(import_batch(&self.store, text, group_id, append, None)?)
    }

    // ------------------------------------------------------------------
    // Expiry enforcement
    // ------------------------------------------------------------------

    /// Observe the system clock and remove newly expired records. The
    /// sweep runs at the trusted time (the watermark), so a rolled-back
    /// wall clock cannot resurrect an expired profile. Run on foreground
    /// and resume.
    pub fn sweep_expired(&self) -> Result<usize, LinkError> {
        let trusted_now = self.clock.observe_now()?;
        Ok(reaper::sweep(&self.store, trusted_now)?)
    }

    /// Best-effort network time observation, followed by a sweep when a
    /// time was actually obtained. Offline failures are silent.
    pub async fn reconcile_network_time(&self) -> Result<Option<i64>, LinkError> {
        let observed = nettime::reconcile(&self.clock, &self.time_url).await;
        if observed.is_some() {
            reaper::sweep(&self.store, self.clock.last_seen())?;
        }
        Ok(observed)
    }

    /// The pre-connection gate: rolled-back clock blocks, expired records
    /// are swept, and the surviving selection comes back.
    pub fn preflight(&self) -> Result<(String, ProfileRecord), LinkError> {
        preflight::check(&self.store, &self.clock, current_millis())
    }
}

//! The profile table: an ordered list of records, a single active
//! selection, and maintenance passes over both.
//!
//! All mutation funnels through one writer path; readers snapshot under a
//! read lock. Record payloads are sealed with the device vault before they
//! reach the backend, so the on-disk table holds only opaque strings. Legacy
//! plaintext payloads (written before sealing existed) are still readable
//! and get sealed the next time the record is written.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, warn};
use uuid::Uuid;

use guard_crypto::{looks_encrypted, VaultCipher};
use guard_format::{ProfileRecord, Protocol};

use crate::backend::StorageBackend;
use crate::error::StoreError;

const ORDER_KEY: &str = "profiles.order";
const SELECTED_KEY: &str = "profiles.selected";

struct StoreState {
    /// Display order, head first.
    order: Vec<String>,
    records: HashMap<String, ProfileRecord>,
    selected: Option<String>,
}

/// Outcome of removing a whole group: how many records went, and the
/// endpoint of the active selection if it was one of them.
#[derive(Debug, PartialEq, Eq)]
pub struct GroupRemoval {
    pub removed: usize,
    pub displaced_selection: Option<(String, u16)>,
}

pub struct ProfileStore {
    backend: Arc<dyn StorageBackend>,
    vault: VaultCipher,
    state: RwLock<StoreState>,
}

impl ProfileStore {
    /// Load the profile table from a backend. Records that no longer
    /// decrypt under this vault (or no longer parse) are skipped with a
    /// warning rather than failing the whole load.
    pub fn open(backend: Arc<dyn StorageBackend>, vault: VaultCipher) -> Result<Self, StoreError> {
        let mut records = HashMap::new();
        let mut load_order = Vec::new();
        for (guid, payload) in backend.load_records()? {
            let json = if looks_encrypted(&payload) {
                match vault.decrypt(&payload) {
                    Some(json) => json,
                    None => {
                        warn!(guid = %guid, "skipping undecryptable profile record");
                        continue;
                    }
                }
            } else {
                payload
            };
            match serde_json::from_str::<ProfileRecord>(&json) {
                Ok(record) => {
                    records.insert(guid.clone(), record);
                    load_order.push(guid);
                }
                Err(e) => warn!(guid = %guid, error = %e, "skipping unreadable profile record"),
            }
        }

        let mut order: Vec<String> = match backend.get_meta(ORDER_KEY)? {
            Some(json) => serde_json::from_str(&json).unwrap_or_default(),
            None => Vec::new(),
        };
        order.retain(|guid| records.contains_key(guid));
        for guid in load_order {
            if !order.contains(&guid) {
                order.push(guid);
            }
        }

        let selected = backend
            .get_meta(SELECTED_KEY)?
            .filter(|guid| !guid.is_empty() && records.contains_key(guid));

        debug!(profiles = order.len(), "profile store opened");
        Ok(Self {
            backend,
            vault,
            state: RwLock::new(StoreState {
                order,
                records,
                selected,
            }),
        })
    }

    /// The backend this store writes through, shared with collaborators
    /// that keep their own metadata (the clock watermark).
    pub fn backend(&self) -> Arc<dyn StorageBackend> {
        Arc::clone(&self.backend)
    }

    // ------------------------------------------------------------------
    // Records
    // ------------------------------------------------------------------

    /// Persist a new record at the head of the display order, returning its
    /// generated guid.
    pub fn insert_at_head(&self, record: ProfileRecord) -> Result<String, StoreError> {
        let guid = Uuid::new_v4().to_string();
        let mut state = self.state.write();
        self.persist_record(&guid, &record)?;
        state.order.insert(0, guid.clone());
        state.records.insert(guid.clone(), record);
        self.persist_order(&state)?;
        Ok(guid)
    }

    pub fn get(&self, guid: &str) -> Option<ProfileRecord> {
        self.state.read().records.get(guid).cloned()
    }

    /// Snapshot of the table in display order.
    pub fn list(&self) -> Vec<(String, ProfileRecord)> {
        let state = self.state.read();
        state
            .order
            .iter()
            .filter_map(|guid| {
                state
                    .records
                    .get(guid)
                    .map(|record| (guid.clone(), record.clone()))
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.state.read().order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.read().order.is_empty()
    }

    pub fn remove(&self, guid: &str) -> Result<bool, StoreError> {
        let mut state = self.state.write();
        self.remove_locked(&mut state, guid)
    }

    /// Remove every record belonging to `group_id`.
    pub fn remove_group(&self, group_id: &str) -> Result<GroupRemoval, StoreError> {
        let mut state = self.state.write();
        let displaced_selection = state
            .selected
            .as_ref()
            .and_then(|guid| state.records.get(guid))
            .filter(|record| record.group_id == group_id)
            .map(|record| (record.server.clone(), record.port));

        let doomed: Vec<String> = state
            .order
            .iter()
            .filter(|guid| {
                state
                    .records
                    .get(*guid)
                    .is_some_and(|record| record.group_id == group_id)
            })
            .cloned()
            .collect();

        let mut removed = 0;
        for guid in &doomed {
            if self.remove_locked(&mut state, guid)? {
                removed += 1;
            }
        }
        Ok(GroupRemoval {
            removed,
            displaced_selection,
        })
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    /// Mark a record as the active selection. Returns false for unknown
    /// guids, leaving the current selection untouched.
    pub fn select(&self, guid: &str) -> Result<bool, StoreError> {
        let mut state = self.state.write();
        if !state.records.contains_key(guid) {
            return Ok(false);
        }
        state.selected = Some(guid.to_string());
        self.persist_selection(&state)?;
        Ok(true)
    }

    pub fn selected(&self) -> Option<String> {
        self.state.read().selected.clone()
    }

    pub fn selected_record(&self) -> Option<(String, ProfileRecord)> {
        let state = self.state.read();
        let guid = state.selected.as_ref()?;
        let record = state.records.get(guid)?;
        Some((guid.clone(), record.clone()))
    }

    // ------------------------------------------------------------------
    // Maintenance
    // ------------------------------------------------------------------

    /// Stamp a measured connection delay on a record. Non-positive values
    /// mark the test as failed.
    pub fn set_test_delay(&self, guid: &str, millis: i64) -> Result<bool, StoreError> {
        let mut state = self.state.write();
        let Some(record) = state.records.get_mut(guid) else {
            return Ok(false);
        };
        record.test_delay_ms = Some(millis);
        let record = record.clone();
        self.persist_record(guid, &record)?;
        Ok(true)
    }

    /// Reorder the table by last measured delay, fastest first; untested
    /// and failed records sort last, keeping their relative order.
    pub fn sort_by_delay(&self) -> Result<(), StoreError> {
        let mut state = self.state.write();
        let StoreState { order, records, .. } = &mut *state;
        order.sort_by_key(|guid| {
            records
                .get(guid)
                .and_then(|record| record.test_delay_ms)
                .filter(|delay| *delay > 0)
                .unwrap_or(i64::MAX)
        });
        self.persist_order(&state)
    }

    /// Drop records identical under the duplicate-identity key, keeping the
    /// first occurrence in display order.
    pub fn remove_duplicates(&self) -> Result<usize, StoreError> {
        let mut state = self.state.write();
        let mut seen = HashSet::new();
        let doomed: Vec<String> = state
            .order
            .iter()
            .filter(|guid| {
                state
                    .records
                    .get(*guid)
                    .is_some_and(|record| !seen.insert(record.identity_key()))
            })
            .cloned()
            .collect();

        let mut removed = 0;
        for guid in &doomed {
            if self.remove_locked(&mut state, guid)? {
                removed += 1;
            }
        }
        if removed > 0 {
            debug!(removed, "duplicate profiles removed");
        }
        Ok(removed)
    }

    /// Drop records with no usable endpoint. Bundle-derived records are
    /// exempt: their endpoint is advisory, the document is authoritative.
    pub fn remove_invalid(&self) -> Result<usize, StoreError> {
        let mut state = self.state.write();
        let doomed: Vec<String> = state
            .order
            .iter()
            .filter(|guid| {
                state.records.get(*guid).is_some_and(|record| {
                    record.protocol != Protocol::Custom
                        && (record.server.trim().is_empty() || record.port == 0)
                })
            })
            .cloned()
            .collect();

        let mut removed = 0;
        for guid in &doomed {
            if self.remove_locked(&mut state, guid)? {
                removed += 1;
            }
        }
        if removed > 0 {
            debug!(removed, "invalid profiles removed");
        }
        Ok(removed)
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn remove_locked(&self, state: &mut StoreState, guid: &str) -> Result<bool, StoreError> {
        if !state.records.contains_key(guid) {
            return Ok(false);
        }
        self.backend.delete_record(guid)?;
        state.records.remove(guid);
        state.order.retain(|g| g != guid);
        self.persist_order(state)?;
        if state.selected.as_deref() == Some(guid) {
            state.selected = None;
            self.persist_selection(state)?;
        }
        Ok(true)
    }

    fn persist_record(&self, guid: &str, record: &ProfileRecord) -> Result<(), StoreError> {
        let json = serde_json::to_string(record)?;
        let sealed = self.vault.encrypt(&json)?;
        self.backend.put_record(guid, &sealed)
    }

    fn persist_order(&self, state: &StoreState) -> Result<(), StoreError> {
        let json = serde_json::to_string(&state.order)?;
        self.backend.set_meta(ORDER_KEY, &json)
    }

    fn persist_selection(&self, state: &StoreState) -> Result<(), StoreError> {
        self.backend
            .set_meta(SELECTED_KEY, state.selected.as_deref().unwrap_or(""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;

    fn open_store(backend: Arc<dyn StorageBackend>) -> ProfileStore {
        ProfileStore::open(backend, VaultCipher::new("unit-test-seed")).unwrap()
    }

    fn record(protocol: Protocol, server: &str, port: u16) -> ProfileRecord {
        let mut record = ProfileRecord::new(protocol, server, port);
        record.remarks = format!("{} {}", protocol, server);
        record
    }

    #[test]
    fn insert_at_head_puts_newest_first() {
        let store = open_store(Arc::new(MemoryBackend::new()));
        store
            .insert_at_head(record(Protocol::Vmess, "first", 443))
            .unwrap();
        store
            .insert_at_head(record(Protocol::Vless, "second", 443))
            .unwrap();

        let listed = store.list();
        assert_eq!(listed[0].1.server, "second");
        assert_eq!(listed[1].1.server, "first");
    }

    #[test]
    fn payloads_are_sealed_at_rest() {
        let backend: Arc<dyn StorageBackend> = Arc::new(MemoryBackend::new());
        let store = open_store(Arc::clone(&backend));
        store
            .insert_at_head(record(Protocol::Trojan, "host.example.com", 443))
            .unwrap();

        let (_, payload) = backend.load_records().unwrap().remove(0);
        assert!(!payload.contains("host.example.com"));
        assert!(looks_encrypted(&payload));
    }

    #[test]
    fn reopen_restores_records_order_and_selection() {
        let backend: Arc<dyn StorageBackend> = Arc::new(MemoryBackend::new());
        let store = open_store(Arc::clone(&backend));
        store
            .insert_at_head(record(Protocol::Vmess, "a.example.com", 443))
            .unwrap();
        let selected = store
            .insert_at_head(record(Protocol::Vless, "b.example.com", 443))
            .unwrap();
        assert!(store.select(&selected).unwrap());
        drop(store);

        let store = open_store(backend);
        assert_eq!(store.len(), 2);
        assert_eq!(store.list()[0].1.server, "b.example.com");
        assert_eq!(store.selected(), Some(selected));
    }

    #[test]
    fn foreign_vault_records_are_skipped_on_load() {
        let backend: Arc<dyn StorageBackend> = Arc::new(MemoryBackend::new());
        let store = open_store(Arc::clone(&backend));
        store
            .insert_at_head(record(Protocol::Vmess, "a.example.com", 443))
            .unwrap();
        drop(store);

        let store = ProfileStore::open(backend, VaultCipher::new("some-other-install")).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn legacy_plaintext_payloads_still_load() {
        let backend: Arc<dyn StorageBackend> = Arc::new(MemoryBackend::new());
        let json = serde_json::to_string(&record(Protocol::Socks, "legacy.example.com", 1080))
            .unwrap();
        backend.put_record("legacy-guid", &json).unwrap();

        let store = open_store(backend);
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("legacy-guid").unwrap().server, "legacy.example.com");
    }

    #[test]
    fn removing_selected_record_clears_selection() {
        let store = open_store(Arc::new(MemoryBackend::new()));
        let guid = store
            .insert_at_head(record(Protocol::Vmess, "a.example.com", 443))
            .unwrap();
        store.select(&guid).unwrap();

        assert!(store.remove(&guid).unwrap());
        assert_eq!(store.selected(), None);
        assert!(!store.remove(&guid).unwrap());
    }

    #[test]
    fn select_unknown_guid_is_refused() {
        let store = open_store(Arc::new(MemoryBackend::new()));
        let guid = store
            .insert_at_head(record(Protocol::Vmess, "a.example.com", 443))
            .unwrap();
        store.select(&guid).unwrap();

        assert!(!store.select("no-such-guid").unwrap());
        assert_eq!(store.selected(), Some(guid));
    }

    #[test]
    fn remove_group_reports_displaced_selection() {
        let store = open_store(Arc::new(MemoryBackend::new()));
        let mut grouped = record(Protocol::Vmess, "sub.example.com", 443);
        grouped.group_id = "group-1".into();
        let guid = store.insert_at_head(grouped).unwrap();
        store
            .insert_at_head(record(Protocol::Socks, "standalone.example.com", 1080))
            .unwrap();
        store.select(&guid).unwrap();

        let removal = store.remove_group("group-1").unwrap();
        assert_eq!(removal.removed, 1);
        assert_eq!(
            removal.displaced_selection,
            Some(("sub.example.com".to_string(), 443))
        );
        assert_eq!(store.len(), 1);
        assert_eq!(store.selected(), None);
    }

    #[test]
    fn remove_group_keeps_unrelated_selection() {
        let store = open_store(Arc::new(MemoryBackend::new()));
        let mut grouped = record(Protocol::Vmess, "sub.example.com", 443);
        grouped.group_id = "group-1".into();
        store.insert_at_head(grouped).unwrap();
        let standalone = store
            .insert_at_head(record(Protocol::Socks, "standalone.example.com", 1080))
            .unwrap();
        store.select(&standalone).unwrap();

        let removal = store.remove_group("group-1").unwrap();
        assert_eq!(removal.removed, 1);
        assert_eq!(removal.displaced_selection, None);
        assert_eq!(store.selected(), Some(standalone));
    }

    #[test]
    fn sort_by_delay_puts_untested_last() {
        let store = open_store(Arc::new(MemoryBackend::new()));
        let slow = store
            .insert_at_head(record(Protocol::Vmess, "slow.example.com", 443))
            .unwrap();
        let untested = store
            .insert_at_head(record(Protocol::Vless, "untested.example.com", 443))
            .unwrap();
        let failed = store
            .insert_at_head(record(Protocol::Trojan, "failed.example.com", 443))
            .unwrap();
        let fast = store
            .insert_at_head(record(Protocol::Socks, "fast.example.com", 1080))
            .unwrap();

        store.set_test_delay(&slow, 900).unwrap();
        store.set_test_delay(&fast, 40).unwrap();
        store.set_test_delay(&failed, -1).unwrap();
        store.sort_by_delay().unwrap();

        let order: Vec<String> = store.list().into_iter().map(|(guid, _)| guid).collect();
        assert_eq!(order[0], fast);
        assert_eq!(order[1], slow);
        // untested and failed keep their relative display order at the tail
        assert_eq!(order[2], failed);
        assert_eq!(order[3], untested);
    }

    #[test]
    fn sorted_order_survives_reopen() {
        let backend: Arc<dyn StorageBackend> = Arc::new(MemoryBackend::new());
        let store = open_store(Arc::clone(&backend));
        let slow = store
            .insert_at_head(record(Protocol::Vmess, "slow.example.com", 443))
            .unwrap();
        let fast = store
            .insert_at_head(record(Protocol::Socks, "fast.example.com", 1080))
            .unwrap();
        store.set_test_delay(&slow, 900).unwrap();
        store.set_test_delay(&fast, 40).unwrap();
        store.sort_by_delay().unwrap();
        drop(store);

        let store = open_store(backend);
        assert_eq!(store.list()[0].0, fast);
    }

    #[test]
    fn remove_duplicates_keeps_first_in_display_order() {
        let store = open_store(Arc::new(MemoryBackend::new()));
        let mut a = record(Protocol::Vmess, "dup.example.com", 443);
        a.user_id = Some("uuid-1".into());
        let mut b = a.clone();
        b.remarks = "same endpoint, different remarks".into();
        let mut c = a.clone();
        c.user_id = Some("uuid-2".into());

        // head insertion reverses: display order is c, b, a
        store.insert_at_head(a).unwrap();
        store.insert_at_head(b).unwrap();
        store.insert_at_head(c).unwrap();

        assert_eq!(store.remove_duplicates().unwrap(), 1);
        let listed = store.list();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].1.user_id.as_deref(), Some("uuid-2"));
        assert_eq!(
            listed[1].1.remarks,
            "same endpoint, different remarks"
        );
    }

    #[test]
    fn remove_invalid_spares_bundle_records() {
        let store = open_store(Arc::new(MemoryBackend::new()));
        store
            .insert_at_head(record(Protocol::Vmess, "", 443))
            .unwrap();
        store
            .insert_at_head(record(Protocol::Vless, "host.example.com", 0))
            .unwrap();
        store
            .insert_at_head(record(Protocol::Custom, "", 0))
            .unwrap();
        store
            .insert_at_head(record(Protocol::Trojan, "ok.example.com", 443))
            .unwrap();

        assert_eq!(store.remove_invalid().unwrap(), 2);
        let listed = store.list();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].1.server, "ok.example.com");
        assert_eq!(listed[1].1.protocol, Protocol::Custom);
    }

    #[test]
    fn set_test_delay_unknown_guid() {
        let store = open_store(Arc::new(MemoryBackend::new()));
        assert!(!store.set_test_delay("missing", 100).unwrap());
    }
}

//! Batch import: many pasted lines (or one whole document) in, records out.
//!
//! Subscription bodies usually arrive base64-wrapped, so the decoded form
//! is tried first, then the text as-is, then the whole-document syntaxes
//! (bundle JSON, tunnel configuration file). A line that fails to parse is
//! counted and skipped; it never aborts its siblings.

use std::collections::HashSet;

use tracing::debug;

use guard_format::{
    decode_base64_text, looks_like_bundle, looks_like_tunnel_conf, non_empty_lines, parse_bundle,
    parse_line,
};

use crate::error::StoreError;
use crate::store::ProfileStore;

/// Aggregate outcome of one batch import.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImportReport {
    /// Records parsed from individual share links or a tunnel file.
    pub profiles: usize,
    /// Records imported from full bundle documents.
    pub bundles: usize,
}

impl ImportReport {
    pub fn total(&self) -> usize {
        self.profiles + self.bundles
    }
}

/// Import a pasted text into `store` under `group_id`.
///
/// With `append` false the group's existing records are replaced, and a new
/// record whose endpoint equals the displaced selection's becomes the new
/// selection. `expires_at` is stamped on every imported record.
pub fn import_batch(
    store: &ProfileStore,
    text: &str,
    group_id: &str,
    append: bool,
    expires_at: Option<i64>,
) -> Result<ImportReport, StoreError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(StoreError::EmptyImport);
    }

    // Group replacement only applies to named groups; a blank group id
    // would otherwise sweep away every standalone record.
    let displaced = if !append && !group_id.is_empty() {
        store.remove_group(group_id)?.displaced_selection
    } else {
        None
    };

    if let Some(decoded) = decode_base64_text(trimmed) {
        let profiles = import_lines(store, &decoded, group_id, expires_at, displaced.as_ref())?;
        if profiles > 0 {
            return Ok(ImportReport {
                profiles,
                bundles: 0,
            });
        }
    }

    let profiles = import_lines(store, trimmed, group_id, expires_at, displaced.as_ref())?;
    if profiles > 0 {
        return Ok(ImportReport {
            profiles,
            bundles: 0,
        });
    }

    import_document(store, trimmed, group_id, expires_at)
}

fn import_lines(
    store: &ProfileStore,
    text: &str,
    group_id: &str,
    expires_at: Option<i64>,
    displaced: Option<&(String, u16)>,
) -> Result<usize, StoreError> {
    let mut seen = HashSet::new();
    let lines: Vec<&str> = non_empty_lines(text)
        .filter(|line| seen.insert(*line))
        .collect();

    let mut imported = 0;
    let mut failed = 0;
    // Insert-at-head in reverse keeps the final display order equal to the
    // input order. The reversal also means the last selection overwrite
    // comes from the earliest matching input line.
    for line in lines.iter().rev() {
        match parse_line(line) {
            Ok(mut record) => {
                record.group_id = group_id.to_string();
                record.expires_at = expires_at;
                let inherits_selection =
                    displaced.is_some_and(|(server, port)| record.same_endpoint(server, *port));
                let guid = store.insert_at_head(record)?;
                if inherits_selection {
                    store.select(&guid)?;
                }
                imported += 1;
            }
            Err(e) => {
                debug!(error = %e, "skipping unparsable line");
                failed += 1;
            }
        }
    }
    if imported > 0 || failed > 0 {
        debug!(imported, failed, "line import pass finished");
    }
    Ok(imported)
}

fn import_document(
    store: &ProfileStore,
    text: &str,
    group_id: &str,
    expires_at: Option<i64>,
) -> Result<ImportReport, StoreError> {
    if looks_like_tunnel_conf(text) {
        match parse_line(text) {
            Ok(mut record) => {
                record.group_id = group_id.to_string();
                record.expires_at = expires_at;
                store.insert_at_head(record)?;
                return Ok(ImportReport {
                    profiles: 1,
                    bundles: 0,
                });
            }
            Err(e) => {
                debug!(error = %e, "tunnel configuration rejected");
                return Ok(ImportReport::default());
            }
        }
    }

    if looks_like_bundle(text) {
        match parse_bundle(text) {
            Ok(records) => {
                let mut bundles = 0;
                for mut record in records.into_iter().rev() {
                    record.group_id = group_id.to_string();
                    record.expires_at = expires_at;
                    store.insert_at_head(record)?;
                    bundles += 1;
                }
                debug!(bundles, "bundle import finished");
                return Ok(ImportReport {
                    profiles: 0,
                    bundles,
                });
            }
            Err(e) => debug!(error = %e, "bundle document rejected"),
        }
    }

    Ok(ImportReport::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;

    use guard_crypto::VaultCipher;
    use guard_format::Protocol;

    use crate::backend::MemoryBackend;

    fn test_store() -> ProfileStore {
        ProfileStore::open(Arc::new(MemoryBackend::new()), VaultCipher::new("import-tests"))
            .unwrap()
    }

    const BUNDLE: &str = r#"{"remarks":"full bundle","inbounds":[],"outbounds":[{"protocol":"vmess","settings":{"vnext":[{"address":"bundle.example.com","port":443}]}}],"routing":{}}"#;

    #[test]
    fn final_order_equals_input_order() {
        let store = test_store();
        let text = "trojan://pw@first.example.com:443#one\n\
                    vless://uuid@second.example.com:443?security=tls#two\n\
                    socks://third.example.com:1080";
        let report = import_batch(&store, text, "", true, None).unwrap();
        assert_eq!(report.profiles, 3);

        let servers: Vec<String> = store
            .list()
            .into_iter()
            .map(|(_, record)| record.server)
            .collect();
        assert_eq!(
            servers,
            vec!["first.example.com", "second.example.com", "third.example.com"]
        );
    }

    #[test]
    fn duplicate_lines_import_once() {
        let store = test_store();
        let text = "trojan://pw@host.example.com:443#a\ntrojan://pw@host.example.com:443#a";
        let report = import_batch(&store, text, "", true, None).unwrap();
        assert_eq!(report.profiles, 1);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn failing_lines_do_not_abort_siblings() {
        let store = test_store();
        let text = "trojan://pw@ok.example.com:443#a\nnot a link\nsocks://also-ok.example.com:1080";
        let report = import_batch(&store, text, "", true, None).unwrap();
        assert_eq!(report.profiles, 2);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn base64_wrapped_subscription_body_is_decoded() {
        let store = test_store();
        let body = "trojan://pw@a.example.com:443#a\nsocks://b.example.com:1080";
        let wrapped = STANDARD.encode(body);
        let report = import_batch(&store, &wrapped, "sub-1", true, None).unwrap();
        assert_eq!(report.profiles, 2);
        assert!(store.list().iter().all(|(_, r)| r.group_id == "sub-1"));
    }

    #[test]
    fn replace_restores_selection_on_matching_endpoint() {
        let store = test_store();
        import_batch(
            &store,
            "trojan://old@keep.example.com:443#old\ntrojan://old@other.example.com:443#other",
            "sub-1",
            true,
            None,
        )
        .unwrap();
        let keep_guid = store
            .list()
            .into_iter()
            .find(|(_, r)| r.server == "keep.example.com")
            .map(|(guid, _)| guid)
            .unwrap();
        store.select(&keep_guid).unwrap();

        let report = import_batch(
            &store,
            "vless://uuid@fresh.example.com:443?security=tls#f\n\
             trojan://new@keep.example.com:443#renewed",
            "sub-1",
            false,
            None,
        )
        .unwrap();
        assert_eq!(report.profiles, 2);
        assert_eq!(store.len(), 2);

        let (guid, record) = store.selected_record().unwrap();
        assert_ne!(guid, keep_guid);
        assert_eq!(record.server, "keep.example.com");
        assert_eq!(record.remarks, "renewed");
    }

    #[test]
    fn append_keeps_existing_group_records() {
        let store = test_store();
        import_batch(&store, "trojan://pw@a.example.com:443#a", "sub-1", true, None).unwrap();
        import_batch(&store, "trojan://pw@b.example.com:443#b", "sub-1", true, None).unwrap();
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn blank_group_replace_never_touches_standalone_records() {
        let store = test_store();
        import_batch(&store, "socks://standalone.example.com:1080", "", true, None).unwrap();
        import_batch(&store, "trojan://pw@new.example.com:443#n", "", false, None).unwrap();
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn bundle_document_imports_as_custom_record() {
        let store = test_store();
        let report = import_batch(&store, BUNDLE, "", true, None).unwrap();
        assert_eq!(report.bundles, 1);
        assert_eq!(report.profiles, 0);

        let (_, record) = &store.list()[0];
        assert_eq!(record.protocol, Protocol::Custom);
        assert_eq!(record.remarks, "full bundle");
        assert_eq!(record.server, "bundle.example.com");
        assert!(record.raw_config.is_some());
    }

    #[test]
    fn bundle_array_keeps_document_order() {
        let store = test_store();
        let second = BUNDLE.replace("full bundle", "second bundle");
        let text = format!("[{},{}]", BUNDLE, second);
        let report = import_batch(&store, &text, "", true, None).unwrap();
        assert_eq!(report.bundles, 2);

        let listed = store.list();
        assert_eq!(listed[0].1.remarks, "full bundle");
        assert_eq!(listed[1].1.remarks, "second bundle");
    }

    #[test]
    fn tunnel_file_imports_via_document_path() {
        let store = test_store();
        let conf = "[Interface]\n\
                    PrivateKey = cHJpdmF0ZS1rZXk=\n\
                    Address = 10.0.0.2/32\n\n\
                    [Peer]\n\
                    PublicKey = cHVibGljLWtleQ==\n\
                    Endpoint = wg.example.com:51820\n";
        let report = import_batch(&store, conf, "", true, None).unwrap();
        assert_eq!(report.profiles, 1);

        let (_, record) = &store.list()[0];
        assert_eq!(record.protocol, Protocol::Wireguard);
        assert_eq!(record.server, "wg.example.com");
        assert_eq!(record.port, 51820);
    }

    #[test]
    fn expiry_is_stamped_on_every_import() {
        let store = test_store();
        import_batch(
            &store,
            "trojan://pw@a.example.com:443#a",
            "",
            true,
            Some(1_700_000_000_000),
        )
        .unwrap();
        import_batch(&store, BUNDLE, "", true, Some(1_700_000_000_000)).unwrap();

        for (_, record) in store.list() {
            assert_eq!(record.expires_at, Some(1_700_000_000_000));
        }
    }

    #[test]
    fn blank_input_is_an_error() {
        let store = test_store();
        assert!(matches!(
            import_batch(&store, "   \n  ", "", true, None),
            Err(StoreError::EmptyImport)
        ));
    }

    #[test]
    fn garbage_input_reports_zero() {
        let store = test_store();
        let report = import_batch(&store, "complete nonsense", "", true, None).unwrap();
        assert_eq!(report.total(), 0);
    }
}

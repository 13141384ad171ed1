//! Integration tests for the SQLite certificate store

use certdb_core::{CertDbError, CertificateRecord, CertificateStore, SqliteConfig, StatsReader};
use certdb_sqlite::{SqliteCertificateStore, SqliteStatsReader};
use serde_json::json;
use std::time::Duration;
use tempfile::TempDir;

fn create_test_store() -> (SqliteCertificateStore, TempDir) {
    let temp_dir = tempfile::tempdir().unwrap();
    let cfg = SqliteConfig::new(temp_dir.path().join("certstream.db"));
    let store = SqliteCertificateStore::open(cfg).unwrap();
    (store, temp_dir)
}

fn record(domains: &[&str], serial: &str) -> CertificateRecord {
    CertificateRecord::new(domains.iter().map(|d| d.to_string()).collect())
        .with_leaf_cert(json!({ "serial_number": serial, "all_domains": domains }))
        .with_source(json!({ "name": "test" }))
        .with_timestamp(json!(1700000000))
}

fn pause() {
    std::thread::sleep(Duration::from_millis(3));
}

#[test]
fn test_last_write_wins() {
    let (store, _temp) = create_test_store();
    let first = record(&["a.example"], "01");
    let second = record(&["a.example", "www.a.example"], "02");

    assert!(store.upsert("a.example", &first));
    assert!(store.upsert("a.example", &second));

    assert_eq!(store.get("a.example").unwrap(), Some(second));
    assert_eq!(store.list(10).unwrap().len(), 1);
}

#[test]
fn test_unknown_domain_is_absent() {
    let (store, _temp) = create_test_store();
    assert_eq!(store.get("never.example").unwrap(), None);
}

#[test]
fn test_created_at_survives_replace() {
    let (store, _temp) = create_test_store();
    store.put("a.example", &record(&["a.example"], "01")).unwrap();
    let before = store.list(1).unwrap().remove(0);

    pause();
    store.put("a.example", &record(&["a.example"], "02")).unwrap();
    let after = store.list(1).unwrap().remove(0);

    assert_eq!(before.created_at, after.created_at);
    assert!(after.updated_at.unwrap() > before.updated_at.unwrap());
    assert!(after.created_at.is_some());
}

#[test]
fn test_list_orders_by_recency_and_respects_limit() {
    let (store, _temp) = create_test_store();
    for domain in ["c.example", "a.example", "b.example"] {
        store.put(domain, &record(&[domain], "01")).unwrap();
        pause();
    }
    // Touch the oldest so it becomes the newest
    store.put("c.example", &record(&["c.example"], "02")).unwrap();

    let all = store.list(10).unwrap();
    let domains: Vec<_> = all.iter().map(|r| r.domain.as_str()).collect();
    assert_eq!(domains, vec!["c.example", "b.example", "a.example"]);
    assert!(all
        .windows(2)
        .all(|w| w[0].updated_at.unwrap() >= w[1].updated_at.unwrap()));

    assert_eq!(store.list(2).unwrap().len(), 2);
    assert!(store.list(0).unwrap().is_empty());
    assert_eq!(store.list(usize::MAX).unwrap().len(), 3);
    assert!(store.supports_recency_order());
}

#[test]
fn test_search_matches_substrings_literally() {
    let (store, _temp) = create_test_store();
    for domain in ["shop.example.com", "mail.example.com", "example_test.org", "other.net"] {
        store.put(domain, &record(&[domain], "01")).unwrap();
    }

    let hits = store.search("example.com", 10).unwrap();
    assert_eq!(hits.len(), 2);
    assert!(hits.iter().all(|h| h.domain.contains("example.com")));

    // `_` is not a wildcard
    let hits = store.search("e_t", 10).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].domain, "example_test.org");

    assert_eq!(store.search("EXAMPLE", 10).unwrap().len(), 3);
    assert_eq!(store.search("example", 1).unwrap().len(), 1);
    assert!(store.search("missing", 10).unwrap().is_empty());
}

#[test]
fn test_data_persists_across_reopen() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("nested").join("certs.db");
    let rec = record(&["a.example", "b.example"], "01");

    {
        let store = SqliteCertificateStore::open(SqliteConfig::new(path.clone())).unwrap();
        store.put("a.example", &rec).unwrap();
        store.close().unwrap();
    }

    let store = SqliteCertificateStore::open(SqliteConfig::new(path)).unwrap();
    store.initialize().unwrap();
    assert_eq!(store.get("a.example").unwrap(), Some(rec));
}

#[test]
fn test_close_is_idempotent_and_blocks_writes() {
    let (store, _temp) = create_test_store();
    store.close().unwrap();
    store.close().unwrap();
    assert!(store.is_closed());

    assert!(!store.upsert("a.example", &record(&["a.example"], "01")));
    assert!(matches!(store.get("a.example"), Err(CertDbError::Closed)));
    assert!(matches!(store.list(5), Err(CertDbError::Closed)));
}

#[test]
fn test_open_directory_is_unavailable() {
    let temp_dir = tempfile::tempdir().unwrap();
    let result = SqliteCertificateStore::open(SqliteConfig::new(temp_dir.path()));
    assert!(matches!(result, Err(CertDbError::StoreUnavailable { .. })));
}

#[test]
fn test_corrupt_rows_are_skipped_in_scans() {
    let (store, temp) = create_test_store();
    store.put("good.example", &record(&["good.example"], "01")).unwrap();

    let conn = rusqlite::Connection::open(temp.path().join("certstream.db")).unwrap();
    conn.execute(
        "INSERT INTO certificates (domain, data, created_at, updated_at)
         VALUES ('bad.example', '{\"domains\": [', '2024-01-01T00:00:00.000000Z', '2024-01-01T00:00:00.000000Z')",
        [],
    )
    .unwrap();
    drop(conn);

    let listed = store.list(10).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].domain, "good.example");

    assert!(matches!(store.get("bad.example"), Err(CertDbError::Decode(_))));
}

#[test]
fn test_stats_reader() {
    let (store, temp) = create_test_store();
    for domain in ["a.example", "longest.subdomain.example", "b.example"] {
        store.put(domain, &record(&[domain], "01")).unwrap();
    }

    let reader = SqliteStatsReader::new(temp.path().join("certstream.db"));
    assert_eq!(reader.count().unwrap(), 3);
    assert_eq!(
        reader.longest_key().unwrap().as_deref(),
        Some("longest.subdomain.example")
    );
    assert!(reader.total_size_bytes().unwrap() > 0);
    assert!(reader.latest_update().unwrap().is_some());

    let stats = reader.collect().unwrap();
    assert_eq!(stats.count, 3);

    store.close().unwrap();
    assert_eq!(reader.count().unwrap(), 3);
}

#[test]
fn test_stats_reader_empty_and_missing() {
    let (store, temp) = create_test_store();
    let reader = SqliteStatsReader::new(temp.path().join("certstream.db"));
    assert_eq!(reader.count().unwrap(), 0);
    assert_eq!(reader.longest_key().unwrap(), None);
    store.close().unwrap();

    let missing = SqliteStatsReader::new(temp.path().join("missing.db"));
    assert!(matches!(missing.count(), Err(CertDbError::NotFound(_))));
    assert!(matches!(missing.collect(), Err(CertDbError::NotFound(_))));
    assert!(!temp.path().join("missing.db").exists());
}

#[test]
fn test_lookup_includes_write_times() {
    let (store, _temp) = create_test_store();
    store.put("a.example", &record(&["a.example"], "01")).unwrap();
    pause();
    store.put("a.example", &record(&["a.example"], "02")).unwrap();

    let entry = store.lookup("a.example").unwrap().unwrap();
    assert_eq!(entry.record, record(&["a.example"], "02"));
    let created = entry.created_at.unwrap();
    let updated = entry.updated_at.unwrap();
    assert!(updated > created);

    assert!(store.lookup("missing.example").unwrap().is_none());
}

#[test]
fn test_unencodable_record_fails_upsert_and_keeps_previous() {
    let (store, _temp) = create_test_store();
    let good = record(&["a.example"], "01");
    assert!(store.upsert("a.example", &good));

    let shadowed = record(&["a.example"], "02").with_extra("domains", json!(["zzz"]));
    assert!(!store.upsert("a.example", &shadowed));
    assert!(matches!(
        store.put("a.example", &shadowed),
        Err(CertDbError::UpsertFailed { .. })
    ));

    assert_eq!(store.get("a.example").unwrap(), Some(good));
    assert_eq!(store.list(10).unwrap().len(), 1);
}

#[test]
fn test_latest_update_reported_in_stats() {
    let (store, temp) = create_test_store();
    let reader = SqliteStatsReader::new(temp.path().join("certstream.db"));
    assert_eq!(reader.collect().unwrap().latest_update, None);

    store.put("a.example", &record(&["a.example"], "01")).unwrap();
    let stats = reader.collect().unwrap();
    let latest = stats.latest_update.unwrap();
    let stored = store.lookup("a.example").unwrap().unwrap().updated_at.unwrap();
    assert_eq!(certdb_sqlite::schema::parse_timestamp(&latest), Some(stored));
}

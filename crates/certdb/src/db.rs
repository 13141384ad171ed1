//! Backend selection
//!
//! `CertDb` wraps whichever engine the configuration names so the rest of
//! the crate can stay generic over a single concrete store type.

use certdb_core::{
    BackendKind, CertDbError, CertificateRecord, CertificateStore, Result, StoreConfig, StoredCertificate,
};
use certdb_lmdb::LmdbCertificateStore;
use certdb_sqlite::SqliteCertificateStore;
use std::path::Path;

/// A certificate store opened from a [`StoreConfig`]
///
/// The backend is chosen by the config's [`BackendKind`], never by
/// inspecting what is on disk. Dropping a `CertDb` closes it; callers that
/// want to observe close errors call [`CertificateStore::close`] first.
pub enum CertDb {
    Sqlite(SqliteCertificateStore),
    Lmdb(LmdbCertificateStore),
}

macro_rules! dispatch {
    ($self:ident, $store:ident => $body:expr) => {
        match $self {
            CertDb::Sqlite($store) => $body,
            CertDb::Lmdb($store) => $body,
        }
    };
}

impl CertDb {
    /// Open a store that must already exist
    ///
    /// Unlike [`CertificateStore::open`] this never creates anything on
    /// disk; a missing path is `NotFound`.
    pub fn open_existing(cfg: StoreConfig) -> Result<Self> {
        let present = match cfg.backend {
            BackendKind::Sqlite => cfg.path.is_file(),
            BackendKind::Lmdb => cfg.path.is_dir(),
        };
        if !present {
            return Err(CertDbError::NotFound(format!(
                "{} store not found at {}",
                cfg.backend.label(),
                cfg.path.display()
            )));
        }
        Self::open(cfg)
    }

    pub fn path(&self) -> &Path {
        dispatch!(self, store => store.path())
    }
}

impl CertificateStore for CertDb {
    type Config = StoreConfig;

    fn open(cfg: StoreConfig) -> Result<Self> {
        let db = match cfg.backend {
            BackendKind::Sqlite => Self::Sqlite(SqliteCertificateStore::open(cfg.sqlite_config())?),
            BackendKind::Lmdb => Self::Lmdb(LmdbCertificateStore::open(cfg.lmdb_config())?),
        };
        tracing::debug!("Opened {} store at {}", cfg.backend, cfg.path.display());
        Ok(db)
    }

    fn initialize(&self) -> Result<()> {
        dispatch!(self, store => store.initialize())
    }

    fn put(&self, domain: &str, record: &CertificateRecord) -> Result<()> {
        dispatch!(self, store => store.put(domain, record))
    }

    fn get(&self, domain: &str) -> Result<Option<CertificateRecord>> {
        dispatch!(self, store => store.get(domain))
    }

    fn lookup(&self, domain: &str) -> Result<Option<StoredCertificate>> {
        dispatch!(self, store => store.lookup(domain))
    }

    fn list(&self, limit: usize) -> Result<Vec<StoredCertificate>> {
        dispatch!(self, store => store.list(limit))
    }

    fn search(&self, needle: &str, limit: usize) -> Result<Vec<StoredCertificate>> {
        dispatch!(self, store => store.search(needle, limit))
    }

    fn backend(&self) -> BackendKind {
        dispatch!(self, store => store.backend())
    }

    fn close(&self) -> Result<()> {
        dispatch!(self, store => store.close())
    }

    fn is_closed(&self) -> bool {
        dispatch!(self, store => store.is_closed())
    }
}

impl Drop for CertDb {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            tracing::warn!("Error closing {} store: {}", self.backend(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn record(domains: &[&str]) -> CertificateRecord {
        CertificateRecord::new(domains.iter().map(|d| d.to_string()).collect())
            .with_source(json!({"name": "test"}))
    }

    #[test]
    fn test_open_selects_backend() {
        let temp_dir = TempDir::new().unwrap();

        let sqlite = CertDb::open(StoreConfig::new(
            BackendKind::Sqlite,
            temp_dir.path().join("certs.db"),
        ))
        .unwrap();
        assert_eq!(sqlite.backend(), BackendKind::Sqlite);
        assert!(sqlite.supports_recency_order());

        let lmdb = CertDb::open(StoreConfig::new(
            BackendKind::Lmdb,
            temp_dir.path().join("certs_lmdb"),
        ))
        .unwrap();
        assert_eq!(lmdb.backend(), BackendKind::Lmdb);
        assert!(!lmdb.supports_recency_order());
        assert!(lmdb.path().is_dir());
    }

    #[test]
    fn test_delegates_to_backend() {
        let temp_dir = TempDir::new().unwrap();
        for backend in [BackendKind::Sqlite, BackendKind::Lmdb] {
            let path = temp_dir.path().join(backend.as_str());
            let db = CertDb::open(StoreConfig::new(backend, &path)).unwrap();
            db.initialize().unwrap();

            assert!(db.upsert("a.example", &record(&["a.example"])));
            assert_eq!(db.get("a.example").unwrap(), Some(record(&["a.example"])));
            assert_eq!(db.get("missing.example").unwrap(), None);
            assert_eq!(db.list(10).unwrap().len(), 1);
            assert_eq!(db.search("A.EX", 10).unwrap().len(), 1);

            db.close().unwrap();
            assert!(db.is_closed());
            db.close().unwrap();
        }
    }

    #[test]
    fn test_open_existing_never_creates() {
        let temp_dir = TempDir::new().unwrap();

        for backend in [BackendKind::Sqlite, BackendKind::Lmdb] {
            let path = temp_dir.path().join(format!("typo_{}", backend.as_str()));
            let err = CertDb::open_existing(StoreConfig::new(backend, &path)).err();
            assert!(matches!(err, Some(CertDbError::NotFound(_))));
            assert!(!path.exists());

            CertDb::open(StoreConfig::new(backend, &path))
                .unwrap()
                .close()
                .unwrap();
            let db = CertDb::open_existing(StoreConfig::new(backend, &path)).unwrap();
            assert_eq!(db.backend(), backend);
        }
    }

    #[test]
    fn test_lookup_reports_write_times_where_tracked() {
        let temp_dir = TempDir::new().unwrap();

        for backend in [BackendKind::Sqlite, BackendKind::Lmdb] {
            let path = temp_dir.path().join(backend.as_str());
            let db = CertDb::open(StoreConfig::new(backend, &path)).unwrap();
            assert!(db.upsert("a.example", &record(&["a.example"])));

            let entry = db.lookup("a.example").unwrap().unwrap();
            assert_eq!(entry.domain, "a.example");
            assert_eq!(entry.record, record(&["a.example"]));
            assert_eq!(entry.created_at.is_some(), backend == BackendKind::Sqlite);
            assert_eq!(entry.updated_at.is_some(), backend == BackendKind::Sqlite);
            assert!(db.lookup("missing.example").unwrap().is_none());
        }
    }
}

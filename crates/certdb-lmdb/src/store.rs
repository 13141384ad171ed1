use certdb_core::{
    error::{CertDbError, Result},
    traits::{CertificateStore, JsonCodec, RecordCodec},
    BackendKind, CertificateRecord, LmdbConfig, StoredCertificate, SyncMode,
};
use lmdb::{Database, DatabaseFlags, Environment, EnvironmentFlags, Transaction, WriteFlags};
use parking_lot::RwLock;
use std::path::Path;

use crate::iter::LmdbKeyScan;
use crate::keys::{contains_ignore_ascii_case, domain_key};

/// Open environment plus the unnamed database holding `domain -> payload`
struct LmdbHandle {
    env: Environment,
    db: Database,
}

/// LMDB-backed certificate store
///
/// A single flat keyspace. Each upsert is one put in its own write
/// transaction, atomic per key. There is no created/updated bookkeeping, so
/// `list` returns keys in byte order rather than by recency.
pub struct LmdbCertificateStore {
    handle: RwLock<Option<LmdbHandle>>,
    config: LmdbConfig,
    codec: JsonCodec,
}

impl LmdbCertificateStore {
    pub fn path(&self) -> &Path {
        &self.config.path
    }

    pub fn config(&self) -> &LmdbConfig {
        &self.config
    }

    fn open_env(cfg: &LmdbConfig) -> Result<Environment> {
        let mut env_builder = Environment::new();
        env_builder.set_map_size(cfg.map_size);
        env_builder.set_max_readers(cfg.max_readers);

        let mut flags = EnvironmentFlags::empty();
        match cfg.sync_mode {
            SyncMode::Full => {}
            SyncMode::NoMetaSync => {
                flags.insert(EnvironmentFlags::NO_META_SYNC);
            }
            SyncMode::NoSync => {
                flags.insert(EnvironmentFlags::NO_SYNC);
            }
        }
        env_builder.set_flags(flags);

        env_builder
            .open(&cfg.path)
            .map_err(|e| CertDbError::unavailable(&cfg.path, e))
    }

    /// Run `f` against the open environment, or fail with `Closed`
    fn with_handle<T>(&self, f: impl FnOnce(&LmdbHandle) -> Result<T>) -> Result<T> {
        let guard = self.handle.read();
        let handle = guard.as_ref().ok_or(CertDbError::Closed)?;
        f(handle)
    }

    /// Scan keys in order, decoding values and skipping ones that fail
    fn scan<F>(&self, limit: usize, mut filter: F) -> Result<Vec<StoredCertificate>>
    where
        F: FnMut(&str) -> bool,
    {
        let entries = self.with_handle(|handle| {
            let txn = handle
                .env
                .begin_ro_txn()
                .map_err(|e| CertDbError::Query(e.to_string()))?;
            LmdbKeyScan::new(&txn, handle.db, limit, |key| {
                std::str::from_utf8(key).map(&mut filter).unwrap_or(false)
            })
        })?;

        let mut records = Vec::with_capacity(entries.len());
        for (key, value) in entries {
            let domain = String::from_utf8_lossy(&key).into_owned();
            match self.codec.decode(&value) {
                Ok(record) => records.push(StoredCertificate::untimed(domain, record)),
                Err(e) => {
                    tracing::warn!("Error decoding certificate for key {}: {}", domain, e);
                }
            }
        }
        Ok(records)
    }
}

impl CertificateStore for LmdbCertificateStore {
    type Config = LmdbConfig;

    fn open(cfg: LmdbConfig) -> Result<Self> {
        // Create directory if it doesn't exist
        std::fs::create_dir_all(&cfg.path).map_err(|e| CertDbError::unavailable(&cfg.path, e))?;

        let env = Self::open_env(&cfg)?;
        let db = env
            .create_db(None, DatabaseFlags::empty())
            .map_err(|e| CertDbError::unavailable(&cfg.path, e))?;

        tracing::info!("LMDB database initialized at {}", cfg.path.display());

        Ok(Self {
            handle: RwLock::new(Some(LmdbHandle { env, db })),
            config: cfg,
            codec: JsonCodec,
        })
    }

    fn initialize(&self) -> Result<()> {
        self.with_handle(|handle| {
            handle
                .env
                .create_db(None, DatabaseFlags::empty())
                .map(|_| ())
                .map_err(|e| CertDbError::unavailable(&self.config.path, e))
        })
    }

    fn put(&self, domain: &str, record: &CertificateRecord) -> Result<()> {
        let key = domain_key(domain)?;
        let value = self
            .codec
            .encode(record)
            .map_err(|e| CertDbError::upsert_failed(domain, e))?;

        self.with_handle(|handle| {
            let mut txn = handle
                .env
                .begin_rw_txn()
                .map_err(|e| CertDbError::upsert_failed(domain, e))?;
            txn.put(handle.db, &key, &value, WriteFlags::empty())
                .map_err(|e| CertDbError::upsert_failed(domain, e))?;
            txn.commit()
                .map_err(|e| CertDbError::upsert_failed(domain, e))
        })
    }

    fn get(&self, domain: &str) -> Result<Option<CertificateRecord>> {
        if domain_key(domain).is_err() {
            return Ok(None);
        }

        let value = self.with_handle(|handle| {
            let txn = handle
                .env
                .begin_ro_txn()
                .map_err(|e| CertDbError::Query(e.to_string()))?;
            match txn.get(handle.db, &domain) {
                Ok(bytes) => Ok(Some(bytes.to_vec())),
                Err(lmdb::Error::NotFound) => Ok(None),
                Err(e) => Err(CertDbError::Query(e.to_string())),
            }
        })?;

        value.map(|bytes| self.codec.decode(&bytes)).transpose()
    }

    fn list(&self, limit: usize) -> Result<Vec<StoredCertificate>> {
        self.scan(limit, |_| true)
    }

    fn search(&self, needle: &str, limit: usize) -> Result<Vec<StoredCertificate>> {
        self.scan(limit, |domain| contains_ignore_ascii_case(domain, needle))
    }

    fn backend(&self) -> BackendKind {
        BackendKind::Lmdb
    }

    fn close(&self) -> Result<()> {
        let mut guard = self.handle.write();
        if let Some(handle) = guard.take() {
            let synced = handle.env.sync(true);
            // Dropping the environment releases the files
            drop(handle);
            synced.map_err(|e| CertDbError::Query(e.to_string()))?;
            tracing::debug!("LMDB database closed at {}", self.config.path.display());
        }
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.handle.read().is_none()
    }
}

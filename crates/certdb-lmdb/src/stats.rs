use certdb_core::{
    error::{CertDbError, Result},
    traits::StatsReader,
    BackendKind,
};
use lmdb::{Cursor, Environment, EnvironmentFlags, Transaction};
use std::path::{Path, PathBuf};

/// Read-only statistics over an LMDB certificate environment
///
/// Opens its own read-only environment per call. Do not point it at an
/// environment this process already has open for writing.
pub struct LmdbStatsReader {
    path: PathBuf,
}

impl LmdbStatsReader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn not_found(&self) -> CertDbError {
        CertDbError::NotFound(format!("LMDB path not found at {}", self.path.display()))
    }

    fn open_read_only(&self) -> Result<Environment> {
        if !self.path.is_dir() {
            return Err(self.not_found());
        }

        Environment::new()
            .set_flags(EnvironmentFlags::READ_ONLY)
            .open(&self.path)
            .map_err(|e| CertDbError::Query(format!("LMDB query failed: {e}")))
    }

    /// Walk every key once, feeding it to `visit`
    fn visit_keys(&self, mut visit: impl FnMut(&[u8])) -> Result<()> {
        let env = self.open_read_only()?;
        let db = env
            .open_db(None)
            .map_err(|e| CertDbError::Query(format!("LMDB query failed: {e}")))?;
        let txn = env
            .begin_ro_txn()
            .map_err(|e| CertDbError::Query(format!("LMDB query failed: {e}")))?;
        let mut cursor = txn
            .open_ro_cursor(db)
            .map_err(|e| CertDbError::Query(format!("LMDB query failed: {e}")))?;

        for (key, _) in cursor.iter_start() {
            visit(key);
        }
        Ok(())
    }
}

impl StatsReader for LmdbStatsReader {
    fn backend(&self) -> BackendKind {
        BackendKind::Lmdb
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn count(&self) -> Result<u64> {
        let mut count = 0u64;
        self.visit_keys(|_| count += 1)?;
        Ok(count)
    }

    fn total_size_bytes(&self) -> Result<u64> {
        if !self.path.is_dir() {
            return Err(self.not_found());
        }

        let mut total = 0u64;
        for entry in std::fs::read_dir(&self.path)? {
            let meta = entry?.metadata()?;
            if meta.is_file() {
                total += meta.len();
            }
        }
        Ok(total)
    }

    fn longest_key(&self) -> Result<Option<String>> {
        let mut longest: Option<String> = None;
        self.visit_keys(|key| {
            let domain = String::from_utf8_lossy(key);
            let longer = longest
                .as_ref()
                .map_or(true, |current| domain.chars().count() > current.chars().count());
            if longer {
                longest = Some(domain.into_owned());
            }
        })?;
        Ok(longest)
    }
}

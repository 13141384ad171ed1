use certdb_core::{
    error::{CertDbError, Result},
    traits::StatsReader,
    BackendKind,
};
use rusqlite::{Connection, OpenFlags, OptionalExtension};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Read-only statistics over a SQLite certificate database
pub struct SqliteStatsReader {
    path: PathBuf,
}

impl SqliteStatsReader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn open_read_only(&self) -> Result<Connection> {
        if !self.path.is_file() {
            return Err(CertDbError::NotFound(format!(
                "SQLite DB not found at {}",
                self.path.display()
            )));
        }

        Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| CertDbError::Query(format!("SQLite query failed: {e}")))
    }

    /// Path of a WAL-mode sidecar file (`-wal`, `-shm`)
    fn sidecar(&self, suffix: &str) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(suffix);
        PathBuf::from(name)
    }
}

impl StatsReader for SqliteStatsReader {
    fn backend(&self) -> BackendKind {
        BackendKind::Sqlite
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn count(&self) -> Result<u64> {
        let conn = self.open_read_only()?;
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM certificates", [], |row| row.get(0))
            .map_err(|e| CertDbError::Query(format!("SQLite query failed: {e}")))?;
        Ok(count.max(0) as u64)
    }

    fn total_size_bytes(&self) -> Result<u64> {
        let main = std::fs::metadata(&self.path).map_err(|_| {
            CertDbError::NotFound(format!("SQLite DB not found at {}", self.path.display()))
        })?;

        let mut total = main.len();
        for suffix in ["-wal", "-shm"] {
            if let Ok(meta) = std::fs::metadata(self.sidecar(suffix)) {
                total += meta.len();
            }
        }
        Ok(total)
    }

    fn longest_key(&self) -> Result<Option<String>> {
        let conn = self.open_read_only()?;
        conn.query_row(
            "SELECT domain FROM certificates ORDER BY LENGTH(domain) DESC, domain ASC LIMIT 1",
            [],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| CertDbError::Query(format!("SQLite query failed: {e}")))
    }

    /// Most recent `updated_at` in the table
    fn latest_update(&self) -> Result<Option<String>> {
        let conn = self.open_read_only()?;
        conn.query_row("SELECT MAX(updated_at) FROM certificates", [], |row| {
            row.get(0)
        })
        .map_err(|e| CertDbError::Query(format!("SQLite query failed: {e}")))
    }
}

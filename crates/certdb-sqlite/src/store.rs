use certdb_core::{
    error::{CertDbError, Result},
    traits::{CertificateStore, JsonCodec},
    BackendKind, CertificateRecord, SqliteConfig, StoredCertificate,
};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use std::path::Path;
use std::time::Duration;

use crate::schema;

/// SQLite-backed certificate store
///
/// One `certificates` table keyed by domain. WAL mode lets readers in other
/// processes run while this connection writes.
pub struct SqliteCertificateStore {
    conn: Mutex<Option<Connection>>,
    config: SqliteConfig,
    codec: JsonCodec,
}

impl SqliteCertificateStore {
    pub fn path(&self) -> &Path {
        &self.config.path
    }

    pub fn config(&self) -> &SqliteConfig {
        &self.config
    }

    /// Configure SQLite connection
    fn configure_connection(conn: &Connection, cfg: &SqliteConfig) -> Result<()> {
        if cfg.wal_mode {
            conn.pragma_update(None, "journal_mode", "WAL")
                .map_err(|e| CertDbError::Config(e.to_string()))?;
        }

        conn.pragma_update(None, "synchronous", cfg.synchronous.as_pragma())
            .map_err(|e| CertDbError::Config(e.to_string()))?;

        conn.pragma_update(None, "cache_size", cfg.cache_size)
            .map_err(|e| CertDbError::Config(e.to_string()))?;

        conn.busy_timeout(Duration::from_millis(cfg.busy_timeout_ms))
            .map_err(|e| CertDbError::Config(e.to_string()))?;

        Ok(())
    }

    /// Run `f` against the open connection, or fail with `Closed`
    fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let guard = self.conn.lock();
        let conn = guard.as_ref().ok_or(CertDbError::Closed)?;
        f(conn)
    }

    fn query_records(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> Result<Vec<StoredCertificate>> {
        self.with_conn(|conn| {
            let mut stmt = conn
                .prepare(sql)
                .map_err(|e| CertDbError::Query(e.to_string()))?;
            let rows = stmt
                .query_map(params, |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, Option<String>>(2)?,
                        row.get::<_, Option<String>>(3)?,
                    ))
                })
                .map_err(|e| CertDbError::Query(e.to_string()))?;

            let mut records = Vec::new();
            for row in rows {
                let (domain, data, created_at, updated_at) =
                    row.map_err(|e| CertDbError::Query(e.to_string()))?;

                match self.codec.decode_str(&data) {
                    Ok(record) => records.push(StoredCertificate {
                        domain,
                        record,
                        created_at: created_at.as_deref().and_then(schema::parse_timestamp),
                        updated_at: updated_at.as_deref().and_then(schema::parse_timestamp),
                    }),
                    Err(e) => {
                        tracing::warn!("Error decoding certificate for {}: {}", domain, e);
                    }
                }
            }

            Ok(records)
        })
    }
}

/// Clamp a caller limit to SQLite's signed LIMIT
fn sql_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

/// Escape LIKE wildcards so `needle` matches literally
fn like_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

impl CertificateStore for SqliteCertificateStore {
    type Config = SqliteConfig;

    fn open(cfg: SqliteConfig) -> Result<Self> {
        // Create parent directory if needed
        if let Some(parent) = cfg.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| CertDbError::unavailable(&cfg.path, e))?;
            }
        }

        let conn = Connection::open_with_flags(
            &cfg.path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE,
        )
        .map_err(|e| CertDbError::unavailable(&cfg.path, e))?;

        Self::configure_connection(&conn, &cfg)
            .and_then(|_| schema::init(&conn))
            .map_err(|e| CertDbError::unavailable(&cfg.path, e))?;

        tracing::info!("SQLite database initialized at {}", cfg.path.display());

        Ok(Self {
            conn: Mutex::new(Some(conn)),
            config: cfg,
            codec: JsonCodec,
        })
    }

    fn initialize(&self) -> Result<()> {
        self.with_conn(schema::init)
    }

    fn put(&self, domain: &str, record: &CertificateRecord) -> Result<()> {
        let data = self
            .codec
            .encode_to_string(record)
            .map_err(|e| CertDbError::upsert_failed(domain, e))?;
        let now = schema::now_timestamp();

        self.with_conn(|conn| {
            // Single statement: created_at survives a replace, updated_at moves.
            conn.execute(
                "INSERT INTO certificates (domain, data, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?3)
                 ON CONFLICT(domain) DO UPDATE SET
                    data = excluded.data,
                    updated_at = excluded.updated_at",
                params![domain, data, now],
            )
            .map_err(|e| CertDbError::upsert_failed(domain, e))?;
            Ok(())
        })
    }

    fn get(&self, domain: &str) -> Result<Option<CertificateRecord>> {
        let data: Option<String> = self.with_conn(|conn| {
            conn.query_row(
                "SELECT data FROM certificates WHERE domain = ?1",
                [domain],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| CertDbError::Query(e.to_string()))
        })?;

        data.map(|text| self.codec.decode_str(&text)).transpose()
    }

    fn lookup(&self, domain: &str) -> Result<Option<StoredCertificate>> {
        let row: Option<(String, Option<String>, Option<String>)> = self.with_conn(|conn| {
            conn.query_row(
                "SELECT data, created_at, updated_at FROM certificates WHERE domain = ?1",
                [domain],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()
            .map_err(|e| CertDbError::Query(e.to_string()))
        })?;

        row.map(|(data, created_at, updated_at)| {
            Ok(StoredCertificate {
                domain: domain.to_string(),
                record: self.codec.decode_str(&data)?,
                created_at: created_at.as_deref().and_then(schema::parse_timestamp),
                updated_at: updated_at.as_deref().and_then(schema::parse_timestamp),
            })
        })
        .transpose()
    }

    fn list(&self, limit: usize) -> Result<Vec<StoredCertificate>> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        self.query_records(
            "SELECT domain, data, created_at, updated_at
             FROM certificates
             ORDER BY updated_at DESC
             LIMIT ?1",
            [sql_limit(limit)],
        )
    }

    fn search(&self, needle: &str, limit: usize) -> Result<Vec<StoredCertificate>> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        self.query_records(
            "SELECT domain, data, created_at, updated_at
             FROM certificates
             WHERE domain LIKE ?1 ESCAPE '\\'
             ORDER BY updated_at DESC
             LIMIT ?2",
            params![like_pattern(needle), sql_limit(limit)],
        )
    }

    fn backend(&self) -> BackendKind {
        BackendKind::Sqlite
    }

    fn close(&self) -> Result<()> {
        let mut guard = self.conn.lock();
        if let Some(conn) = guard.take() {
            conn.close().map_err(|(_, e)| CertDbError::Query(e.to_string()))?;
            tracing::debug!("SQLite database closed at {}", self.config.path.display());
        }
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.conn.lock().is_none()
    }
}

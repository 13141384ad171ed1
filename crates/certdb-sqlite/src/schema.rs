use certdb_core::error::{CertDbError, Result};
use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use rusqlite::Connection;

/// Schema version written to `PRAGMA user_version`
pub const SCHEMA_VERSION: i64 = 1;

/// Create the certificates table and its index if missing
///
/// Refuses to touch a database written by a newer schema.
pub fn init(conn: &Connection) -> Result<()> {
    let version: i64 = conn
        .query_row("PRAGMA user_version", [], |row| row.get(0))
        .map_err(|e| CertDbError::Query(e.to_string()))?;

    if version > SCHEMA_VERSION {
        return Err(CertDbError::Config(format!(
            "database schema version {} is newer than supported version {}",
            version, SCHEMA_VERSION
        )));
    }

    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS certificates (
            domain TEXT PRIMARY KEY,
            data TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_certificates_updated_at
            ON certificates(updated_at);",
    )
    .map_err(|e| CertDbError::Query(e.to_string()))?;

    if version < SCHEMA_VERSION {
        conn.pragma_update(None, "user_version", SCHEMA_VERSION)
            .map_err(|e| CertDbError::Query(e.to_string()))?;
    }

    Ok(())
}

/// Current time in the stored timestamp format
///
/// Fixed-width RFC 3339 with microseconds, so text order is time order.
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse a stored timestamp
///
/// Also accepts SQLite's `CURRENT_TIMESTAMP` format for rows written by
/// older tooling. Anything else reads as `None`.
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

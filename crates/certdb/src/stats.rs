//! Store statistics reporting
//!
//! One line per store, e.g.
//!
//! ```text
//! SQLite: size=4096 bytes (4.00 KB), entries=12, longest_domain=a.example, latest_update=2024-01-02T03:04:05.000000Z
//! LMDB: ERROR - LMDB path not found at certstream_lmdb
//! ```

use certdb_core::{BackendKind, CertDbError, StatsReader, StoreStats};
use certdb_lmdb::LmdbStatsReader;
use certdb_sqlite::SqliteStatsReader;
use std::fmt;
use std::path::PathBuf;

const SIZE_UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Format a byte count with two decimals in 1024 steps, capped at TB
pub fn human_readable_size(num_bytes: u64) -> String {
    let mut size = num_bytes as f64;
    for unit in &SIZE_UNITS[..SIZE_UNITS.len() - 1] {
        if size < 1024.0 {
            return format!("{size:.2} {unit}");
        }
        size /= 1024.0;
    }
    format!("{size:.2} TB")
}

/// Read-only stats reader for `backend` at `path`
pub fn stats_reader(backend: BackendKind, path: impl Into<PathBuf>) -> Box<dyn StatsReader> {
    match backend {
        BackendKind::Sqlite => Box::new(SqliteStatsReader::new(path)),
        BackendKind::Lmdb => Box::new(LmdbStatsReader::new(path)),
    }
}

/// Stats for one store, or why they could not be read
#[derive(Debug, Clone)]
pub struct StatsReport {
    pub backend: BackendKind,
    pub outcome: Result<StoreStats, String>,
}

impl StatsReport {
    /// Collect stats from `reader`. Failures become part of the report.
    pub fn collect(reader: &dyn StatsReader) -> Self {
        let outcome = reader.collect().map_err(|e| match e {
            CertDbError::NotFound(msg) | CertDbError::Query(msg) => msg,
            other => other.to_string(),
        });
        if let Err(msg) = &outcome {
            tracing::debug!("Stats for {} unavailable: {}", reader.backend(), msg);
        }

        Self {
            backend: reader.backend(),
            outcome,
        }
    }

    /// Collect stats for `backend` at `path`
    pub fn for_store(backend: BackendKind, path: impl Into<PathBuf>) -> Self {
        Self::collect(stats_reader(backend, path).as_ref())
    }
}

impl fmt::Display for StatsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = self.backend.label();
        match &self.outcome {
            Ok(stats) => {
                write!(
                    f,
                    "{label}: size={} bytes ({}), entries={}, longest_domain={}",
                    stats.size_bytes,
                    human_readable_size(stats.size_bytes),
                    stats.count,
                    stats.longest_domain.as_deref().unwrap_or("<none>")
                )?;
                if let Some(latest) = &stats.latest_update {
                    write!(f, ", latest_update={latest}")?;
                }
                Ok(())
            }
            Err(msg) => write!(f, "{label}: ERROR - {msg}"),
        }
    }
}

use super::{LmdbConfig, SqliteConfig};
use crate::error::CertDbError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Storage engine behind a certificate store
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Single-table relational store. Tracks created/updated times.
    Sqlite,
    /// Flat ordered key-value store. Keys come back in byte order only.
    Lmdb,
}

impl BackendKind {
    pub fn default_path(&self) -> PathBuf {
        match self {
            BackendKind::Sqlite => PathBuf::from("certstream.db"),
            BackendKind::Lmdb => PathBuf::from("certstream_lmdb"),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Sqlite => "sqlite",
            BackendKind::Lmdb => "lmdb",
        }
    }

    /// Human label used in reports
    pub fn label(&self) -> &'static str {
        match self {
            BackendKind::Sqlite => "SQLite",
            BackendKind::Lmdb => "LMDB",
        }
    }

    /// Whether `list` on this backend returns most-recently-updated first
    pub fn supports_recency_order(&self) -> bool {
        matches!(self, BackendKind::Sqlite)
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = CertDbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" | "relational" => Ok(BackendKind::Sqlite),
            "lmdb" | "kv" | "keyvalue" | "rocksdb" => Ok(BackendKind::Lmdb),
            other => Err(CertDbError::Config(format!(
                "unknown backend '{other}' (expected sqlite or lmdb)"
            ))),
        }
    }
}

/// Backend selection made once at startup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub backend: BackendKind,

    /// SQLite database file or LMDB environment directory
    pub path: PathBuf,
}

impl StoreConfig {
    pub fn new(backend: BackendKind, path: impl Into<PathBuf>) -> Self {
        Self {
            backend,
            path: path.into(),
        }
    }

    /// Use the backend's default location
    pub fn with_default_path(backend: BackendKind) -> Self {
        Self::new(backend, backend.default_path())
    }

    pub fn sqlite_config(&self) -> SqliteConfig {
        SqliteConfig::new(self.path.clone())
    }

    pub fn lmdb_config(&self) -> LmdbConfig {
        LmdbConfig::new(self.path.clone())
    }
}

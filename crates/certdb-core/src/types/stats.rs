use crate::config::BackendKind;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Aggregate figures for one store, as reported by a `StatsReader`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStats {
    pub backend: BackendKind,

    /// Path the figures were read from
    pub path: PathBuf,

    /// Bytes on disk
    pub size_bytes: u64,

    /// Number of stored domains
    pub count: u64,

    /// Longest stored domain key, if any
    pub longest_domain: Option<String>,

    /// Most recent write. Only the relational backend tracks this.
    #[serde(default)]
    pub latest_update: Option<String>,
}

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the ordered key-value (LMDB) certificate store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LmdbConfig {
    /// Path to the LMDB environment directory
    pub path: PathBuf,

    /// Maximum map size for LMDB (in bytes)
    /// Default: 10GB
    #[serde(default = "default_map_size")]
    pub map_size: usize,

    /// Sync mode for durability
    #[serde(default)]
    pub sync_mode: SyncMode,

    /// Maximum number of concurrent readers
    /// Default: 126
    #[serde(default = "default_max_readers")]
    pub max_readers: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum SyncMode {
    /// Full durability – calls `fsync()` on every commit.
    ///
    /// A record is only reported as stored once it has reached the disk.
    #[default]
    Full,

    /// Skips syncing the LMDB meta-page on each commit.
    ///
    /// Data pages are still synced. On an OS crash or power failure the last
    /// transaction _may_ be lost, but the database will remain consistent.
    NoMetaSync,

    /// Disables `fsync()` entirely – the OS page cache decides when to flush.
    ///
    /// Only use this for ephemeral, reproducible, or test workloads.
    NoSync,
}

fn default_map_size() -> usize {
    10 * 1024 * 1024 * 1024 // 10GB
}

fn default_max_readers() -> u32 {
    126
}

impl LmdbConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            map_size: default_map_size(),
            sync_mode: SyncMode::default(),
            max_readers: default_max_readers(),
        }
    }

    pub fn with_map_size(mut self, map_size: usize) -> Self {
        self.map_size = map_size;
        self
    }

    pub fn with_sync_mode(mut self, sync_mode: SyncMode) -> Self {
        self.sync_mode = sync_mode;
        self
    }

    pub fn with_max_readers(mut self, max_readers: u32) -> Self {
        self.max_readers = max_readers;
        self
    }
}

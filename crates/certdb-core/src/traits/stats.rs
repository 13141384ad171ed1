use crate::config::BackendKind;
use crate::error::Result;
use crate::types::StoreStats;
use std::path::Path;

/// Read-only aggregate queries over a store on disk
///
/// Each call opens the store read-only. A missing store is reported as
/// `CertDbError::NotFound` rather than being created.
pub trait StatsReader {
    fn backend(&self) -> BackendKind;

    fn path(&self) -> &Path;

    /// Number of stored domains
    fn count(&self) -> Result<u64>;

    /// Bytes used on disk
    fn total_size_bytes(&self) -> Result<u64>;

    /// Longest stored domain key
    fn longest_key(&self) -> Result<Option<String>>;

    /// Time of the most recent write, for backends that track it
    fn latest_update(&self) -> Result<Option<String>> {
        Ok(None)
    }

    fn collect(&self) -> Result<StoreStats> {
        Ok(StoreStats {
            backend: self.backend(),
            path: self.path().to_path_buf(),
            size_bytes: self.total_size_bytes()?,
            count: self.count()?,
            longest_domain: self.longest_key()?,
            latest_update: self.latest_update()?,
        })
    }
}

use crate::config::BackendKind;
use crate::error::Result;
use crate::observe;
use crate::types::{CertificateRecord, StoredCertificate};

/// Certificate store: one record per domain, insert-or-replace
///
/// Implementations must make each `put` atomic per key: the previous value
/// is either fully replaced or left untouched. A record is visible to `get`
/// only after its write has committed.
///
/// `list` ordering is a backend capability: the relational backend returns
/// the most recently updated records first, the key-value backend returns
/// keys in byte order. Callers that need recency must check
/// [`CertificateStore::supports_recency_order`].
pub trait CertificateStore: Send + Sync {
    type Config;

    /// Open the store, creating it on first run
    fn open(cfg: Self::Config) -> Result<Self>
    where
        Self: Sized;

    /// Ensure schema/directories exist. Safe to call repeatedly.
    fn initialize(&self) -> Result<()>;

    /// Write `record` under `domain`, replacing any prior value
    fn put(&self, domain: &str, record: &CertificateRecord) -> Result<()>;

    /// Like [`put`](Self::put) but never fails past this boundary.
    ///
    /// Failures are logged with the domain and reported as `false` so a
    /// single bad record cannot stop ingestion.
    fn upsert(&self, domain: &str, record: &CertificateRecord) -> bool {
        match self.put(domain, record) {
            Ok(()) => {
                tracing::debug!("Stored certificate for domain: {}", domain);
                observe::record_upsert(self.backend(), true);
                true
            }
            Err(e) => {
                tracing::error!("Error storing certificate for {}: {}", domain, e);
                observe::record_upsert(self.backend(), false);
                false
            }
        }
    }

    /// Point lookup. `None` means the domain was never stored.
    fn get(&self, domain: &str) -> Result<Option<CertificateRecord>>;

    /// Point lookup including write times where the backend tracks them
    fn lookup(&self, domain: &str) -> Result<Option<StoredCertificate>> {
        Ok(self
            .get(domain)?
            .map(|record| StoredCertificate::untimed(domain.to_string(), record)))
    }

    /// Up to `limit` records in the backend's native order
    fn list(&self, limit: usize) -> Result<Vec<StoredCertificate>>;

    /// Up to `limit` records whose domain contains `needle`
    fn search(&self, needle: &str, limit: usize) -> Result<Vec<StoredCertificate>>;

    /// Which engine backs this store
    fn backend(&self) -> BackendKind;

    fn supports_recency_order(&self) -> bool {
        self.backend().supports_recency_order()
    }

    /// Release file handles. Later data operations return `Closed`.
    fn close(&self) -> Result<()>;

    fn is_closed(&self) -> bool;
}

//! certdb Prelude
//!
//! Import this to get all commonly used types and traits:
//!
//! ```
//! use certdb::prelude::*;
//! ```

// Core types
pub use crate::{CertDbError, CertificateRecord, Result, StoreStats, StoredCertificate};

// Configs
pub use crate::{BackendKind, CollectorConfig, LmdbConfig, SqliteConfig, StoreConfig};

// Traits
pub use crate::{CertificateStore, FrameSource, StatsReader};

// Implementations
pub use crate::{CertDb, LmdbCertificateStore, SqliteCertificateStore};

// Collection
pub use crate::{Collector, CollectorStats, RunSummary, ShutdownHandle, StopReason};

// Reporting
pub use crate::{human_readable_size, StatsReport};

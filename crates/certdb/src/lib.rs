//! certdb: certificate transparency stream collector
//!
//! certdb provides:
//! - **Collector**: reads a certificate stream and upserts one record per domain
//! - **Pluggable storage**: SQLite (recency-ordered) or LMDB (key-ordered)
//! - **Stats and queries**: read-only reporting over either store
//!
//! # Quick Start
//!
//! ```no_run
//! use certdb::prelude::*;
//!
//! # async fn run() -> Result<()> {
//! let shutdown = ShutdownHandle::new();
//! shutdown.install_ctrl_c();
//!
//! let summary = certdb::collect(
//!     StoreConfig::with_default_path(BackendKind::Sqlite),
//!     CollectorConfig::new("wss://certstream.calidog.io/"),
//!     &shutdown,
//! )
//! .await?;
//! println!("stopped: {:?}", summary.stop_reason);
//! # Ok(())
//! # }
//! ```

pub mod collector;
pub mod db;
pub mod message;
pub mod prelude;
pub mod query;
pub mod shutdown;
pub mod stats;
pub mod transport;

// Re-export core types
pub use certdb_core::{
    config::{
        BackendKind, CollectorConfig, LmdbConfig, SqliteConfig, StoreConfig, SyncMode,
        SynchronousMode,
    },
    error::{CertDbError, Result},
    traits::{CertificateStore, JsonCodec, RecordCodec, StatsReader},
    types::{CertificateRecord, StoreStats, StoredCertificate},
};

// Re-export implementations
pub use certdb_lmdb::{LmdbCertificateStore, LmdbStatsReader};
pub use certdb_sqlite::{SqliteCertificateStore, SqliteStatsReader};

// Re-export main types from this crate
pub use collector::{collect, Collector, CollectorStats, PipelineState, RunSummary, StopReason};
pub use db::CertDb;
pub use message::{CertificateUpdate, StreamMessage};
pub use shutdown::ShutdownHandle;
pub use stats::{human_readable_size, stats_reader, StatsReport};
pub use transport::{FrameSource, WebSocketSource};

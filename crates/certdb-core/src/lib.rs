//! certdb core: traits and types for the certificate store
//!
//! This crate defines the abstractions shared by the storage engines and the
//! ingestion pipeline:
//! - `CertificateStore`: one record per domain, insert-or-replace
//! - `StatsReader`: read-only aggregates over a store on disk
//! - `RecordCodec`: lossless record <-> bytes conversion
//! - Error taxonomy and configuration types

pub mod config;
pub mod error;
pub mod observe;
pub mod traits;
pub mod types;

pub use config::{
    BackendKind, CollectorConfig, LmdbConfig, SqliteConfig, StoreConfig, SyncMode,
    SynchronousMode,
};
pub use error::{CertDbError, Result};
pub use traits::{CertificateStore, JsonCodec, RecordCodec, StatsReader};
pub use types::{CertificateRecord, StoreStats, StoredCertificate};

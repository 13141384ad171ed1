//! LMDB-backed certificate store
//!
//! The key-value backend: one unnamed LMDB database mapping
//! `domain -> serialized payload`.
//!
//! Key features:
//! - One put per upsert, atomic per key
//! - Readers never block the writer (MVCC)
//! - Keys iterate in byte order; there is no recency ordering

pub mod iter;
pub mod keys;
pub mod stats;
pub mod store;

pub use iter::LmdbKeyScan;
pub use stats::LmdbStatsReader;
pub use store::LmdbCertificateStore;

//! SQLite-backed certificate store
//!
//! The relational backend: one `certificates` table keyed by domain.
//!
//! Key features:
//! - Single-statement upsert (no read-modify-write window)
//! - `created_at` kept across replaces, `updated_at` refreshed on every write
//! - WAL mode so readers and the writer never block each other
//! - `list` ordered most-recently-updated first

pub mod schema;
pub mod stats;
pub mod store;

pub use stats::SqliteStatsReader;
pub use store::SqliteCertificateStore;

pub mod collector;
pub mod lmdb;
pub mod sqlite;
pub mod store;

pub use collector::CollectorConfig;
pub use lmdb::{LmdbConfig, SyncMode};
pub use sqlite::{SqliteConfig, SynchronousMode};
pub use store::{BackendKind, StoreConfig};

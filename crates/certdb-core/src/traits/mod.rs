pub mod codec;
pub mod stats;
pub mod store;

pub use codec::{JsonCodec, RecordCodec};
pub use stats::StatsReader;
pub use store::CertificateStore;

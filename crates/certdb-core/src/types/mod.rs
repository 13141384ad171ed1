pub mod record;
pub mod stats;

pub use record::{CertificateRecord, StoredCertificate};
pub use stats::StoreStats;

//! Record encoding for storage-engine values
//!
//! # Example
//!
//! ```
//! use certdb_core::{CertificateRecord, JsonCodec, RecordCodec};
//!
//! # fn main() -> certdb_core::Result<()> {
//! let codec = JsonCodec;
//! let record = CertificateRecord::new(vec!["a.example".into()]);
//!
//! let bytes = codec.encode(&record)?;
//! assert_eq!(codec.decode(&bytes)?, record);
//! # Ok(())
//! # }
//! ```

use crate::error::{CertDbError, Result};
use crate::types::CertificateRecord;

/// Lossless conversion between a record and its stored bytes
pub trait RecordCodec: Send + Sync {
    /// Encode a record to bytes
    fn encode(&self, record: &CertificateRecord) -> Result<Vec<u8>>;

    /// Decode a record from bytes
    ///
    /// Truncated or corrupted input fails with `CertDbError::Decode`.
    fn decode(&self, bytes: &[u8]) -> Result<CertificateRecord>;
}

/// JSON codec. The relational backend stores its output as TEXT.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

/// Refuse records whose output could not be decoded again
fn check_encodable(record: &CertificateRecord) -> Result<()> {
    match record.shadowed_extra_key() {
        Some(key) => Err(CertDbError::Decode(format!(
            "extra field `{key}` duplicates a typed field"
        ))),
        None => Ok(()),
    }
}

impl JsonCodec {
    pub fn encode_to_string(&self, record: &CertificateRecord) -> Result<String> {
        check_encodable(record)?;
        serde_json::to_string(record).map_err(|e| CertDbError::Decode(e.to_string()))
    }

    pub fn decode_str(&self, text: &str) -> Result<CertificateRecord> {
        self.decode(text.as_bytes())
    }
}

impl RecordCodec for JsonCodec {
    fn encode(&self, record: &CertificateRecord) -> Result<Vec<u8>> {
        check_encodable(record)?;
        serde_json::to_vec(record).map_err(|e| CertDbError::Decode(e.to_string()))
    }

    fn decode(&self, bytes: &[u8]) -> Result<CertificateRecord> {
        serde_json::from_slice(bytes).map_err(|e| CertDbError::Decode(e.to_string()))
    }
}

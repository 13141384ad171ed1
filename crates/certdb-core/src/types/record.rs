use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field names owned by the typed members of [`CertificateRecord`]
pub const TYPED_FIELDS: [&str; 5] = ["domains", "leaf_cert", "chain", "source", "timestamp"];

/// Payload stored under every domain named by a leaf certificate
///
/// The well-known fields are typed; anything else the stream sends is kept
/// in `extra` so the payload survives a round-trip through the store intact.
/// Every domain of one certificate gets an identical copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CertificateRecord {
    /// All domains covered by the leaf certificate
    #[serde(default)]
    pub domains: Vec<String>,

    /// Raw leaf certificate fields
    #[serde(default)]
    pub leaf_cert: Value,

    /// Intermediate and root certificates
    #[serde(default)]
    pub chain: Vec<Value>,

    /// Originating log metadata
    #[serde(default)]
    pub source: Value,

    /// Event timestamp (numeric or null)
    #[serde(default)]
    pub timestamp: Value,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CertificateRecord {
    pub fn new(domains: Vec<String>) -> Self {
        Self {
            domains,
            leaf_cert: Value::Null,
            chain: Vec::new(),
            source: Value::Null,
            timestamp: Value::Null,
            extra: Map::new(),
        }
    }

    pub fn with_leaf_cert(mut self, leaf_cert: Value) -> Self {
        self.leaf_cert = leaf_cert;
        self
    }

    pub fn with_chain(mut self, chain: Vec<Value>) -> Self {
        self.chain = chain;
        self
    }

    pub fn with_source(mut self, source: Value) -> Self {
        self.source = source;
        self
    }

    pub fn with_timestamp(mut self, timestamp: Value) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// First `extra` key that shadows a typed field
    ///
    /// Such a key would serialize as a duplicate JSON member that can never
    /// be decoded again, so codecs refuse to encode the record.
    pub fn shadowed_extra_key(&self) -> Option<&str> {
        self.extra
            .keys()
            .map(String::as_str)
            .find(|key| TYPED_FIELDS.contains(key))
    }
}

/// A record as read back from a store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredCertificate {
    pub domain: String,
    pub record: CertificateRecord,

    /// First write. Only the relational backend tracks this.
    pub created_at: Option<DateTime<Utc>>,

    /// Latest write. Only the relational backend tracks this.
    pub updated_at: Option<DateTime<Utc>>,
}

impl StoredCertificate {
    pub fn untimed(domain: String, record: CertificateRecord) -> Self {
        Self {
            domain,
            record,
            created_at: None,
            updated_at: None,
        }
    }
}

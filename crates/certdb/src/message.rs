//! Certificate stream message decoding
//!
//! Frames are JSON objects discriminated by `message_type`. Only
//! `certificate_update` carries data; the payload fields that the store
//! does not interpret are kept as raw JSON values.

use certdb_core::{CertDbError, CertificateRecord, Result};
use serde::Deserialize;
use serde_json::{Map, Value};

pub const CERTIFICATE_UPDATE: &str = "certificate_update";
pub const HEARTBEAT: &str = "heartbeat";

/// One decoded stream frame
#[derive(Debug, Clone, PartialEq)]
pub enum StreamMessage {
    CertificateUpdate(CertificateUpdate),
    Heartbeat,
    /// Unknown, missing or non-string `message_type`; ignored by the collector
    Other(Value),
}

/// The per-domain payload extracted from a `certificate_update`
#[derive(Debug, Clone, PartialEq)]
pub struct CertificateUpdate {
    pub record: CertificateRecord,
}

impl CertificateUpdate {
    /// Domains to upsert, in the order the leaf certificate lists them
    pub fn domains(&self) -> &[String] {
        &self.record.domains
    }
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(default)]
    message_type: Value,
    #[serde(flatten)]
    body: Map<String, Value>,
}

#[derive(Deserialize)]
struct UpdateBody {
    #[serde(default)]
    data: UpdateData,
    #[serde(default = "empty_object")]
    source: Value,
    #[serde(default)]
    timestamp: Value,
}

#[derive(Deserialize, Default)]
struct UpdateData {
    #[serde(default)]
    leaf_cert: Map<String, Value>,
    #[serde(default)]
    chain: Vec<Value>,
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}

impl StreamMessage {
    /// Decode one text frame
    ///
    /// Fails with `Decode` when the frame is not a JSON object or a
    /// `certificate_update` has the wrong shape. Unknown message types are
    /// not an error.
    pub fn parse(frame: &str) -> Result<Self> {
        let envelope: Envelope = serde_json::from_str(frame)?;

        match envelope.message_type.as_str() {
            Some(CERTIFICATE_UPDATE) => {
                CertificateUpdate::from_body(envelope.body).map(Self::CertificateUpdate)
            }
            Some(HEARTBEAT) => Ok(Self::Heartbeat),
            _ => Ok(Self::Other(envelope.message_type)),
        }
    }

    /// Label used for logging and metrics
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CertificateUpdate(_) => CERTIFICATE_UPDATE,
            Self::Heartbeat => HEARTBEAT,
            Self::Other(_) => "other",
        }
    }
}

impl CertificateUpdate {
    fn from_body(body: Map<String, Value>) -> Result<Self> {
        let body: UpdateBody = serde_json::from_value(Value::Object(body))?;
        let leaf_cert = body.data.leaf_cert;

        let domains = match leaf_cert.get("all_domains") {
            None => Vec::new(),
            Some(value) => Vec::<String>::deserialize(value).map_err(|e| {
                CertDbError::Decode(format!("leaf_cert.all_domains: {e}"))
            })?,
        };

        // The raw leaf fields are stored exactly as received
        let record = CertificateRecord::new(domains)
            .with_leaf_cert(Value::Object(leaf_cert))
            .with_chain(body.data.chain)
            .with_source(body.source)
            .with_timestamp(body.timestamp);

        Ok(Self { record })
    }
}

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CertDbError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The store could not be opened or initialized. Fatal at startup.
    #[error("Store unavailable at {}: {reason}", path.display())]
    StoreUnavailable { path: PathBuf, reason: String },

    /// A single record write failed. The pipeline logs it and moves on.
    #[error("Upsert failed for {domain}: {reason}")]
    UpsertFailed { domain: String, reason: String },

    /// Malformed stored value or inbound frame.
    #[error("Decode error: {0}")]
    Decode(String),

    /// Stream connection lost or rejected.
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Store is closed")]
    Closed,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

impl CertDbError {
    pub fn unavailable(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::StoreUnavailable {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn upsert_failed(domain: &str, reason: impl ToString) -> Self {
        Self::UpsertFailed {
            domain: domain.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl From<serde_json::Error> for CertDbError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CertDbError>;

use crate::error::{CertDbError, Result};
use serde::{Deserialize, Serialize};

/// Configuration for the ingestion collector
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectorConfig {
    /// Websocket endpoint of the certificate stream (`ws://` or `wss://`)
    pub endpoint: String,

    /// Log progress every N certificate updates
    /// Default: 1000
    #[serde(default = "default_progress_interval")]
    pub progress_interval: u64,
}

fn default_progress_interval() -> u64 {
    1000
}

impl CollectorConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            progress_interval: default_progress_interval(),
        }
    }

    pub fn with_progress_interval(mut self, interval: u64) -> Self {
        self.progress_interval = interval;
        self
    }

    /// Check that the endpoint is a websocket URL before any connection attempt.
    pub fn validate(&self) -> Result<url::Url> {
        let url = url::Url::parse(&self.endpoint)
            .map_err(|e| CertDbError::Config(format!("invalid endpoint {}: {e}", self.endpoint)))?;

        match url.scheme() {
            "ws" | "wss" => {}
            other => {
                return Err(CertDbError::Config(format!(
                    "endpoint {} must use ws:// or wss://, got {other}://",
                    self.endpoint
                )))
            }
        }

        if self.progress_interval == 0 {
            return Err(CertDbError::Config(
                "progress_interval must be greater than zero".into(),
            ));
        }

        Ok(url)
    }
}

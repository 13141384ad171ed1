//! Certificate stream collector
//!
//! Reads frames one at a time, decodes them and upserts one record per
//! domain named by each `certificate_update`. Per-frame and per-record
//! failures are logged and skipped; only transport failures end a run.
//!
//! ```text
//! Disconnected -> Connecting -> Streaming -> Draining -> Closed
//!                      |                                   ^
//!                      +------- handshake failure ---------+
//! ```

use crate::db::CertDb;
use crate::message::{CertificateUpdate, StreamMessage};
use crate::shutdown::ShutdownHandle;
use crate::transport::{FrameSource, WebSocketSource};
use certdb_core::{
    observe, CertDbError, CertificateStore, CollectorConfig, Result, StoreConfig,
};
use std::sync::Arc;

/// Where a collector is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Disconnected,
    Connecting,
    Streaming,
    Draining,
    Closed,
}

/// Why a run ended without error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The shutdown handle was signalled
    Shutdown,
    /// The peer closed the stream
    StreamClosed,
}

/// Counters kept over one collector's lifetime
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectorStats {
    /// `certificate_update` messages processed
    pub updates: u64,
    pub heartbeats: u64,
    /// Frames with an unknown or missing `message_type`
    pub ignored: u64,
    /// Frames that could not be decoded
    pub malformed: u64,
    pub upserts_ok: u64,
    pub upserts_failed: u64,
}

/// Result of a run that ended cleanly
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub stop_reason: StopReason,
    pub stats: CollectorStats,
}

/// Ingests a certificate stream into a store
///
/// The collector is the only writer to `store` while it runs. It never
/// closes the store; the caller that opened it does (see [`collect`]).
pub struct Collector<S: CertificateStore> {
    store: Arc<S>,
    config: CollectorConfig,
    state: PipelineState,
    stats: CollectorStats,
}

impl<S: CertificateStore> Collector<S> {
    pub fn new(store: Arc<S>, config: CollectorConfig) -> Self {
        Self {
            store,
            config,
            state: PipelineState::Disconnected,
            stats: CollectorStats::default(),
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn stats(&self) -> &CollectorStats {
        &self.stats
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Connect to the configured websocket endpoint and stream until
    /// shutdown or until the peer goes away
    ///
    /// Handshake failures are returned, not retried.
    pub async fn run(&mut self, shutdown: &ShutdownHandle) -> Result<RunSummary> {
        self.transition(PipelineState::Connecting);

        let source = match self.connect().await {
            Ok(source) => source,
            Err(e) => {
                tracing::error!("Connection to {} failed: {}", self.config.endpoint, e);
                self.transition(PipelineState::Closed);
                return Err(e);
            }
        };

        self.stream(source, shutdown).await
    }

    /// Stream from an already connected source
    pub async fn run_with_source<F: FrameSource>(
        &mut self,
        source: F,
        shutdown: &ShutdownHandle,
    ) -> Result<RunSummary> {
        self.transition(PipelineState::Connecting);
        self.stream(source, shutdown).await
    }

    async fn connect(&self) -> Result<WebSocketSource> {
        let url = self.config.validate()?;
        WebSocketSource::connect(&url).await
    }

    async fn stream<F: FrameSource>(
        &mut self,
        mut source: F,
        shutdown: &ShutdownHandle,
    ) -> Result<RunSummary> {
        tracing::info!("Connected to certificate stream at {}", source.endpoint());
        self.transition(PipelineState::Streaming);

        let outcome = self.receive_loop(&mut source, shutdown).await;

        // The connection is released on every exit path
        self.transition(PipelineState::Draining);
        if let Err(e) = source.close().await {
            tracing::warn!("Error closing stream {}: {}", source.endpoint(), e);
        }
        self.transition(PipelineState::Closed);
        tracing::info!(
            "Certificate stream closed after {} updates ({} upserts, {} failed)",
            self.stats.updates,
            self.stats.upserts_ok,
            self.stats.upserts_failed
        );

        outcome.map(|stop_reason| RunSummary {
            stop_reason,
            stats: self.stats.clone(),
        })
    }

    async fn receive_loop<F: FrameSource>(
        &mut self,
        source: &mut F,
        shutdown: &ShutdownHandle,
    ) -> Result<StopReason> {
        loop {
            if shutdown.is_shutdown() {
                tracing::info!("Shutdown requested, draining");
                return Ok(StopReason::Shutdown);
            }

            match source.recv().await {
                None => {
                    tracing::info!("Certificate stream ended by peer");
                    return Ok(StopReason::StreamClosed);
                }
                Some(Ok(frame)) => self.process_frame(&frame),
                Some(Err(e @ CertDbError::Transport(_))) => {
                    tracing::error!("Websocket error: {}", e);
                    return Err(e);
                }
                Some(Err(e)) => self.record_malformed(&e),
            }
        }
    }

    /// Decode one frame and apply it to the store
    pub fn process_frame(&mut self, frame: &str) {
        let message = match StreamMessage::parse(frame) {
            Ok(message) => message,
            Err(e) => {
                self.record_malformed(&e);
                return;
            }
        };

        observe::record_frame(message.kind());
        match message {
            StreamMessage::CertificateUpdate(update) => self.apply_update(&update),
            StreamMessage::Heartbeat => {
                self.stats.heartbeats += 1;
                tracing::trace!("Heartbeat received");
            }
            StreamMessage::Other(message_type) => {
                self.stats.ignored += 1;
                tracing::trace!("Ignoring message type {}", message_type);
            }
        }
    }

    fn apply_update(&mut self, update: &CertificateUpdate) {
        for domain in update.domains() {
            if self.store.upsert(domain, &update.record) {
                self.stats.upserts_ok += 1;
            } else {
                self.stats.upserts_failed += 1;
            }
        }

        self.stats.updates += 1;
        if self.stats.updates % self.config.progress_interval.max(1) == 0 {
            tracing::info!("Processed {} certificate updates", self.stats.updates);
        }
    }

    fn record_malformed(&mut self, error: &CertDbError) {
        self.stats.malformed += 1;
        observe::record_malformed_frame();
        tracing::warn!("Skipping malformed frame: {}", error);
    }

    fn transition(&mut self, next: PipelineState) {
        tracing::debug!("Collector state {:?} -> {:?}", self.state, next);
        self.state = next;
    }
}

/// Open the configured store, stream into it and close it again
///
/// The store is closed on every exit path, including transport errors.
/// Store open failures are returned before any connection is attempted.
pub async fn collect(
    store_config: StoreConfig,
    config: CollectorConfig,
    shutdown: &ShutdownHandle,
) -> Result<RunSummary> {
    config.validate()?;

    let store = Arc::new(CertDb::open(store_config)?);
    store.initialize()?;
    tracing::info!(
        "Storing certificates in {} at {}",
        store.backend().label(),
        store.path().display()
    );

    let mut collector = Collector::new(store.clone(), config);
    let outcome = collector.run(shutdown).await;
    drop(collector);

    if let Err(e) = store.close() {
        tracing::error!("Error closing store at {}: {}", store.path().display(), e);
    }
    outcome
}

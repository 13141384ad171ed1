//! Collector tests over an in-memory frame source

use async_trait::async_trait;
use certdb::prelude::*;
use certdb::PipelineState;
use serde_json::json;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

const SAMPLE: &str = r#"{"message_type":"certificate_update","data":{"leaf_cert":{"all_domains":["a.example","b.example"]},"chain":[],"timestamp":1700000000},"source":{"name":"test"}}"#;

/// Replays a fixed list of frames, then reports the stream as closed
struct ScriptedSource {
    frames: VecDeque<Result<String>>,
    received: usize,
    shutdown_after: Option<(usize, ShutdownHandle)>,
    closed: Arc<AtomicBool>,
}

impl ScriptedSource {
    fn new(frames: impl IntoIterator<Item = Result<String>>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
            received: 0,
            shutdown_after: None,
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    fn text(frames: &[&str]) -> Self {
        Self::new(frames.iter().map(|f| Ok(f.to_string())))
    }

    /// Signal `handle` once `n` frames have been handed out
    fn shutdown_after(mut self, n: usize, handle: &ShutdownHandle) -> Self {
        self.shutdown_after = Some((n, handle.clone()));
        self
    }

    fn closed_flag(&self) -> Arc<AtomicBool> {
        self.closed.clone()
    }
}

#[async_trait]
impl FrameSource for ScriptedSource {
    async fn recv(&mut self) -> Option<Result<String>> {
        let frame = self.frames.pop_front()?;
        self.received += 1;
        if let Some((n, handle)) = &self.shutdown_after {
            if self.received >= *n {
                handle.shutdown();
            }
        }
        Some(frame)
    }

    async fn close(&mut self) -> Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn endpoint(&self) -> &str {
        "memory://scripted"
    }
}

/// Store that records every write instead of persisting it
#[derive(Default)]
struct RecordingStore {
    writes: Mutex<Vec<(String, CertificateRecord)>>,
}

impl RecordingStore {
    fn writes(&self) -> Vec<(String, CertificateRecord)> {
        self.writes.lock().unwrap().clone()
    }
}

impl CertificateStore for RecordingStore {
    type Config = ();

    fn open(_cfg: ()) -> Result<Self> {
        Ok(Self::default())
    }

    fn initialize(&self) -> Result<()> {
        Ok(())
    }

    fn put(&self, domain: &str, record: &CertificateRecord) -> Result<()> {
        self.writes
            .lock()
            .unwrap()
            .push((domain.to_string(), record.clone()));
        Ok(())
    }

    fn get(&self, domain: &str) -> Result<Option<CertificateRecord>> {
        Ok(self
            .writes()
            .into_iter()
            .rev()
            .find(|(d, _)| d == domain)
            .map(|(_, r)| r))
    }

    fn list(&self, _limit: usize) -> Result<Vec<StoredCertificate>> {
        Ok(Vec::new())
    }

    fn search(&self, _needle: &str, _limit: usize) -> Result<Vec<StoredCertificate>> {
        Ok(Vec::new())
    }

    fn backend(&self) -> BackendKind {
        BackendKind::Sqlite
    }

    fn close(&self) -> Result<()> {
        Ok(())
    }

    fn is_closed(&self) -> bool {
        false
    }
}

fn recording_collector() -> Collector<RecordingStore> {
    Collector::new(
        Arc::new(RecordingStore::default()),
        CollectorConfig::new("ws://localhost"),
    )
}

fn open_store(temp_dir: &TempDir, backend: BackendKind) -> Arc<CertDb> {
    let path = temp_dir.path().join(backend.as_str());
    Arc::new(CertDb::open(StoreConfig::new(backend, path)).unwrap())
}

#[tokio::test]
async fn test_sample_update_stored_under_each_domain() {
    for backend in [BackendKind::Sqlite, BackendKind::Lmdb] {
        let temp_dir = TempDir::new().unwrap();
        let store = open_store(&temp_dir, backend);
        let mut collector = Collector::new(store.clone(), CollectorConfig::new("ws://localhost"));

        let summary = collector
            .run_with_source(ScriptedSource::text(&[SAMPLE]), &ShutdownHandle::new())
            .await
            .unwrap();
        assert_eq!(summary.stop_reason, StopReason::StreamClosed);
        assert_eq!(summary.stats.updates, 1);
        assert_eq!(summary.stats.upserts_ok, 2);

        for domain in ["a.example", "b.example"] {
            let record = store.get(domain).unwrap().unwrap();
            assert_eq!(record.domains, vec!["a.example", "b.example"]);
            assert_eq!(record.source, json!({"name": "test"}));
        }
        store.close().unwrap();
    }
}

#[tokio::test]
async fn test_every_domain_gets_identical_payload() {
    let mut collector = recording_collector();
    let frame = json!({
        "message_type": "certificate_update",
        "data": {
            "leaf_cert": {"all_domains": ["a.example", "b.example", "c.example"], "serial": "01"},
            "chain": [{"subject": {"CN": "Root"}}],
        },
        "source": {"url": "ct.example/log"},
        "timestamp": 1700000000.5,
    })
    .to_string();

    collector
        .run_with_source(ScriptedSource::text(&[frame.as_str()]), &ShutdownHandle::new())
        .await
        .unwrap();

    let writes = collector.store().writes();
    let domains: Vec<&str> = writes.iter().map(|(d, _)| d.as_str()).collect();
    assert_eq!(domains, ["a.example", "b.example", "c.example"]);
    assert!(writes.iter().all(|(_, r)| r == &writes[0].1));
    assert_eq!(writes[0].1.timestamp, json!(1700000000.5));
    assert_eq!(writes[0].1.chain.len(), 1);
}

#[tokio::test]
async fn test_heartbeat_and_unknown_types_do_not_write() {
    let mut collector = recording_collector();

    let summary = collector
        .run_with_source(
            ScriptedSource::text(&[
                r#"{"message_type":"heartbeat","timestamp":1700000000}"#,
                r#"{"message_type":"dns_entries","data":{}}"#,
            ]),
            &ShutdownHandle::new(),
        )
        .await
        .unwrap();

    assert!(collector.store().writes().is_empty());
    assert_eq!(summary.stats.heartbeats, 1);
    assert_eq!(summary.stats.ignored, 1);
    assert_eq!(summary.stats.updates, 0);
}

#[tokio::test]
async fn test_malformed_frames_are_skipped() {
    let mut collector = recording_collector();

    let summary = collector
        .run_with_source(
            ScriptedSource::new([
                Ok("{not json".to_string()),
                Err(CertDbError::Decode("binary frame is not valid UTF-8".into())),
                Ok(r#"{"message_type":"certificate_update","data":{"leaf_cert":{"all_domains":"oops"}}}"#.to_string()),
                Ok(SAMPLE.to_string()),
            ]),
            &ShutdownHandle::new(),
        )
        .await
        .unwrap();

    assert_eq!(summary.stop_reason, StopReason::StreamClosed);
    assert_eq!(summary.stats.malformed, 3);
    assert_eq!(summary.stats.updates, 1);
    assert_eq!(collector.store().writes().len(), 2);
}

#[tokio::test]
async fn test_replaying_an_update_is_idempotent() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_store(&temp_dir, BackendKind::Sqlite);

    let mut once = Collector::new(store.clone(), CollectorConfig::new("ws://localhost"));
    once.run_with_source(ScriptedSource::text(&[SAMPLE]), &ShutdownHandle::new())
        .await
        .unwrap();
    let before = store.get("a.example").unwrap();
    let count_before = store.list(100).unwrap().len();

    let mut again = Collector::new(store.clone(), CollectorConfig::new("ws://localhost"));
    again
        .run_with_source(ScriptedSource::text(&[SAMPLE]), &ShutdownHandle::new())
        .await
        .unwrap();

    assert_eq!(store.get("a.example").unwrap(), before);
    assert_eq!(store.list(100).unwrap().len(), count_before);
    assert_eq!(count_before, 2);
}

#[tokio::test]
async fn test_later_update_replaces_earlier() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_store(&temp_dir, BackendKind::Lmdb);
    let second = SAMPLE.replace(r#""name":"test""#, r#""name":"second""#);

    let mut collector = Collector::new(store.clone(), CollectorConfig::new("ws://localhost"));
    collector
        .run_with_source(
            ScriptedSource::text(&[SAMPLE, second.as_str()]),
            &ShutdownHandle::new(),
        )
        .await
        .unwrap();

    let record = store.get("b.example").unwrap().unwrap();
    assert_eq!(record.source, json!({"name": "second"}));
}

#[tokio::test]
async fn test_shutdown_is_checked_between_frames() {
    let shutdown = ShutdownHandle::new();
    let source = ScriptedSource::text(&[SAMPLE, SAMPLE, SAMPLE]).shutdown_after(1, &shutdown);
    let closed = source.closed_flag();

    let mut collector = recording_collector();
    let summary = collector.run_with_source(source, &shutdown).await.unwrap();

    // The in-flight frame completes, the rest are never read
    assert_eq!(summary.stop_reason, StopReason::Shutdown);
    assert_eq!(summary.stats.updates, 1);
    assert!(closed.load(Ordering::SeqCst));
    assert_eq!(collector.state(), PipelineState::Closed);
}

#[tokio::test]
async fn test_shutdown_before_start_reads_nothing() {
    let shutdown = ShutdownHandle::new();
    shutdown.shutdown();

    let mut collector = recording_collector();
    let summary = collector
        .run_with_source(ScriptedSource::text(&[SAMPLE]), &shutdown)
        .await
        .unwrap();

    assert_eq!(summary.stop_reason, StopReason::Shutdown);
    assert!(collector.store().writes().is_empty());
}

#[tokio::test]
async fn test_transport_error_ends_run_after_draining() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_store(&temp_dir, BackendKind::Sqlite);

    let source = ScriptedSource::new([
        Ok(SAMPLE.to_string()),
        Err(CertDbError::Transport("connection reset".into())),
        Ok(SAMPLE.replace("a.example", "never.example")),
    ]);
    let closed = source.closed_flag();

    let mut collector = Collector::new(store.clone(), CollectorConfig::new("ws://localhost"));
    let err = collector
        .run_with_source(source, &ShutdownHandle::new())
        .await
        .unwrap_err();

    assert!(matches!(err, CertDbError::Transport(_)));
    assert!(closed.load(Ordering::SeqCst));
    assert_eq!(collector.state(), PipelineState::Closed);

    // Writes committed before the failure survive
    assert!(store.get("a.example").unwrap().is_some());
    assert!(store.get("never.example").unwrap().is_none());
}

#[tokio::test]
async fn test_failed_upsert_does_not_stop_ingestion() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_store(&temp_dir, BackendKind::Lmdb);
    let oversized = format!("{}.example", "x".repeat(600));
    let frame = json!({
        "message_type": "certificate_update",
        "data": {"leaf_cert": {"all_domains": [oversized, "ok.example"]}},
    })
    .to_string();

    let mut collector = Collector::new(store.clone(), CollectorConfig::new("ws://localhost"));
    let summary = collector
        .run_with_source(
            ScriptedSource::text(&[frame.as_str(), SAMPLE]),
            &ShutdownHandle::new(),
        )
        .await
        .unwrap();

    assert_eq!(summary.stats.upserts_failed, 1);
    assert_eq!(summary.stats.upserts_ok, 3);
    assert!(store.get("ok.example").unwrap().is_some());
    assert!(store.get("a.example").unwrap().is_some());
}

#[tokio::test]
async fn test_writes_after_store_closed_are_reported_as_failures() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_store(&temp_dir, BackendKind::Sqlite);
    store.close().unwrap();

    let mut collector = Collector::new(store.clone(), CollectorConfig::new("ws://localhost"));
    let summary = collector
        .run_with_source(ScriptedSource::text(&[SAMPLE]), &ShutdownHandle::new())
        .await
        .unwrap();

    assert_eq!(summary.stats.upserts_failed, 2);
    assert_eq!(summary.stats.upserts_ok, 0);
}

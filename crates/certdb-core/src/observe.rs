//! Optional metrics instrumentation for certdb.
//!
//! When the `observe` feature is enabled, ingestion emits counters via the
//! [`metrics`] crate. A downstream application must install a metrics
//! recorder (e.g. `metrics-exporter-prometheus`) to collect the data.
//!
//! When the feature is **not** enabled every function in this module is a
//! zero-cost no-op.

use crate::config::BackendKind;

/// Record a single-domain write.
///
/// - `certdb.upserts_total` – counter with `backend` and `outcome` labels
#[inline]
pub fn record_upsert(backend: BackendKind, success: bool) {
    #[cfg(feature = "observe")]
    {
        let outcome = if success { "ok" } else { "fail" };
        metrics::counter!("certdb.upserts_total", "backend" => backend.as_str(), "outcome" => outcome)
            .increment(1);
    }
    #[cfg(not(feature = "observe"))]
    {
        let _ = (backend, success);
    }
}

/// Record a decoded stream frame.
///
/// - `certdb.frames_total` – counter with `message_type` label
#[inline]
pub fn record_frame(message_type: &'static str) {
    #[cfg(feature = "observe")]
    {
        metrics::counter!("certdb.frames_total", "message_type" => message_type).increment(1);
    }
    #[cfg(not(feature = "observe"))]
    {
        let _ = message_type;
    }
}

/// Record a frame that could not be parsed.
///
/// - `certdb.frames_malformed_total` – counter
#[inline]
pub fn record_malformed_frame() {
    #[cfg(feature = "observe")]
    {
        metrics::counter!("certdb.frames_malformed_total").increment(1);
    }
}

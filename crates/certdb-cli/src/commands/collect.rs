//! Collect command implementation

use anyhow::{Context, Result};
use certdb::prelude::*;

use super::StoreArgs;

pub async fn execute(endpoint: String, progress_interval: u64, store: StoreArgs) -> Result<()> {
    let config = CollectorConfig::new(endpoint).with_progress_interval(progress_interval);
    let store_config = store.store_config();

    let shutdown = ShutdownHandle::new();
    let signal = shutdown.install_ctrl_c();

    let outcome = certdb::collect(store_config, config, &shutdown).await;
    signal.abort();

    let summary = outcome.context("Certificate collection failed")?;
    let stats = &summary.stats;
    println!(
        "Stopped ({:?}): {} updates, {} upserts ({} failed), {} heartbeats, {} malformed frames",
        summary.stop_reason,
        stats.updates,
        stats.upserts_ok,
        stats.upserts_failed,
        stats.heartbeats,
        stats.malformed
    );

    Ok(())
}

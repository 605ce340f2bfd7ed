use std::sync::OnceLock;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::core::config::Settings;

static PROM_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

pub(crate) fn init(settings: &Settings) -> anyhow::Result<()> {
    if !settings.telemetry().prometheus_enabled || PROM_HANDLE.get().is_some() {
        return Ok(());
    }

    let handle = PrometheusBuilder::new().install_recorder()?;
    let _ = PROM_HANDLE.set(handle);
    Ok(())
}

pub(crate) fn render() -> Option<String> {
    PROM_HANDLE.get().map(|handle| handle.render())
}

/// Counts one persisted score batch and the rows it carried.
pub(crate) fn record_score_batch(mark_type: &'static str, rows: usize) {
    metrics::counter!("score_batches_total", "mark_type" => mark_type).increment(1);
    metrics::counter!("score_rows_total", "mark_type" => mark_type).increment(rows as u64);
}

//! Metrics collection for activity-service.
//!
//! Counters for usage document writes and report requests, exported in
//! Prometheus text format alongside the HTTP middleware metrics.

use metrics::counter;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;

pub static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the Prometheus recorder. Later calls are ignored.
pub fn init_metrics() {
    if METRICS_HANDLE.get().is_some() {
        return;
    }

    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            if METRICS_HANDLE.set(handle).is_err() {
                tracing::warn!("Metrics handle already set");
            }
        }
        Err(e) => tracing::warn!(error = %e, "Failed to install Prometheus recorder"),
    }
}

/// Get metrics output in Prometheus text format.
pub fn get_metrics() -> String {
    METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Metrics recorder not initialized\n".to_string())
}

/// Record the outcome of one usage document write.
pub fn record_activity_write(activity_id: &str, status: &str) {
    counter!(
        "activity_documents_total",
        "activity_id" => activity_id.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record one report request.
pub fn record_report(timeframe: &str, outcome: &str) {
    counter!(
        "activity_reports_total",
        "timeframe" => timeframe.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);
}

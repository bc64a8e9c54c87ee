//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define bootstrap metrics
//! - Expose a Prometheus-compatible scrape endpoint when enabled
//!
//! # Metrics
//! - `bootstrap_stage_duration_seconds` (histogram): time spent per stage
//! - `bootstrap_plugin_sync_total` (counter): sync outcomes by plugin
//! - `bootstrap_routes_registered` (gauge): endpoints registered, docs excluded
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   recorder every call is a no-op

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its HTTP listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(%addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(%addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_stage(stage: &'static str, started: Instant) {
    metrics::histogram!("bootstrap_stage_duration_seconds", "stage" => stage)
        .record(started.elapsed().as_secs_f64());
}

pub fn record_plugin_sync(plugin: &str, success: bool) {
    let outcome = if success { "ok" } else { "error" };
    metrics::counter!(
        "bootstrap_plugin_sync_total",
        "plugin" => plugin.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}

pub fn record_routes_registered(count: usize) {
    metrics::gauge!("bootstrap_routes_registered").set(count as f64);
}

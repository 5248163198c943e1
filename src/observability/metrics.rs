//! Metrics collection and exposition.
//!
//! # Metrics
//! - `edge_rewrites_total` (counter): origin-response outcomes by `outcome`
//! - `edge_redirects_total` (counter): origin-request outcomes by `outcome`
//! - `edge_index_fetch_duration_seconds` (histogram): index fetch latency by `result`
//! - `edge_requests_total` (counter): emulator requests by behavior, status
//! - `edge_request_duration_seconds` (histogram): emulator latency by behavior

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its HTTP listener.
///
/// Must run inside a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_rewrite(outcome: &'static str) {
    counter!("edge_rewrites_total", "outcome" => outcome).increment(1);
}

pub fn record_redirect(redirected: bool) {
    let outcome = if redirected { "redirected" } else { "pass_through" };
    counter!("edge_redirects_total", "outcome" => outcome).increment(1);
}

pub fn record_index_fetch(started: Instant, ok: bool) {
    let result = if ok { "ok" } else { "error" };
    histogram!("edge_index_fetch_duration_seconds", "result" => result)
        .record(started.elapsed().as_secs_f64());
}

pub fn record_request(behavior: &str, status: u16, started: Instant) {
    counter!(
        "edge_requests_total",
        "behavior" => behavior.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("edge_request_duration_seconds", "behavior" => behavior.to_string())
        .record(started.elapsed().as_secs_f64());
}

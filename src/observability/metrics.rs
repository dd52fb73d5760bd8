//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gate_decisions_total` (counter): access decisions by outcome
//! - `gate_requests_total` (counter): responses by status
//! - `gate_request_duration_seconds` (histogram): latency distribution
//! - `gate_upstream_errors_total` (counter): failed upstream forwards
//! - `gate_config_reloads_total` (counter): reload attempts by result
//! - `gate_image_proxy_total` (counter): image proxy outcomes
//!
//! Recording without an installed recorder is a no-op, so unit tests and the
//! CLI can call these freely.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_decision(decision: &'static str) {
    counter!("gate_decisions_total", "decision" => decision).increment(1);
}

pub fn record_request(method: &str, status: u16, start: Instant) {
    let status = status.to_string();
    counter!("gate_requests_total", "method" => method.to_string(), "status" => status.clone())
        .increment(1);
    histogram!("gate_request_duration_seconds", "status" => status)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_upstream_error(upstream: &str) {
    counter!("gate_upstream_errors_total", "upstream" => upstream.to_string()).increment(1);
}

pub fn record_config_reload(success: bool) {
    let result = if success { "success" } else { "failure" };
    counter!("gate_config_reloads_total", "result" => result).increment(1);
}

pub fn record_image_proxy(result: &'static str) {
    counter!("gate_image_proxy_total", "result" => result).increment(1);
}

//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Expose a Prometheus-compatible metrics endpoint
//! - Track per-endpoint request counts and latency
//!
//! # Metrics
//! - `control_requests_total` (counter): requests by endpoint, status
//! - `control_request_duration_seconds` (histogram): latency by endpoint
//!
//! # Design Decisions
//! - Metric updates are cheap (atomic); recording never fails the request
//! - The exporter is optional and bound to its own address

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on the given address.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => {
            tracing::info!(address = %addr, "Metrics exporter listening");
        }
        Err(e) => {
            tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter");
        }
    }
}

/// Record one handled control-API request.
pub fn record_api_request(endpoint: &'static str, status: u16, start: Instant) {
    counter!(
        "control_requests_total",
        "endpoint" => endpoint,
        "status" => status.to_string(),
    )
    .increment(1);
    histogram!(
        "control_request_duration_seconds",
        "endpoint" => endpoint,
    )
    .record(start.elapsed().as_secs_f64());
}

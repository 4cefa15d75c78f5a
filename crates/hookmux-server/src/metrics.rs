//! Metrics collection and export for hookmux.
//!
//! Uses the `metrics` crate for instrumentation and exports
//! to Prometheus format.

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tracing::info;

/// Metric names.
pub mod names {
    pub const CALLBACKS_TOTAL: &str = "hookmux_callbacks_total";
    pub const CALLBACK_BYTES: &str = "hookmux_callback_bytes";
    pub const DISPATCH_TOTAL: &str = "hookmux_dispatch_total";
    pub const DISPATCH_LATENCY_SECONDS: &str = "hookmux_dispatch_latency_seconds";
    pub const ERRORS_TOTAL: &str = "hookmux_errors_total";
}

/// Initialize the metrics system.
pub fn init_metrics() {
    metrics::describe_counter!(
        names::CALLBACKS_TOTAL,
        "Total number of callbacks received since server start"
    );
    metrics::describe_counter!(names::CALLBACK_BYTES, "Total bytes of callback bodies");
    metrics::describe_counter!(
        names::DISPATCH_TOTAL,
        "Dispatched callbacks by kind and outcome"
    );
    metrics::describe_histogram!(
        names::DISPATCH_LATENCY_SECONDS,
        "Handler dispatch latency in seconds"
    );
    metrics::describe_counter!(names::ERRORS_TOTAL, "Total number of errors");

    info!("Metrics initialized");
}

/// Start the Prometheus metrics server.
///
/// # Errors
///
/// Returns an error if the server cannot be started.
pub fn start_metrics_server(port: u16) -> Result<(), Box<dyn std::error::Error>> {
    let addr: SocketAddr = format!("0.0.0.0:{}", port).parse()?;

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;

    info!("Metrics server listening on {}", addr);
    Ok(())
}

/// Record a received callback body.
pub fn record_callback(bytes: usize) {
    counter!(names::CALLBACKS_TOTAL).increment(1);
    counter!(names::CALLBACK_BYTES).increment(bytes as u64);
}

/// Record a dispatch result.
pub fn record_dispatch(kind: &'static str, outcome: &'static str) {
    counter!(names::DISPATCH_TOTAL, "kind" => kind, "outcome" => outcome).increment(1);
}

/// Record dispatch latency.
pub fn record_latency(seconds: f64) {
    histogram!(names::DISPATCH_LATENCY_SECONDS).record(seconds);
}

/// Record an error.
pub fn record_error(error_type: &'static str) {
    counter!(names::ERRORS_TOTAL, "type" => error_type).increment(1);
}

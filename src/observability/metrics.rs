//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define gateway metrics (requests, per-phase latency, subscriptions)
//! - Expose a Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by mode and status
//! - `gateway_request_duration_seconds` (histogram): end-to-end latency
//! - `gateway_phase_duration_seconds` (histogram): translate / exchange /
//!   reply-translate split
//! - `gateway_subscriptions_active` (gauge): live observe subscriptions
//! - `gateway_subscription_events_total` (counter): registered / degraded

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape endpoint. Must run inside
/// the tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint started"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one completed gateway request.
pub fn record_request(mode: &'static str, status: u16, started: Instant) {
    metrics::counter!(
        "gateway_requests_total",
        "mode" => mode,
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("gateway_request_duration_seconds", "mode" => mode)
        .record(started.elapsed().as_secs_f64());
}

/// Record one lifecycle phase of a direct-mode request.
pub fn record_phase(phase: &'static str, elapsed: Duration) {
    metrics::histogram!("gateway_phase_duration_seconds", "phase" => phase)
        .record(elapsed.as_secs_f64());
}

/// Count a subscription lifecycle event.
pub fn record_subscription_event(event: &'static str) {
    metrics::counter!("gateway_subscription_events_total", "event" => event).increment(1);
}

/// Track the live subscription count.
pub fn set_active_subscriptions(count: usize) {
    metrics::gauge!("gateway_subscriptions_active").set(count as f64);
}

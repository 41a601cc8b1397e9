//! Metrics collection and exposition.
//!
//! # Metrics
//! - `form_relay_http_requests_total` (counter): requests by method, status
//! - `form_relay_http_request_duration_seconds` (histogram): latency distribution
//! - `form_relay_relayed_total` (counter): forwarded bodies by outcome
//! - `form_relay_datagrams_total` (counter): received datagrams by outcome
//! - `form_relay_store_entries` (gauge): entries in the document after the last write
//!
//! Recording is a no-op until a recorder is installed, so tests and
//! deployments without the endpoint pay nothing.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(method: &str, status: u16, start: Instant) {
    counter!(
        "form_relay_http_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("form_relay_http_request_duration_seconds", "method" => method.to_string())
        .record(start.elapsed().as_secs_f64());
}

pub fn record_relay(outcome: &'static str) {
    counter!("form_relay_relayed_total", "outcome" => outcome).increment(1);
}

pub fn record_datagram(outcome: &'static str) {
    counter!("form_relay_datagrams_total", "outcome" => outcome).increment(1);
}

pub fn record_store_entries(entries: usize) {
    gauge!("form_relay_store_entries").set(entries as f64);
}

//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gatekeeper_admission_decisions_total` (counter): by `decision`
//! - `gatekeeper_registry_clients` (gauge): tracked clients after each sweep
//! - `gatekeeper_evicted_clients_total` (counter): idle clients dropped
//! - `gatekeeper_recovered_panics_total` (counter): handler panics contained
//!
//! Recording is a no-op until [`init_metrics`] installs the exporter.

use metrics::{counter, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Serve Prometheus metrics on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_admission(decision: &'static str) {
    counter!("gatekeeper_admission_decisions_total", "decision" => decision).increment(1);
}

pub fn record_registry_size(clients: usize) {
    gauge!("gatekeeper_registry_clients").set(clients as f64);
}

pub fn record_evicted_clients(evicted: usize) {
    counter!("gatekeeper_evicted_clients_total").increment(evicted as u64);
}

pub fn record_recovered_panic() {
    counter!("gatekeeper_recovered_panics_total").increment(1);
}

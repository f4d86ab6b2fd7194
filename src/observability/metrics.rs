//! Metrics collection and exposition.
//!
//! # Metrics
//! - `dapp_connect_total` (counter): connect attempts by outcome
//! - `dapp_network_reconcile_total` (counter): switch/add chain outcomes
//! - `dapp_reads_total` (counter): value refreshes by outcome
//! - `dapp_tx_total` (counter): write lifecycle events by outcome
//! - `dapp_external_events_total` (counter): provider push events by name
//!
//! Without an installed recorder these calls are no-ops.

use metrics::counter;
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use std::net::SocketAddr;

pub fn record_connect(outcome: &'static str) {
    counter!("dapp_connect_total", "outcome" => outcome).increment(1);
}

pub fn record_network_reconcile(outcome: &'static str) {
    counter!("dapp_network_reconcile_total", "outcome" => outcome).increment(1);
}

pub fn record_read(outcome: &'static str) {
    counter!("dapp_reads_total", "outcome" => outcome).increment(1);
}

pub fn record_tx(outcome: &'static str) {
    counter!("dapp_tx_total", "outcome" => outcome).increment(1);
}

pub fn record_external_event(event: &'static str) {
    counter!("dapp_external_events_total", "event" => event).increment(1);
}

/// Serve Prometheus metrics on `addr`. Requires a running Tokio runtime.
pub fn install_exporter(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

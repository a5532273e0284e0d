//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define harness metrics (ping outcomes, latency, control updates, client attempts)
//! - Expose Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `harness_ping_total` (counter): ping responses by outcome
//! - `harness_ping_duration_seconds` (histogram): server-side ping latency
//! - `harness_control_updates_total` (counter): control updates by group and result
//! - `harness_client_attempts_total` (counter): load harness attempts by outcome
//! - `harness_client_duration_seconds` (histogram): client-observed latency
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   recorder every call is a no-op
//! - Exporter is opt-in via `observability.metrics_enabled`

use std::net::SocketAddr;
use std::time::Duration;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its HTTP listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_ping(outcome: &'static str, elapsed: Duration) {
    counter!("harness_ping_total", "outcome" => outcome).increment(1);
    histogram!("harness_ping_duration_seconds", "outcome" => outcome).record(elapsed.as_secs_f64());
}

pub fn record_control_update(group: &'static str, accepted: bool) {
    let result = if accepted { "accepted" } else { "rejected" };
    counter!("harness_control_updates_total", "group" => group, "result" => result).increment(1);
}

pub fn record_client_attempt(outcome: &'static str, elapsed: Duration) {
    counter!("harness_client_attempts_total", "outcome" => outcome).increment(1);
    histogram!("harness_client_duration_seconds", "outcome" => outcome).record(elapsed.as_secs_f64());
}

//! Metrics collection and exposition.
//!
//! # Metrics
//! - `event_router_events_total` (counter): dispatches by subject, action, outcome
//! - `event_router_events_skipped_total` (counter): correlation-loop suppressions
//! - `event_router_history_lookups_total` (counter): exists-or-store results by backend
//! - `event_router_dispatch_duration_seconds` (histogram): handler latency by subject
//!
//! # Design Decisions
//! - Exposed through the Prometheus exporter's own HTTP listener
//! - Outcomes: handled, failed, not_found, unrouted

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::events::Action;

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_event(subject: &str, action: Action, outcome: &'static str) {
    counter!(
        "event_router_events_total",
        "subject" => subject.to_string(),
        "action" => action.as_str(),
        "outcome" => outcome
    )
    .increment(1);
}

pub fn record_event_skipped(subject: &str, action: Action) {
    counter!(
        "event_router_events_skipped_total",
        "subject" => subject.to_string(),
        "action" => action.as_str()
    )
    .increment(1);
}

pub fn record_dispatch_duration(subject: &str, start: Instant) {
    histogram!(
        "event_router_dispatch_duration_seconds",
        "subject" => subject.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

pub fn record_history_lookup(backend: &'static str, existed: bool) {
    let result = if existed { "seen" } else { "new" };
    counter!(
        "event_router_history_lookups_total",
        "backend" => backend,
        "result" => result
    )
    .increment(1);
}

pub fn record_history_error(backend: &'static str) {
    counter!(
        "event_router_history_lookups_total",
        "backend" => backend,
        "result" => "error"
    )
    .increment(1);
}

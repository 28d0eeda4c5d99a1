//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define engine metrics (cache lookups, rebuilds, dispatches, handlers)
//! - Expose Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `module_cache_lookups_total` (counter): lookups by prefix, outcome
//! - `module_cache_rebuilds_total` (counter): rebuilds by prefix
//! - `dispatch_requests_total` (counter): dispatches by prefix, outcome
//! - `handler_instances_total` (counter): handler constructions by prefix
//!
//! # Design Decisions
//! - Low-overhead metric updates; without an installed recorder they are no-ops
//! - Labels for prefix and outcome only, keeping cardinality bounded

use std::net::SocketAddr;
use metrics::counter;
use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus exporter on `addr`. Needs a running tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to start metrics exporter"),
    }
}

pub fn record_cache_lookup(prefix: &str, outcome: &'static str) {
    counter!("module_cache_lookups_total", "prefix" => prefix.to_string(), "outcome" => outcome).increment(1);
}

pub fn record_rebuild(prefix: &str) {
    counter!("module_cache_rebuilds_total", "prefix" => prefix.to_string()).increment(1);
}

pub fn record_dispatch(prefix: &str, outcome: &'static str) {
    counter!("dispatch_requests_total", "prefix" => prefix.to_string(), "outcome" => outcome).increment(1);
}

pub fn record_handler_instance(prefix: &str) {
    counter!("handler_instances_total", "prefix" => prefix.to_string()).increment(1);
}

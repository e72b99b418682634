//! Metrics collection and exposition.
//!
//! # Metrics
//! - `haproxy_ingress_renders_total` (counter): render passes by result
//! - `haproxy_ingress_render_duration_seconds` (histogram): build + render time
//! - `haproxy_ingress_userlists` (gauge): userlists in the last configuration
//! - `haproxy_ingress_servers` (gauge): servers per frontend kind
//!
//! # Design Decisions
//! - Recording is a no-op until an exporter is installed
//! - Prometheus exporter is optional and off by default

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::haproxy::Configuration;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record the outcome of one render pass.
pub fn record_render(result: &'static str, start: Instant) {
    counter!("haproxy_ingress_renders_total", "result" => result).increment(1);
    histogram!("haproxy_ingress_render_duration_seconds").record(start.elapsed().as_secs_f64());
}

/// Record the shape of an assembled configuration.
pub fn record_configuration(conf: &Configuration) {
    gauge!("haproxy_ingress_userlists").set(conf.userlists.len() as f64);
    gauge!("haproxy_ingress_servers", "kind" => "http").set(conf.http_servers.len() as f64);
    gauge!("haproxy_ingress_servers", "kind" => "https").set(conf.https_servers.len() as f64);
    gauge!("haproxy_ingress_servers", "kind" => "default")
        .set(if conf.default_server.is_some() { 1.0 } else { 0.0 });
}

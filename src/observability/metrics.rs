//! Metrics collection and exposition.
//!
//! # Metrics
//! - `http_requests_total` (counter): responses sent, by method and status
//! - `http_connections_total` (counter): accepted connections
//! - `http_active_connections` (gauge): connections currently served
//! - `http_tls_handshake_failures_total` (counter)
//!
//! # Design Decisions
//! - Recording is a no-op until an exporter is installed
//! - Prometheus exposition is opt-in via configuration

use std::net::SocketAddr;

use ::metrics::{counter, gauge};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::http::{Method, Status};

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

/// Count one response written to the wire.
pub fn record_request(method: Method, status: Status) {
    counter!(
        "http_requests_total",
        "method" => method.as_str(),
        "status" => status.code().to_string()
    )
    .increment(1);
}

/// Count a connection entering its request loop.
pub fn connection_opened() {
    counter!("http_connections_total").increment(1);
    gauge!("http_active_connections").increment(1.0);
}

/// Mark a connection as finished.
pub fn connection_closed() {
    gauge!("http_active_connections").decrement(1.0);
}

/// Count a connection dropped during the TLS handshake.
pub fn tls_handshake_failed() {
    counter!("http_tls_handshake_failures_total").increment(1);
}

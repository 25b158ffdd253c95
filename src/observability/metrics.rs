//! Metrics collection and exposition.
//!
//! # Metrics
//! - `ws_client_connect_attempts_total` (counter): transport handles opened
//! - `ws_client_opens_total` (counter): successful opens
//! - `ws_client_reconnects_total` (counter): reconnect timers fired
//! - `ws_client_give_ups_total` (counter): reconnect budgets exhausted
//! - `ws_client_transport_errors_total` (counter): transport error events
//! - `ws_client_liveness_failures_total` (counter): heartbeat found transport dead
//! - `ws_client_heartbeats_sent_total` (counter)
//! - `ws_client_messages_received_total` (counter): payloads delivered to the owner
//! - `ws_client_stale_events_total` (counter): events from superseded handles
//! - `ws_client_connected` (gauge): connections whose transport is open
//!
//! # Design Decisions
//! - Without an installed recorder every call is a no-op
//! - Prometheus exporter is opt-in from the CLI

use std::net::SocketAddr;
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its HTTP scrape listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_connect_attempt() {
    metrics::counter!("ws_client_connect_attempts_total").increment(1);
}

pub fn record_open() {
    metrics::counter!("ws_client_opens_total").increment(1);
}

pub fn record_reconnect() {
    metrics::counter!("ws_client_reconnects_total").increment(1);
}

pub fn record_give_up() {
    metrics::counter!("ws_client_give_ups_total").increment(1);
}

pub fn record_transport_error() {
    metrics::counter!("ws_client_transport_errors_total").increment(1);
}

pub fn record_liveness_failure() {
    metrics::counter!("ws_client_liveness_failures_total").increment(1);
}

pub fn record_heartbeat_sent() {
    metrics::counter!("ws_client_heartbeats_sent_total").increment(1);
}

pub fn record_message_received() {
    metrics::counter!("ws_client_messages_received_total").increment(1);
}

pub fn record_stale_event() {
    metrics::counter!("ws_client_stale_events_total").increment(1);
}

/// Each connection adds itself once on open and removes itself once on
/// leaving `Open`.
pub fn record_connected() {
    metrics::gauge!("ws_client_connected").increment(1.0);
}

pub fn record_disconnected() {
    metrics::gauge!("ws_client_connected").decrement(1.0);
}

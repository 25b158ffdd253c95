//! Errors reported to the connection's event handler.

use std::time::Duration;
use thiserror::Error;

/// A failure observed by a resilient connection.
///
/// These are never returned to the caller; they are delivered through
/// `EventHandler::on_error` and the connection recovers on its own.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConnectionError {
    /// The transport reported an error (handshake failure, I/O error, protocol violation).
    #[error("transport error: {0}")]
    Transport(String),

    /// The opening handshake did not complete in time.
    #[error("connect timed out after {0:?}")]
    ConnectTimeout(Duration),

    /// The heartbeat timer fired while the transport was not open.
    #[error("heartbeat found transport not open")]
    HeartbeatTimeout,
}

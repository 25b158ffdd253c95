//! Timeout enforcement.
//!
//! # Responsibilities
//! - Bound the opening handshake of a transport
//! - Map both the inner failure and the deadline into `ConnectionError`
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - A timed-out handshake is a transport failure like any other and goes
//!   through the same reconnect path

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tokio::time;

use crate::connection::error::ConnectionError;

/// Run a fallible connect future with a deadline.
pub async fn connect_with_timeout<F, T, E>(limit: Duration, fut: F) -> Result<T, ConnectionError>
where
    F: Future<Output = Result<T, E>>,
    E: Display,
{
    match time::timeout(limit, fut).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(ConnectionError::Transport(e.to_string())),
        Err(_) => Err(ConnectionError::ConnectTimeout(limit)),
    }
}

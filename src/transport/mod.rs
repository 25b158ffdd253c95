//! Transport subsystem.
//!
//! # Data Flow
//! ```text
//! Control loop
//!     → Connector::connect (one call per generation)
//!     → TransportHandle (send / close / ready_state, owned by the loop)
//!
//! Transport task
//!     → TransportEvent { generation, kind } over an unbounded channel
//!     → Control loop (stale generations discarded there)
//! ```
//!
//! # Design Decisions
//! - The control loop only sees the two traits below, so the state machine
//!   can be driven by a scripted transport under a paused clock
//! - Handles are synchronous: `send` enqueues, `close` never waits
//! - Every event carries the generation of the handle that produced it

use std::time::Duration;
use tokio::sync::mpsc;
use url::Url;

use crate::connection::error::ConnectionError;
use crate::connection::state::{Generation, ReadyState};

#[cfg(test)]
pub(crate) mod mock;
pub mod websocket;

pub use websocket::WsConnector;

/// What a transport handle observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEventKind {
    /// Opening handshake completed.
    Open,
    /// A text payload arrived.
    Message(String),
    /// The transport failed. A `Close` follows on the same generation.
    Error(ConnectionError),
    /// The transport is closed. Emitted at most once per generation.
    Close,
}

/// An event tagged with the generation of the handle that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportEvent {
    pub generation: Generation,
    pub kind: TransportEventKind,
}

/// Channel the transport reports its events on.
pub type EventSender = mpsc::UnboundedSender<TransportEvent>;

/// Everything a connector needs to open one transport handle.
#[derive(Debug, Clone)]
pub struct ConnectRequest {
    pub url: Url,
    pub generation: Generation,
    pub connect_timeout: Duration,
    pub events: EventSender,
}

impl ConnectRequest {
    /// Report an event for this request's generation.
    ///
    /// A closed channel means the owning connection is gone; the event is dropped.
    pub fn emit(&self, kind: TransportEventKind) {
        let _ = self.events.send(TransportEvent {
            generation: self.generation,
            kind,
        });
    }
}

/// Opens transport handles.
pub trait Connector: Send + Sync + 'static {
    /// Start opening a handle. Must return immediately; progress is reported
    /// through `request.events`.
    fn connect(&self, request: ConnectRequest) -> Box<dyn TransportHandle>;
}

/// One live (or opening) transport connection.
pub trait TransportHandle: Send + Sync {
    /// Queue a text payload. Returns false if the handle is not open.
    fn send(&self, payload: &str) -> bool;

    /// Start closing. Idempotent.
    fn close(&self);

    /// Instantaneous transport status.
    fn ready_state(&self) -> ReadyState;
}

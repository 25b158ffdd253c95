//! Resilient WebSocket client library.
//!
//! Keeps a logically continuous text channel over a replaceable transport:
//! heartbeats detect dead connections, bounded reconnects recover from them.

pub mod config;
pub mod connection;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod transport;

pub use config::ClientConfig;
pub use connection::{
    Callbacks, ConnectionConfig, ConnectionError, ConnectionHandle, EventHandler, Lifecycle,
    ReadyState, ResilientConnection,
};
pub use resilience::ReconnectPolicy;

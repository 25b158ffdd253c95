//! Resilient connection subsystem.
//!
//! # Data Flow
//! ```text
//! Owner
//!     → client.rs (send / destroy / status, synchronous)
//!
//! Transport events, heartbeat deadline, reconnect deadline
//!     → driver.rs (one control loop per connection, one event at a time)
//!     → state.rs (lifecycle, ready state, generation)
//!     → handler.rs (owner callbacks)
//! ```
//!
//! # Design Decisions
//! - One logical connection per instance; instances share nothing
//! - Every received message re-arms the heartbeat, not only heartbeats
//! - The reconnect counter resets only on a successful open
//! - Failures never surface as `Err` to the owner; they arrive as callbacks

pub mod client;
mod driver;
pub mod error;
pub mod handler;
pub mod options;
pub mod state;


pub use client::{ConnectionHandle, ResilientConnection};
pub use error::ConnectionError;
pub use handler::{Callbacks, EventHandler};
pub use options::ConnectionConfig;
pub use state::{Generation, Lifecycle, ReadyState};

//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Transport open:
//!     → timeouts.rs (bound the opening handshake)
//!
//! Transport failure:
//!     → backoff.rs (delay before the next reconnect attempt)
//!     → control loop arms the reconnect timer
//! ```
//!
//! # Design Decisions
//! - Every handshake has a deadline
//! - Default delay is fixed; exponential with jitter is opt-in
//! - The attempt budget lives in the control loop, not here

pub mod backoff;
pub mod timeouts;

pub use backoff::ReconnectPolicy;

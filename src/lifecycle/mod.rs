//! Lifecycle management for the binaries.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → shutdown_signal() resolves
//!     → CLI destroys its connection and waits for the control loop
//! ```

pub mod signals;

pub use signals::shutdown_signal;

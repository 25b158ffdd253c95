//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Control loop and transports produce:
//!     → tracing events (structured fields: generation, attempt, delay)
//!     → metrics.rs (counters)
//!
//! Consumers:
//!     → logging.rs subscriber (stdout)
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! # Design Decisions
//! - Every control-loop run is wrapped in a span carrying the client id and url
//! - Metrics are cheap (atomic increments) and safe to call without a recorder

pub mod logging;
pub mod metrics;

//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ClientConfig (validated)
//!     → ClientConfig::connection_config() → ConnectionConfig (runtime options)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once a connection is constructed
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::ClientConfig;
pub use schema::{BackoffStrategy, HeartbeatConfig, ObservabilityConfig, ReconnectConfig};

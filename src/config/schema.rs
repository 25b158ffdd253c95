//! Configuration schema definitions.
//!
//! This module defines the configuration file structure for the client.
//! All types derive Serde traits for deserialization from TOML.

use std::time::Duration;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::connection::options::{
    ConnectionConfig, DEFAULT_HEARTBEAT_PAYLOAD, DEFAULT_MAX_RECONNECT_ATTEMPTS,
};
use crate::resilience::ReconnectPolicy;

/// Root configuration for the client.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct ClientConfig {
    /// Endpoint and handshake settings.
    pub connection: ConnectionSection,

    /// Liveness probing.
    pub heartbeat: HeartbeatConfig,

    /// Automatic recovery.
    pub reconnect: ReconnectConfig,

    /// Logging and metrics.
    pub observability: ObservabilityConfig,
}

/// Endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ConnectionSection {
    /// WebSocket URL (e.g., "ws://127.0.0.1:9001/ws").
    pub url: String,

    /// Opening handshake timeout in seconds.
    pub connect_timeout_secs: u64,
}

impl Default for ConnectionSection {
    fn default() -> Self {
        Self {
            url: "ws://127.0.0.1:9001/ws".to_string(),
            connect_timeout_secs: 10,
        }
    }
}

/// Heartbeat configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct HeartbeatConfig {
    /// Send heartbeats and watch for silence.
    pub enabled: bool,

    /// Opaque heartbeat text, compared by exact equality with inbound payloads.
    pub payload: String,

    /// Silence in seconds before a heartbeat is sent.
    pub interval_secs: u64,
}

impl Default for HeartbeatConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            payload: DEFAULT_HEARTBEAT_PAYLOAD.to_string(),
            interval_secs: 18,
        }
    }
}

/// Delay growth between reconnect attempts.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackoffStrategy {
    #[default]
    Fixed,
    Exponential,
}

/// Reconnect configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ReconnectConfig {
    /// Maximum reconnect attempts between successful opens (0 disables).
    pub max_attempts: u32,

    /// Fixed or exponential delay.
    pub strategy: BackoffStrategy,

    /// Delay (or exponential base) in seconds.
    pub delay_secs: u64,

    /// Cap for the exponential strategy in seconds.
    pub max_delay_secs: u64,

    /// Reconnect after a clean remote close too.
    pub on_close: bool,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_RECONNECT_ATTEMPTS,
            strategy: BackoffStrategy::Fixed,
            delay_secs: 10,
            max_delay_secs: 60,
            on_close: false,
        }
    }
}

impl ReconnectConfig {
    pub fn policy(&self) -> ReconnectPolicy {
        let base = Duration::from_secs(self.delay_secs);
        match self.strategy {
            BackoffStrategy::Fixed => ReconnectPolicy::Fixed(base),
            BackoffStrategy::Exponential => ReconnectPolicy::Exponential {
                base,
                max: Duration::from_secs(self.max_delay_secs),
            },
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

impl ClientConfig {
    /// Build the runtime options for a connection.
    ///
    /// Expects a validated config; only the URL can still fail here.
    pub fn connection_config(&self) -> Result<ConnectionConfig, url::ParseError> {
        let url = Url::parse(&self.connection.url)?;
        Ok(ConnectionConfig::new(url)
            .heartbeat_enabled(self.heartbeat.enabled)
            .heartbeat_payload(self.heartbeat.payload.clone())
            .heartbeat_interval(Duration::from_secs(self.heartbeat.interval_secs))
            .max_reconnect_attempts(self.reconnect.max_attempts)
            .reconnect_policy(self.reconnect.policy())
            .connect_timeout(Duration::from_secs(self.connection.connect_timeout_secs))
            .reconnect_on_close(self.reconnect.on_close))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config: ClientConfig = toml::from_str("").unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.heartbeat.payload, r#"{"heart":"-PING-"}"#);
        assert_eq!(config.reconnect.max_attempts, 5);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config: ClientConfig = toml::from_str(
            r#"
            [connection]
            url = "wss://feed.example.com/socket"

            [reconnect]
            strategy = "exponential"
            max_attempts = 8
            "#,
        )
        .unwrap();

        assert_eq!(config.connection.url, "wss://feed.example.com/socket");
        assert_eq!(config.connection.connect_timeout_secs, 10);
        assert_eq!(config.reconnect.strategy, BackoffStrategy::Exponential);
        assert_eq!(config.reconnect.max_attempts, 8);
        assert_eq!(config.reconnect.delay_secs, 10);
        assert!(config.heartbeat.enabled);
    }

    #[test]
    fn converts_to_connection_config() {
        let mut config = ClientConfig::default();
        config.heartbeat.interval_secs = 30;
        config.reconnect.strategy = BackoffStrategy::Exponential;
        config.reconnect.delay_secs = 2;
        config.reconnect.max_delay_secs = 20;
        config.reconnect.on_close = true;

        let options = config.connection_config().unwrap();
        assert_eq!(options.url.as_str(), "ws://127.0.0.1:9001/ws");
        assert_eq!(options.heartbeat_interval, Duration::from_secs(30));
        assert_eq!(
            options.reconnect_policy,
            ReconnectPolicy::Exponential {
                base: Duration::from_secs(2),
                max: Duration::from_secs(20),
            }
        );
        assert!(options.reconnect_on_close);
    }

    #[test]
    fn unknown_strategy_is_rejected() {
        let result: Result<ClientConfig, _> = toml::from_str(
            r#"
            [reconnect]
            strategy = "linear"
            "#,
        );
        assert!(result.is_err());
    }
}

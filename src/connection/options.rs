//! Runtime options for a resilient connection.

use std::time::Duration;
use url::Url;

use crate::resilience::ReconnectPolicy;

/// Heartbeat payload used when none is configured.
pub const DEFAULT_HEARTBEAT_PAYLOAD: &str = r#"{"heart":"-PING-"}"#;

/// Silence after which a heartbeat is sent.
pub const DEFAULT_HEARTBEAT_INTERVAL: Duration = Duration::from_secs(18);

/// Delay before each reconnect attempt.
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(10);

pub const DEFAULT_MAX_RECONNECT_ATTEMPTS: u32 = 5;

pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Immutable settings supplied when a connection is constructed.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Endpoint to connect and reconnect to.
    pub url: Url,

    /// Arm, re-arm and send heartbeats. When false no heartbeat timer exists.
    /// A zero `heartbeat_interval` also disables them.
    pub heartbeat_enabled: bool,

    /// Opaque heartbeat text. Inbound payloads equal to it are swallowed.
    pub heartbeat_payload: String,

    /// Silence after which a heartbeat is sent (or liveness declared lost).
    pub heartbeat_interval: Duration,

    /// Reconnect budget. 0 disables reconnection.
    pub max_reconnect_attempts: u32,

    /// Delay before each reconnect attempt.
    pub reconnect_policy: ReconnectPolicy,

    /// Deadline for the opening handshake.
    pub connect_timeout: Duration,

    /// Treat a clean remote close as a failure and reconnect.
    pub reconnect_on_close: bool,
}

impl ConnectionConfig {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            heartbeat_enabled: true,
            heartbeat_payload: DEFAULT_HEARTBEAT_PAYLOAD.to_string(),
            heartbeat_interval: DEFAULT_HEARTBEAT_INTERVAL,
            max_reconnect_attempts: DEFAULT_MAX_RECONNECT_ATTEMPTS,
            reconnect_policy: ReconnectPolicy::Fixed(DEFAULT_RECONNECT_DELAY),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            reconnect_on_close: false,
        }
    }

    /// Whether a heartbeat timer is ever armed.
    pub fn heartbeat_active(&self) -> bool {
        self.heartbeat_enabled && !self.heartbeat_interval.is_zero()
    }

    pub fn heartbeat_enabled(mut self, enabled: bool) -> Self {
        self.heartbeat_enabled = enabled;
        self
    }

    pub fn heartbeat_payload(mut self, payload: impl Into<String>) -> Self {
        self.heartbeat_payload = payload.into();
        self
    }

    pub fn heartbeat_interval(mut self, interval: Duration) -> Self {
        self.heartbeat_interval = interval;
        self
    }

    pub fn max_reconnect_attempts(mut self, attempts: u32) -> Self {
        self.max_reconnect_attempts = attempts;
        self
    }

    pub fn reconnect_policy(mut self, policy: ReconnectPolicy) -> Self {
        self.reconnect_policy = policy;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn reconnect_on_close(mut self, enabled: bool) -> Self {
        self.reconnect_on_close = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = ConnectionConfig::new(Url::parse("ws://localhost:9001/ws").unwrap());
        assert!(config.heartbeat_enabled);
        assert_eq!(config.heartbeat_payload, r#"{"heart":"-PING-"}"#);
        assert_eq!(config.heartbeat_interval, Duration::from_secs(18));
        assert_eq!(config.max_reconnect_attempts, 5);
        assert_eq!(config.reconnect_policy, ReconnectPolicy::Fixed(Duration::from_secs(10)));
        assert!(!config.reconnect_on_close);
    }

    #[test]
    fn setters_override_defaults() {
        let config = ConnectionConfig::new(Url::parse("ws://localhost:9001/ws").unwrap())
            .heartbeat_enabled(false)
            .heartbeat_payload("ping")
            .max_reconnect_attempts(0)
            .reconnect_on_close(true);
        assert!(!config.heartbeat_enabled);
        assert_eq!(config.heartbeat_payload, "ping");
        assert_eq!(config.max_reconnect_attempts, 0);
        assert!(config.reconnect_on_close);
    }

    #[test]
    fn zero_interval_turns_heartbeat_off() {
        let url = Url::parse("ws://localhost:9001/ws").unwrap();
        assert!(ConnectionConfig::new(url.clone()).heartbeat_active());
        assert!(!ConnectionConfig::new(url.clone()).heartbeat_enabled(false).heartbeat_active());
        assert!(!ConnectionConfig::new(url)
            .heartbeat_interval(Duration::ZERO)
            .heartbeat_active());
    }
}

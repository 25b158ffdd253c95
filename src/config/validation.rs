//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate the endpoint URL and its scheme
//! - Validate value ranges (intervals and delays > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ClientConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is turned into connection options

use std::net::SocketAddr;
use thiserror::Error;
use url::Url;

use crate::config::schema::{BackoffStrategy, ClientConfig};

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("connection.url '{url}' is not a valid URL: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("connection.url scheme must be ws or wss, got '{0}'")]
    UnsupportedScheme(String),

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("heartbeat.payload must not be empty when heartbeat is enabled")]
    EmptyHeartbeatPayload,

    #[error("reconnect.max_delay_secs ({max}) must not be below reconnect.delay_secs ({base})")]
    DelayCapBelowBase { base: u64, max: u64 },

    #[error("observability.metrics_address '{0}' is not a socket address")]
    InvalidMetricsAddress(String),
}

/// Check a configuration, collecting every problem found.
pub fn validate_config(config: &ClientConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match Url::parse(&config.connection.url) {
        Ok(url) if matches!(url.scheme(), "ws" | "wss") => {}
        Ok(url) => errors.push(ValidationError::UnsupportedScheme(url.scheme().to_string())),
        Err(e) => errors.push(ValidationError::InvalidUrl {
            url: config.connection.url.clone(),
            reason: e.to_string(),
        }),
    }

    if config.connection.connect_timeout_secs == 0 {
        errors.push(ValidationError::Zero("connection.connect_timeout_secs"));
    }

    if config.heartbeat.enabled {
        if config.heartbeat.interval_secs == 0 {
            errors.push(ValidationError::Zero("heartbeat.interval_secs"));
        }
        if config.heartbeat.payload.is_empty() {
            errors.push(ValidationError::EmptyHeartbeatPayload);
        }
    }

    if config.reconnect.delay_secs == 0 {
        errors.push(ValidationError::Zero("reconnect.delay_secs"));
    }
    if config.reconnect.strategy == BackoffStrategy::Exponential
        && config.reconnect.max_delay_secs < config.reconnect.delay_secs
    {
        errors.push(ValidationError::DelayCapBelowBase {
            base: config.reconnect.delay_secs,
            max: config.reconnect.max_delay_secs,
        });
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(validate_config(&ClientConfig::default()), Ok(()));
    }

    #[test]
    fn rejects_non_websocket_scheme() {
        let mut config = ClientConfig::default();
        config.connection.url = "http://127.0.0.1:9001/ws".to_string();
        assert_eq!(
            validate_config(&config),
            Err(vec![ValidationError::UnsupportedScheme("http".to_string())])
        );
    }

    #[test]
    fn collects_every_error() {
        let mut config = ClientConfig::default();
        config.connection.url = "not a url".to_string();
        config.heartbeat.interval_secs = 0;
        config.heartbeat.payload.clear();
        config.reconnect.delay_secs = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(matches!(errors[0], ValidationError::InvalidUrl { .. }));
        assert!(errors.contains(&ValidationError::Zero("heartbeat.interval_secs")));
        assert!(errors.contains(&ValidationError::EmptyHeartbeatPayload));
        assert!(errors.contains(&ValidationError::Zero("reconnect.delay_secs")));
    }

    #[test]
    fn heartbeat_fields_ignored_when_disabled() {
        let mut config = ClientConfig::default();
        config.heartbeat.enabled = false;
        config.heartbeat.interval_secs = 0;
        config.heartbeat.payload.clear();
        assert_eq!(validate_config(&config), Ok(()));
    }

    #[test]
    fn exponential_cap_must_cover_base() {
        let mut config = ClientConfig::default();
        config.reconnect.strategy = BackoffStrategy::Exponential;
        config.reconnect.delay_secs = 30;
        config.reconnect.max_delay_secs = 10;
        assert_eq!(
            validate_config(&config),
            Err(vec![ValidationError::DelayCapBelowBase { base: 30, max: 10 }])
        );
    }

    #[test]
    fn metrics_address_checked_only_when_enabled() {
        let mut config = ClientConfig::default();
        config.observability.metrics_address = "nowhere".to_string();
        assert_eq!(validate_config(&config), Ok(()));

        config.observability.metrics_enabled = true;
        assert_eq!(
            validate_config(&config),
            Err(vec![ValidationError::InvalidMetricsAddress("nowhere".to_string())])
        );
    }
}

//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check the prefixes are usable routes and do not collide
//! - Validate value ranges (timeouts > 0, addresses parseable)
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Pure function: GatewayConfig → Result<(), Vec<ValidationError>>

use std::net::SocketAddr;

use crate::config::schema::GatewayConfig;

/// A single semantic configuration fault.
#[derive(Debug)]
pub enum ValidationError {
    InvalidBindAddress(String),
    InvalidMetricsAddress(String),
    InvalidPrefix { which: &'static str, value: String },
    PrefixCollision(String),
    ZeroTimeout(&'static str),
    ZeroBodyLimit,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::InvalidBindAddress(addr) => {
                write!(f, "listener.bind_address is not a socket address: {addr}")
            }
            ValidationError::InvalidMetricsAddress(addr) => {
                write!(f, "observability.metrics_address is not a socket address: {addr}")
            }
            ValidationError::InvalidPrefix { which, value } => {
                write!(f, "proxy.{which} must start and end with '/': {value}")
            }
            ValidationError::PrefixCollision(prefix) => {
                write!(f, "direct and observe prefixes collide: {prefix}")
            }
            ValidationError::ZeroTimeout(which) => write!(f, "{which} must be greater than zero"),
            ValidationError::ZeroBodyLimit => {
                write!(f, "listener.max_body_bytes must be greater than zero")
            }
        }
    }
}

/// Validate a parsed configuration, collecting every fault.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }
    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    for (which, value) in [
        ("direct_prefix", &config.proxy.direct_prefix),
        ("observe_prefix", &config.proxy.observe_prefix),
    ] {
        if value.len() < 2 || !value.starts_with('/') || !value.ends_with('/') {
            errors.push(ValidationError::InvalidPrefix {
                which,
                value: value.clone(),
            });
        }
    }
    if config.proxy.direct_prefix == config.proxy.observe_prefix {
        errors.push(ValidationError::PrefixCollision(
            config.proxy.direct_prefix.clone(),
        ));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("timeouts.request_secs"));
    }
    if config.upstream.exchange_timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("upstream.exchange_timeout_secs"));
    }
    if config.listener.max_body_bytes == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
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
    fn default_config_is_valid() {
        assert!(validate_config(&GatewayConfig::default()).is_ok());
    }

    #[test]
    fn all_faults_are_collected() {
        let mut config = GatewayConfig::default();
        config.listener.bind_address = "nonsense".into();
        config.proxy.direct_prefix = "proxy".into();
        config.timeouts.request_secs = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn colliding_prefixes_are_rejected() {
        let mut config = GatewayConfig::default();
        config.proxy.observe_prefix = config.proxy.direct_prefix.clone();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], ValidationError::PrefixCollision(_)));
    }
}

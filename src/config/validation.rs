//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, limits > 0, addresses parse)
//! - Check that enabled features carry what they need (SMTP host, sender)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: SiteConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::SiteConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Validate a parsed configuration, collecting every problem.
pub fn validate_config(config: &SiteConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }

    if config.security.trusted_origins.is_empty() {
        errors.push(ValidationError::new(
            "security.trusted_origins",
            "at least one trusted origin is required",
        ));
    }
    for origin in &config.security.trusted_origins {
        if !(origin.starts_with("http://") || origin.starts_with("https://")) {
            errors.push(ValidationError::new(
                "security.trusted_origins",
                format!("'{}' must start with http:// or https://", origin),
            ));
        }
    }

    if config.rate_limit.max_requests == 0 {
        errors.push(ValidationError::new("rate_limit.max_requests", "must be greater than 0"));
    }
    if config.rate_limit.window_secs == 0 {
        errors.push(ValidationError::new("rate_limit.window_secs", "must be greater than 0"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than 0"));
    }

    if config.email.enabled {
        if config.email.host.trim().is_empty() {
            errors.push(ValidationError::new("email.host", "required when email is enabled"));
        }
        if config.email.default_sender.trim().is_empty() {
            errors.push(ValidationError::new(
                "email.default_sender",
                "required when email is enabled",
            ));
        }
        if config.email.admin_address().trim().is_empty() {
            errors.push(ValidationError::new(
                "email.admin_recipient",
                "required when email is enabled",
            ));
        }
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", config.observability.metrics_address),
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
    fn test_default_config_is_valid() {
        assert!(validate_config(&SiteConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = SiteConfig::default();
        config.listener.bind_address = "not-an-address".into();
        config.security.trusted_origins = vec!["localhost:8080".into()];
        config.rate_limit.max_requests = 0;

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec![
                "listener.bind_address",
                "security.trusted_origins",
                "rate_limit.max_requests"
            ]
        );
    }

    #[test]
    fn test_enabled_email_needs_host() {
        let mut config = SiteConfig::default();
        config.email.enabled = true;
        config.email.host = " ".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "email.host");
    }
}

//! Configuration loading from disk and environment.

use std::env;
use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::SiteConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {key}: {value}")]
    Env { key: &'static str, value: String },

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load, override from environment and validate configuration.
///
/// Without a path the built-in defaults are used as the base.
pub fn load_config(path: Option<&Path>) -> Result<SiteConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => SiteConfig::default(),
    };

    apply_env_overrides(&mut config, |key| env::var(key).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Overlay `SITE_*` variables onto a parsed config.
///
/// The lookup is injected so tests don't touch the process environment.
pub fn apply_env_overrides<F>(config: &mut SiteConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = lookup("SITE_BIND_ADDRESS") {
        config.listener.bind_address = value;
    }
    if let Some(value) = lookup("SITE_ALLOWED_HOSTS") {
        config.security.trusted_origins = value
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(String::from)
            .collect();
    }
    if let Some(value) = lookup("SITE_RATE_LIMIT_MAX") {
        config.rate_limit.max_requests = value.parse().map_err(|_| ConfigError::Env {
            key: "SITE_RATE_LIMIT_MAX",
            value,
        })?;
    }
    if let Some(value) = lookup("SITE_EMAIL_ENABLED") {
        config.email.enabled = matches!(value.to_lowercase().as_str(), "true" | "1" | "yes");
    }
    if let Some(value) = lookup("SITE_SMTP_HOST") {
        config.email.host = value;
    }
    if let Some(value) = lookup("SITE_SMTP_PORT") {
        config.email.port = value.parse().map_err(|_| ConfigError::Env {
            key: "SITE_SMTP_PORT",
            value,
        })?;
    }
    if let Some(value) = lookup("SITE_SMTP_USERNAME") {
        config.email.username = value;
    }
    if let Some(value) = lookup("SITE_SMTP_PASSWORD") {
        config.email.password = value;
    }
    if let Some(value) = lookup("SITE_EMAIL_SENDER") {
        config.email.default_sender = value;
    }
    if let Some(value) = lookup("SITE_LOG_LEVEL") {
        config.observability.log_level = value;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_allowed_hosts_override() {
        let mut config = SiteConfig::default();
        apply_env_overrides(
            &mut config,
            lookup_from(&[("SITE_ALLOWED_HOSTS", "https://studio.example, https://www.studio.example,")]),
        )
        .unwrap();

        assert_eq!(
            config.security.trusted_origins,
            vec!["https://studio.example", "https://www.studio.example"]
        );
    }

    #[test]
    fn test_bad_numeric_override_is_reported() {
        let mut config = SiteConfig::default();
        let err = apply_env_overrides(&mut config, lookup_from(&[("SITE_SMTP_PORT", "smtp")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Env { key: "SITE_SMTP_PORT", .. }));
    }

    #[test]
    fn test_email_flag_accepts_common_truthy_values() {
        for value in ["true", "1", "YES"] {
            let mut config = SiteConfig::default();
            apply_env_overrides(&mut config, lookup_from(&[("SITE_EMAIL_ENABLED", value)])).unwrap();
            assert!(config.email.enabled, "{value} should enable email");
        }
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_config(Some(Path::new("does/not/exist.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}

//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the site.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the site.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct SiteConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Template and static asset locations.
    pub site: PagesConfig,

    /// Trusted origins and request hardening.
    pub security: SecurityConfig,

    /// Rate limiting configuration.
    pub rate_limit: RateLimitConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Outbound email (SMTP) settings.
    pub email: EmailConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Where pages and assets live on disk.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PagesConfig {
    /// Site name, shown in logs and page titles.
    pub name: String,

    /// Directory holding Tera templates (`**/*.html`).
    pub templates_dir: String,

    /// Directory served under `/static`.
    pub static_dir: String,
}

impl Default for PagesConfig {
    fn default() -> Self {
        Self {
            name: "studio".to_string(),
            templates_dir: "templates".to_string(),
            static_dir: "static".to_string(),
        }
    }
}

/// Security hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Origins accepted by the CSRF guard. Exact match for `Origin`,
    /// string prefix for `Referer`.
    pub trusted_origins: Vec<String>,

    /// Maximum body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            trusted_origins: vec![
                "http://0.0.0.0:8080".to_string(),
                "http://localhost:8080".to_string(),
                "http://127.0.0.1:8080".to_string(),
            ],
            max_body_size: 64 * 1024,
        }
    }
}

/// Rate limiting configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Enable rate limiting.
    pub enabled: bool,

    /// Maximum requests per client inside one window.
    pub max_requests: usize,

    /// Sliding window length in seconds.
    pub window_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_requests: 200,
            window_secs: 60,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Outbound email configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EmailConfig {
    /// When disabled, messages are rendered and logged instead of sent.
    pub enabled: bool,

    /// SMTP relay host.
    pub host: String,

    /// SMTP port.
    pub port: u16,

    pub username: String,

    pub password: String,

    /// Use implicit TLS (SMTPS) instead of STARTTLS.
    pub use_tls: bool,

    /// `From:` address for every message.
    pub default_sender: String,

    /// Recipient of new-booking notifications. Falls back to the sender.
    pub admin_recipient: Option<String>,
}

impl EmailConfig {
    /// Address that receives admin notifications.
    pub fn admin_address(&self) -> &str {
        self.admin_recipient
            .as_deref()
            .filter(|addr| !addr.is_empty())
            .unwrap_or(&self.default_sender)
    }
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            host: "localhost".to_string(),
            port: 587,
            username: String::new(),
            password: String::new(),
            use_tls: false,
            default_sender: "contato@localhost".to_string(),
            admin_recipient: None,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format: "pretty" or "json".
    pub log_format: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

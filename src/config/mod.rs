//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional) + .env / SITE_* variables
//!     → loader.rs (parse, deserialize, environment overrides)
//!     → validation.rs (semantic checks)
//!     → SiteConfig (validated, immutable)
//!     → handed to HttpServer once at startup
//! ```
//!
//! # Design Decisions
//! - Config is read once at process start; no hot reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::EmailConfig;
pub use schema::ObservabilityConfig;
pub use schema::RateLimitConfig;
pub use schema::SecurityConfig;
pub use schema::SiteConfig;

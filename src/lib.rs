//! Studio marketing site: landing and content pages plus the trial-class
//! booking API, behind a security middleware chain.

pub mod config;
pub mod error;
pub mod handlers;
pub mod http;
pub mod lifecycle;
pub mod notify;
pub mod observability;
pub mod render;
pub mod routing;
pub mod security;
pub mod validation;

pub use config::schema::SiteConfig;
pub use error::SiteError;
pub use http::HttpServer;
pub use lifecycle::Shutdown;

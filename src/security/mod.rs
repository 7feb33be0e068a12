//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → nonce.rs (issue CSP nonce into request extensions)
//!     → headers.rs (defer hardening headers to the way out)
//!     → rate_limit.rs (per-client sliding window)
//!     → csrf.rs (Origin/Referer allow-list on POST/PUT/DELETE)
//!     → Pass to route handler
//! ```
//!
//! # Design Decisions
//! - Fail closed: reject on any security check failure
//! - A rejection skips the remaining checks but still gets the headers
//! - Rate-limit state is process-local and injected, never global

pub mod csrf;
pub mod headers;
pub mod nonce;
pub mod rate_limit;

pub use csrf::{CsrfGuard, CsrfViolation};
pub use nonce::CspNonce;
pub use rate_limit::RateLimiter;

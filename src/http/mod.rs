//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware chain)
//!     → routing (method + path → handler)
//!     → handlers (render page / validate booking)
//!     → response.rs (JSON popup envelope for the API)
//!     → Send to client
//! ```

pub mod response;
pub mod server;

pub use response::{ApiResponse, Popup, PopupKind};
pub use server::{AppState, HttpServer, ServerError};

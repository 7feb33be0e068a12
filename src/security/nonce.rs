//! Per-request CSP nonce.

use std::sync::Arc;

use axum::{body::Body, http::Request, middleware::Next, response::Response};
use base64::{engine::general_purpose::STANDARD, Engine};
use rand::{thread_rng, RngCore};

/// Raw random bytes per nonce (128 bits).
const NONCE_BYTES_LEN: usize = 16;

/// Base64 of 16 fresh random bytes.
pub fn generate_csp_nonce() -> String {
    let mut bytes = [0u8; NONCE_BYTES_LEN];
    thread_rng().fill_bytes(&mut bytes);
    STANDARD.encode(bytes)
}

/// Request extension carrying the nonce shared by the renderer and the
/// `Content-Security-Policy` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CspNonce(Arc<str>);

impl CspNonce {
    pub fn new() -> Self {
        Self(Arc::from(generate_csp_nonce()))
    }

    pub fn value(&self) -> &str {
        &self.0
    }
}

impl Default for CspNonce {
    fn default() -> Self {
        Self::new()
    }
}

/// Outermost middleware: issues the nonce before anything else runs.
pub async fn nonce_middleware(mut request: Request<Body>, next: Next) -> Response {
    request.extensions_mut().insert(CspNonce::new());
    next.run(request).await
}

//! Hardening response headers.
//!
//! # Responsibilities
//! - Frame, sniffing, referrer and HSTS headers on every response
//! - Content-Security-Policy carrying the request's nonce
//!
//! # Design Decisions
//! - Runs just inside the nonce middleware, so rejections from the rate
//!   limiter or CSRF guard still leave with the full header set
//! - Reads the nonce before the handler runs; the handler renders with the
//!   same value

use axum::{
    body::Body,
    http::{header, HeaderMap, HeaderValue, Request},
    middleware::Next,
    response::Response,
};

use super::nonce::CspNonce;

pub const FRAME_OPTIONS: &str = "DENY";
pub const CONTENT_TYPE_OPTIONS: &str = "nosniff";
pub const REFERRER_POLICY: &str = "strict-origin-when-cross-origin";
pub const STRICT_TRANSPORT_SECURITY: &str = "max-age=31536000; includeSubDomains; preload";

/// Build the CSP for one response. `nonce` goes into both `style-src` and
/// `script-src`.
pub fn content_security_policy(nonce: &str) -> String {
    format!(
        "default-src 'self'; \
         style-src 'self' https://fonts.googleapis.com 'nonce-{nonce}'; \
         script-src 'self' https://maps.googleapis.com 'nonce-{nonce}' 'wasm-unsafe-eval'; \
         img-src 'self' data: https://maps.gstatic.com https://maps.googleapis.com; \
         font-src 'self' https://fonts.gstatic.com; \
         connect-src 'self' https://maps.googleapis.com https://maps.gstatic.com https://www.gstatic.com data:; \
         worker-src 'self' blob:; \
         frame-ancestors 'none'; \
         base-uri 'self';"
    )
}

/// Insert the full hardening header set, replacing any handler-set values.
pub fn apply_security_headers(headers: &mut HeaderMap, nonce: &CspNonce) {
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static(FRAME_OPTIONS));
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static(CONTENT_TYPE_OPTIONS),
    );
    headers.insert(header::REFERRER_POLICY, HeaderValue::from_static(REFERRER_POLICY));
    headers.insert(
        header::STRICT_TRANSPORT_SECURITY,
        HeaderValue::from_static(STRICT_TRANSPORT_SECURITY),
    );

    match HeaderValue::from_str(&content_security_policy(nonce.value())) {
        Ok(csp) => {
            headers.insert(header::CONTENT_SECURITY_POLICY, csp);
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to build Content-Security-Policy header");
        }
    }
}

pub async fn security_headers_middleware(request: Request<Body>, next: Next) -> Response {
    let nonce = match request.extensions().get::<CspNonce>() {
        Some(nonce) => nonce.clone(),
        None => {
            tracing::debug!("No nonce on request, issuing one for the CSP header");
            CspNonce::new()
        }
    };

    let mut response = next.run(request).await;
    apply_security_headers(response.headers_mut(), &nonce);
    response
}

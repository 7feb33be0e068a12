//! Origin/Referer allow-listing for state-changing requests.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, Method, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::error::SiteError;
use crate::observability::metrics;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CsrfViolation {
    #[error("untrusted origin '{origin}'")]
    UntrustedOrigin {
        origin: String,
        referer: Option<String>,
    },

    #[error("untrusted referer '{referer}'")]
    UntrustedReferer { referer: String },
}

#[derive(Debug, Clone)]
pub struct CsrfGuard {
    trusted_origins: Vec<String>,
}

impl CsrfGuard {
    pub fn new(trusted_origins: Vec<String>) -> Self {
        Self { trusted_origins }
    }

    /// Only POST, PUT and DELETE are checked.
    pub fn applies_to(method: &Method) -> bool {
        matches!(*method, Method::POST | Method::PUT | Method::DELETE)
    }

    /// `Origin` must equal a trusted origin; `Referer` must start with one.
    /// Missing or empty headers pass.
    pub fn check(&self, origin: Option<&str>, referer: Option<&str>) -> Result<(), CsrfViolation> {
        let origin = origin.filter(|value| !value.is_empty());
        let referer = referer.filter(|value| !value.is_empty());

        if let Some(origin) = origin {
            if !self.trusted_origins.iter().any(|trusted| trusted == origin) {
                return Err(CsrfViolation::UntrustedOrigin {
                    origin: origin.to_string(),
                    referer: referer.map(String::from),
                });
            }
        }

        if let Some(referer) = referer {
            if !self
                .trusted_origins
                .iter()
                .any(|trusted| referer.starts_with(trusted.as_str()))
            {
                return Err(CsrfViolation::UntrustedReferer {
                    referer: referer.to_string(),
                });
            }
        }

        Ok(())
    }
}

fn header_text(headers: &HeaderMap, name: header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
}

pub async fn csrf_middleware(
    State(guard): State<Arc<CsrfGuard>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if !CsrfGuard::applies_to(request.method()) {
        return next.run(request).await;
    }

    let origin = header_text(request.headers(), header::ORIGIN);
    let referer = header_text(request.headers(), header::REFERER);
    tracing::debug!(origin = ?origin, referer = ?referer, "Checking request origin");

    match guard.check(origin.as_deref(), referer.as_deref()) {
        Ok(()) => next.run(request).await,
        Err(violation) => {
            tracing::warn!(
                origin = ?origin,
                referer = ?referer,
                method = %request.method(),
                path = %request.uri().path(),
                "Request blocked by CSRF guard: {}",
                violation
            );
            metrics::record_rejection("csrf");
            SiteError::from(violation).into_response()
        }
    }
}

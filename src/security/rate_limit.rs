//! Per-client sliding-window rate limiting.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use dashmap::DashMap;

use crate::config::RateLimitConfig;
use crate::error::SiteError;
use crate::observability::metrics;

pub const FORWARDED_FOR: &str = "x-forwarded-for";

/// Request timestamps per client, pruned to the trailing window on every
/// call. Idle clients keep their (empty) entry.
pub struct RateLimiter {
    windows: DashMap<String, Vec<Instant>>,
    max_requests: usize,
    window: Duration,
}

impl RateLimiter {
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            windows: DashMap::new(),
            max_requests,
            window,
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(config.max_requests, Duration::from_secs(config.window_secs))
    }

    /// Record a request from `client` at `now`.
    /// Returns false, without recording, once the window is full.
    pub fn admit(&self, client: &str, now: Instant) -> bool {
        let mut stamps = self.windows.entry(client.to_string()).or_default();
        stamps.retain(|stamp| now.saturating_duration_since(*stamp) < self.window);

        if stamps.len() >= self.max_requests {
            return false;
        }
        stamps.push(now);
        true
    }

    /// Requests currently counted against `client`.
    pub fn in_window(&self, client: &str) -> usize {
        self.windows.get(client).map(|stamps| stamps.len()).unwrap_or(0)
    }

    /// Number of clients ever seen.
    pub fn tracked_clients(&self) -> usize {
        self.windows.len()
    }

    pub fn max_requests(&self) -> usize {
        self.max_requests
    }
}

/// `X-Forwarded-For` verbatim when present, else the peer IP.
pub fn client_id(request: &Request<Body>) -> String {
    if let Some(forwarded) = request.headers().get(FORWARDED_FOR) {
        return String::from_utf8_lossy(forwarded.as_bytes()).into_owned();
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

pub async fn rate_limit_middleware(
    State(limiter): State<Arc<RateLimiter>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let client = client_id(&request);

    if limiter.admit(&client, Instant::now()) {
        next.run(request).await
    } else {
        tracing::warn!(
            client = %client,
            limit = limiter.max_requests(),
            path = %request.uri().path(),
            "Rate limit exceeded"
        );
        metrics::record_rejection("rate_limit");
        SiteError::RateLimited { client }.into_response()
    }
}

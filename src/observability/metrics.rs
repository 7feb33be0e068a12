//! Metrics collection and exposition.
//!
//! # Metrics
//! - `site_requests_rejected_total` (counter): by `reason` (rate_limit, csrf)
//! - `site_schedule_submissions_total` (counter): by `outcome`
//! - `site_notifications_failed_total` (counter): by `kind`

use std::net::SocketAddr;

use metrics::counter;
use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus scrape endpoint on `addr`.
/// Must run inside the Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_rejection(reason: &'static str) {
    counter!("site_requests_rejected_total", "reason" => reason).increment(1);
}

pub fn record_submission(outcome: &'static str) {
    counter!("site_schedule_submissions_total", "outcome" => outcome).increment(1);
}

pub fn record_notification_failure(kind: &'static str) {
    counter!("site_notifications_failed_total", "kind" => kind).increment(1);
}

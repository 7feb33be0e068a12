//! Booking notifications.
//!
//! # Data Flow
//! ```text
//! CleanedSchedule (after a successful submission)
//!     → dispatch() spawns a task; the HTTP response does not wait
//!     → Notifier::send_confirmation (applicant)
//!     → Notifier::notify_admin (studio inbox)
//!     → failures logged and counted, never returned to the client
//! ```

pub mod email;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::task::JoinHandle;

use crate::observability::metrics;
use crate::validation::CleanedSchedule;

pub use email::EmailNotifier;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Template error: {0}")]
    Template(#[from] tera::Error),

    #[error("Invalid address '{0}'")]
    Address(String),

    #[error("Message build error: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

/// Outbound side of a booking.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Tell the applicant their trial class is booked.
    async fn send_confirmation(&self, booking: &CleanedSchedule) -> Result<(), NotifyError>;

    /// Forward the booking to the studio.
    async fn notify_admin(&self, booking: &CleanedSchedule) -> Result<(), NotifyError>;
}

/// Fire-and-forget both notifications for `booking`.
pub fn dispatch(notifier: Arc<dyn Notifier>, booking: CleanedSchedule) -> JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(e) = notifier.send_confirmation(&booking).await {
            tracing::error!(to = %booking.email, error = %e, "Failed to send confirmation email");
            metrics::record_notification_failure("confirmation");
        }
        if let Err(e) = notifier.notify_admin(&booking).await {
            tracing::error!(error = %e, "Failed to notify admin of new booking");
            metrics::record_notification_failure("admin");
        }
    })
}

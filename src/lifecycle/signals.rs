//! OS signal handling.

use tokio::task::JoinHandle;

use super::Shutdown;

/// Trigger `shutdown` on the first Ctrl+C.
pub fn shutdown_on_ctrl_c(shutdown: Shutdown) -> JoinHandle<()> {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("Ctrl+C received, shutting down");
                shutdown.trigger();
            }
            Err(e) => tracing::error!(error = %e, "Failed to install Ctrl+C handler"),
        }
    })
}

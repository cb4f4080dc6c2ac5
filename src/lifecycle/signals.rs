//! OS signal handling.

use super::Shutdown;

/// Trigger `shutdown` on the first Ctrl+C (SIGINT).
pub async fn trigger_on_ctrl_c(shutdown: Shutdown) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Shutdown signal received");
            shutdown.trigger();
        }
        Err(e) => tracing::error!(error = %e, "Failed to install Ctrl+C handler"),
    }
}

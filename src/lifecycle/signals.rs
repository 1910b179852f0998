//! OS signal handling.
//!
//! Ctrl-C (SIGINT) cancels the run through the shared [`Shutdown`]. A
//! transfer already broadcast may still land; the pipeline reports
//! `Cancelled` rather than waiting on it.

use crate::lifecycle::Shutdown;

/// Spawn a task that triggers `shutdown` on Ctrl-C.
pub fn cancel_on_ctrl_c(shutdown: Shutdown) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::warn!("Interrupt received, cancelling transfer");
                shutdown.trigger();
            }
            Err(e) => tracing::error!(error = %e, "Failed to listen for Ctrl-C"),
        }
    })
}

//! HTTP interface
//!
//! - `POST /batch/step` runs one step of a batch job
//! - `POST /batch/token` issues an anti-forgery token for an action
//! - `GET /batch/download/{handle}` serves a finalized export once
//! - `GET /health` reports liveness

pub mod error;
pub mod handlers;
pub mod router;

pub use error::ApiError;
pub use router::router;

use crate::core::export::BatchOrchestrator;
use crate::domain::{HelpdeskError, Result};
use std::sync::Arc;
use tokio::sync::watch;

/// Shared state for all handlers
pub struct AppState {
    /// Step runner
    pub orchestrator: BatchOrchestrator,

    /// Name of the record store backend, reported by `/health`
    pub store_backend: &'static str,
}

impl AppState {
    /// Wraps an orchestrator
    pub fn new(orchestrator: BatchOrchestrator, store_backend: &'static str) -> Self {
        Self {
            orchestrator,
            store_backend,
        }
    }
}

/// Serve the API on `address` until `shutdown` turns true
///
/// In-flight requests are allowed to finish before this returns.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails.
pub async fn serve(
    address: &str,
    state: Arc<AppState>,
    mut shutdown: watch::Receiver<bool>,
) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|e| HelpdeskError::Io(format!("Failed to bind {address}: {e}")))?;

    tracing::info!(address = %address, "HTTP server listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move {
            let _ = shutdown.wait_for(|stop| *stop).await;
            tracing::info!("HTTP server shutting down");
        })
        .await
        .map_err(|e| HelpdeskError::Io(format!("HTTP server error: {e}")))?;

    Ok(())
}

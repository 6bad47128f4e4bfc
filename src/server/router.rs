//! Route table

use crate::server::handlers;
use crate::server::AppState;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;

/// Build the HTTP router
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/batch/step", post(handlers::batch_step))
        .route("/batch/token", post(handlers::issue_token))
        .route("/batch/download/{handle}", get(handlers::download))
        .with_state(state)
}

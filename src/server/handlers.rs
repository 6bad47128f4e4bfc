//! HTTP handlers

use crate::core::export::{StepRequest, StepResponse};
use crate::domain::{HelpdeskError, JobType};
use crate::server::error::ApiError;
use crate::server::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Body of `POST /batch/token`
#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    /// Operation the token is for (`batch-export` or `batch-import`)
    pub action: String,
}

/// Response of `POST /batch/token`
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    /// Signed token
    pub token: String,
}

/// `POST /batch/step`
///
/// Always answers 200 with a step response body, including for malformed
/// requests, so the polling client has a single shape to handle.
pub async fn batch_step(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<StepRequest>, JsonRejection>,
) -> Json<StepResponse> {
    match payload {
        Ok(Json(request)) => Json(state.orchestrator.handle(request).await),
        Err(rejection) => {
            tracing::debug!(error = %rejection.body_text(), "Malformed step request");
            Json(StepResponse::error(format!(
                "Invalid batch request: {}",
                rejection.body_text()
            )))
        }
    }
}

/// `POST /batch/token`
pub async fn issue_token(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TokenRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let known = JobType::all()
        .iter()
        .any(|job_type| job_type.action() == request.action);
    if !known {
        return Err(ApiError(HelpdeskError::Validation(format!(
            "unknown action '{}'",
            request.action
        ))));
    }

    let token = state.orchestrator.tokens().issue(&request.action)?;
    Ok(Json(TokenResponse { token }))
}

/// `GET /batch/download/{handle}`
///
/// Serves a finalized artifact once; the file is deleted as it is read.
pub async fn download(
    State(state): State<Arc<AppState>>,
    Path(handle): Path<String>,
) -> Result<Response, ApiError> {
    match state.orchestrator.take_download(&handle).await? {
        Some(download) => Ok((
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", download.file_name),
                ),
            ],
            download.content,
        )
            .into_response()),
        None => Ok((
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({
                "error": true,
                "message": "Export file not found or already downloaded",
            })),
        )
            .into_response()),
    }
}

/// `GET /health`
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "store": state.store_backend,
    }))
}

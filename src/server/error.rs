//! HTTP error responses
//!
//! Step requests never use this: their failures are part of the step
//! response body. Token and download endpoints map errors to a status code
//! and a `{ error: true, message }` body.

use crate::domain::{BatchError, HelpdeskError};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

/// Error wrapper for the token and download endpoints
#[derive(Debug)]
pub struct ApiError(pub HelpdeskError);

impl From<HelpdeskError> for ApiError {
    fn from(value: HelpdeskError) -> Self {
        Self(value)
    }
}

impl From<BatchError> for ApiError {
    fn from(value: BatchError) -> Self {
        Self(HelpdeskError::Batch(value))
    }
}

impl ApiError {
    /// Status code for the wrapped error
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            HelpdeskError::Batch(BatchError::AuthorizationFailed) => StatusCode::FORBIDDEN,
            HelpdeskError::Batch(BatchError::JobNotStarted) => StatusCode::NOT_FOUND,
            HelpdeskError::Batch(_) | HelpdeskError::Validation(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "Request failed");
        }

        (
            status,
            Json(serde_json::json!({
                "error": true,
                "message": self.0.client_message(),
            })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::from(BatchError::AuthorizationFailed).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::from(HelpdeskError::Validation("bad".to_string())).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(HelpdeskError::Io("disk".to_string())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}

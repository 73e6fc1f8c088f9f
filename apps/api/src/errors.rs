use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Every error path serializes as `{"error": "<message>"}` — the same shape
/// clients receive on success (`{"content": ...}` etc.), with CORS headers
/// applied by the router layer on both paths.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error("An optimization is already in progress")]
    SubmissionPending,

    #[error("No optimized resume is available yet")]
    NoOptimizedResume,

    #[error("Rewrite error: {0}")]
    Rewrite(String),

    #[error("Render error: {0}")]
    Render(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Fixed client-facing message for rewrite failures. The real cause is logged
/// server-side only; nothing from the provider response reaches the client.
pub const REWRITE_FAILURE_MESSAGE: &str = "Failed to process resume. Please try again.";

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Extraction(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg.clone()),
            AppError::SubmissionPending => (StatusCode::CONFLICT, self.to_string()),
            AppError::NoOptimizedResume => (StatusCode::CONFLICT, self.to_string()),
            AppError::Rewrite(msg) => {
                tracing::error!("Rewrite error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    REWRITE_FAILURE_MESSAGE.to_string(),
                )
            }
            AppError::Render(msg) => {
                tracing::error!("Render error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to generate the PDF document".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({ "error": message }));

        (status, body).into_response()
    }
}

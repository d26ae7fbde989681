//! API error types with HTTP status code mapping.
//!
//! [`ApiError`] is the error type of every HTTP endpoint. It implements
//! `axum::response::IntoResponse`, producing a structured JSON body with the
//! matching status code.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use scritti_store::StoreError;

/// Structured error detail in API responses.
#[derive(Debug, Clone, Serialize)]
pub struct ApiErrorDetail {
    /// Machine-readable error code (e.g., "NOT_FOUND", "BAD_REQUEST").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The asset does not exist (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Malformed kind or name (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The asset source does not parse (422).
    #[error("unprocessable: {0}")]
    UnprocessableEntity(String),

    /// Internal server error (500).
    #[error("internal error: {0}")]
    InternalError(String),
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::UnprocessableEntity(_) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "UNPROCESSABLE_ENTITY")
            }
            ApiError::InternalError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let message = match &self {
            ApiError::NotFound(msg)
            | ApiError::BadRequest(msg)
            | ApiError::UnprocessableEntity(msg)
            | ApiError::InternalError(msg) => msg.clone(),
        };

        let body = serde_json::json!({
            "success": false,
            "error": ApiErrorDetail {
                code: code.to_string(),
                message,
            },
        });

        (status, axum::Json(body)).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match &err {
            StoreError::NotFound(_) => ApiError::NotFound(err.to_string()),
            StoreError::InvalidKey { .. } => ApiError::BadRequest(err.to_string()),
            StoreError::Parse { .. } => ApiError::UnprocessableEntity(err.to_string()),
            StoreError::Storage { .. } | StoreError::Closed => {
                ApiError::InternalError(err.to_string())
            }
        }
    }
}

impl From<scritti_core::CoreError> for ApiError {
    fn from(err: scritti_core::CoreError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

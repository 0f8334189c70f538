//! HTTP error mapping.
//!
//! Every failure leaves the service as `{"detail": "..."}` with a status that
//! tells the caller whether retrying with a different upload can help.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use intake_core::CoreError;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Extension outside the supported set
    #[error("Unsupported file type")]
    UnsupportedType,

    /// Malformed multipart body or no `file` field
    #[error("{0}")]
    InvalidUpload(String),

    #[error("upload exceeds the size limit")]
    TooLarge,

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::UnsupportedType => StatusCode::BAD_REQUEST,
            ApiError::InvalidUpload(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::TooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(e: CoreError) -> Self {
        if e.is_client_error() {
            ApiError::UnsupportedType
        } else {
            ApiError::Internal(e.to_string())
        }
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(e: tokio::task::JoinError) -> Self {
        ApiError::Internal(format!("worker failed: {}", e))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            log::error!("[Api] {}: {}", status, self);
        } else {
            log::warn!("[Api] {}: {}", status, self);
        }
        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::error;

use service::errors::ServiceError;

/// API-facing error: a status plus a machine-readable kind and a
/// human-readable message, rendered as `{"error": {"kind", "message"}}`.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct ApiError {
    pub status: StatusCode,
    pub kind: &'static str,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, kind: &'static str, message: impl Into<String>) -> Self {
        Self { status, kind, message: message.into() }
    }

    pub fn csrf_invalid() -> Self {
        Self::new(StatusCode::FORBIDDEN, "csrf_invalid", "missing or invalid anti-forgery token")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(kind = self.kind, message = %self.message, "request failed");
        }
        let body = Json(serde_json::json!({
            "error": { "kind": self.kind, "message": self.message }
        }));
        (self.status, body).into_response()
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Validation(msg) => Self::new(StatusCode::BAD_REQUEST, "validation_error", msg),
            ServiceError::Model(e) => Self::new(StatusCode::BAD_REQUEST, "validation_error", e.to_string()),
            ServiceError::NotFound(msg) => Self::new(StatusCode::NOT_FOUND, "not_found", msg),
            // stored bytes did not decode: server-side data problem, not a client mistake
            e @ ServiceError::Decode { .. } => {
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "document_corrupt", e.to_string())
            }
            ServiceError::StorageRead(msg) => Self::new(StatusCode::BAD_GATEWAY, "storage_read_failed", msg),
            ServiceError::StorageWrite(msg) => Self::new(StatusCode::BAD_GATEWAY, "storage_write_failed", msg),
            ServiceError::Conflict(msg) => {
                Self::new(StatusCode::SERVICE_UNAVAILABLE, "concurrent_modification", msg)
            }
        }
    }
}

//! HTTP error mapping
//!
//! Every failure leaves the API as `{"detail": "<message>"}`.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use hainco_core::{CodecError, Error as CoreError};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("{0}")]
    Payload(#[from] JsonRejection),
}

impl ApiError {
    /// Status code and client-facing detail
    fn status_and_detail(&self) -> (StatusCode, String) {
        match self {
            ApiError::Core(err) => match err {
                CoreError::NotFound(detail) => (StatusCode::NOT_FOUND, detail.clone()),
                CoreError::Conflict(detail) => (StatusCode::FORBIDDEN, detail.clone()),
                CoreError::Validation(detail) => (StatusCode::UNPROCESSABLE_ENTITY, detail.clone()),
                CoreError::Credential(e @ CodecError::Encoding { .. }) => {
                    (StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
                }
                CoreError::Credential(CodecError::Decoding(_)) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Stored credential could not be recovered".to_string(),
                ),
                CoreError::Database(_) => (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Failed to connect to database".to_string(),
                ),
                CoreError::Config(_) | CoreError::Io(_) | CoreError::Json(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                ),
            },
            ApiError::Payload(rejection) => (rejection.status(), rejection.body_text()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = self.status_and_detail();

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), "request failed: {}", self);
        } else {
            tracing::debug!(status = status.as_u16(), "request rejected: {}", detail);
        }

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

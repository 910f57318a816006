//! HTTP error mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use tracing::error;

use geoclass_core::ClassifyError;

/// Errors a gateway handler can return.
#[derive(Debug)]
pub enum ApiError {
    /// Rejected upload; the message is shown to the client as is.
    BadRequest(String),
    /// A defect inside the service; details are included for debugging.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
            }
            ApiError::Internal(details) => {
                error!(details = %details, "Classification failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Classification failed", "details": details })),
                )
                    .into_response()
            }
        }
    }
}

impl From<ClassifyError> for ApiError {
    fn from(err: ClassifyError) -> Self {
        match err {
            ClassifyError::InvalidInput(message) => ApiError::BadRequest(message),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

//! API error types and responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use lendstats_core::AnalyticsError;

/// API error type.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// A required event field is absent or blank.
    #[error("missing parameter: {0}")]
    MissingParameter(String),

    /// Bad request - malformed input.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// JSON error response body.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: String,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            Self::MissingParameter(msg) => (StatusCode::BAD_REQUEST, "missing_parameter", msg),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            Self::Internal(msg) => {
                tracing::error!(error = %msg, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<AnalyticsError> for ApiError {
    fn from(err: AnalyticsError) -> Self {
        match err {
            AnalyticsError::MissingParameter(msg) => Self::MissingParameter(msg),
            AnalyticsError::StoreUnavailable(_)
            | AnalyticsError::SchedulerJobFailure { .. }
            | AnalyticsError::Configuration(_) => Self::Internal(err.to_string()),
        }
    }
}

impl From<lendstats_store::StoreError> for ApiError {
    fn from(err: lendstats_store::StoreError) -> Self {
        Self::Internal(err.to_string())
    }
}

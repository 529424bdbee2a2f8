//! Error codes and the JSON error envelope.
//!
//! Every failure that reaches an HTTP client is rendered as `{ "error": "..." }`
//! with a status chosen by the route layer. Codes are for logs, not the wire.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;

// =============================================================================
// ERROR CODES
// =============================================================================

/// Grepable error code and retryable flag attached to log lines.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}

// =============================================================================
// RESPONSE ENVELOPE
// =============================================================================

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// An HTTP status paired with a message for the `{ error }` body.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, message: message.into() }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody { error: self.message })).into_response()
    }
}

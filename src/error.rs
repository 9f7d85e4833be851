//! API error taxonomy.
//!
//! # Responsibilities
//! - Map errors to HTTP status codes and stable error codes
//! - Render JSON error bodies, with field-level detail for validation failures
//!
//! # Design Decisions
//! - Validation errors are rejected at the boundary; they never reach the
//!   policy or the stats tracker
//! - Error bodies use a single `{error: {...}}` envelope

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

/// A single failed field check, reported back to the caller.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Errors surfaced by the control endpoints.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("descriptor validation failed")]
    Validation(Vec<FieldError>),

    #[error("missing or invalid API key")]
    Unauthorized,

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "VALIDATION_FAILED",
            ApiError::Unauthorized => "UNAUTHORIZED",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let mut body = json!({
            "error": {
                "code": self.error_code(),
                "message": self.to_string(),
                "status": status.as_u16(),
            }
        });

        if let ApiError::Validation(ref fields) = self {
            body["error"]["fields"] = json!(fields);
        }

        (status, Json(body)).into_response()
    }
}

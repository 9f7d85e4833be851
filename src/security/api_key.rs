//! API key middleware.
//!
//! Guards the `/proxy` endpoints when a key is configured. Interceptor
//! callbacks send the key in the `x-api-key` header.

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::config::SecurityConfig;
use crate::error::ApiError;

/// Header carrying the API key.
pub const X_API_KEY: &str = "x-api-key";

pub async fn require_api_key(
    State(security): State<SecurityConfig>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let provided = request
        .headers()
        .get(X_API_KEY)
        .and_then(|value| value.to_str().ok());

    match provided {
        Some(key) if key == security.api_key => next.run(request).await,
        _ => {
            tracing::warn!(path = %request.uri().path(), "Rejected request with missing or invalid API key");
            ApiError::Unauthorized.into_response()
        }
    }
}

//! Control endpoints for the interceptor callbacks.
//!
//! # Responsibilities
//! - Validate descriptor bodies at the boundary
//! - Drive the stats tracker and the mutation policy
//! - Serve and reset the aggregate statistics
//!
//! # Design Decisions
//! - Side effects are confined to the stats tracker; handlers do no I/O
//! - Invalid descriptors are rejected with field detail before any state
//!   changes

use std::time::Instant;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::proxy::policy;
use crate::proxy::schemas::{ModificationSet, RequestDescriptor, ResponseDescriptor};
use crate::proxy::stats::ProxyStats;

/// Build the `/proxy` sub-router.
pub fn proxy_router(state: AppState) -> Router {
    Router::new()
        .route("/proxy/process-request", post(process_request))
        .route("/proxy/process-response", post(process_response))
        .route("/proxy/get-proxy-stats", get(get_proxy_stats))
        .route("/proxy/reset-proxy-stats", post(reset_proxy_stats))
        .with_state(state)
}

async fn process_request(
    State(state): State<AppState>,
    Json(descriptor): Json<RequestDescriptor>,
) -> Result<Json<ModificationSet>, ApiError> {
    let start = Instant::now();
    if let Err(fields) = descriptor.validate() {
        metrics::record_api_request("process-request", 422, start);
        return Err(ApiError::Validation(fields));
    }

    let snapshot = state.stats.record_request(&descriptor.host, &descriptor.path);
    let modifications = policy::evaluate_request(&descriptor, &snapshot);

    tracing::debug!(
        method = %descriptor.method,
        host = %descriptor.host,
        path = %descriptor.path,
        blocked = modifications.block_request,
        headers_removed = modifications.headers_to_remove.len(),
        "Processed request"
    );
    metrics::record_api_request("process-request", 200, start);

    Ok(Json(modifications))
}

async fn process_response(
    State(state): State<AppState>,
    Json(descriptor): Json<ResponseDescriptor>,
) -> Result<Json<ModificationSet>, ApiError> {
    let start = Instant::now();
    if let Err(fields) = descriptor.validate() {
        metrics::record_api_request("process-response", 422, start);
        return Err(ApiError::Validation(fields));
    }

    let snapshot = state.stats.record_response();
    let modifications = policy::evaluate_response(&descriptor, &snapshot);

    tracing::debug!(
        host = %descriptor.request.host,
        original_status = descriptor.response.status_code,
        "Processed response"
    );
    metrics::record_api_request("process-response", 200, start);

    Ok(Json(modifications))
}

/// Render the aggregate as the wire shape, sets as ordered lists.
fn stats_body(stats: &ProxyStats) -> Value {
    json!({
        "total_requests": stats.total_requests,
        "total_responses": stats.total_responses,
        "unique_hosts": stats.hosts_seen,
        "unique_paths": stats.paths_seen,
        "hosts_count": stats.hosts_seen.len(),
        "paths_count": stats.paths_seen.len(),
    })
}

async fn get_proxy_stats(State(state): State<AppState>) -> Json<Value> {
    let stats = state.stats.snapshot();
    Json(stats_body(&stats))
}

async fn reset_proxy_stats(State(state): State<AppState>) -> Json<Value> {
    let previous = state.stats.reset();
    tracing::info!(
        previous_requests = previous.total_requests,
        previous_responses = previous.total_responses,
        "Proxy stats reset"
    );
    Json(json!({
        "message": "Stats reset successfully",
        "previous_stats": stats_body(&previous),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn test_stats_body_shape() {
        let stats = ProxyStats {
            total_requests: 2,
            total_responses: 1,
            hosts_seen: BTreeSet::from(["b.com".to_string(), "a.com".to_string()]),
            paths_seen: BTreeSet::from(["/x".to_string()]),
        };
        let body = stats_body(&stats);
        assert_eq!(body["total_requests"], 2);
        assert_eq!(body["hosts_count"], 2);
        assert_eq!(body["paths_count"], 1);
        // BTreeSet renders as an ordered list.
        assert_eq!(body["unique_hosts"], json!(["a.com", "b.com"]));
    }
}

//! Header-mutation policy.
//!
//! # Responsibilities
//! - Decide header additions/removals and block decisions for a flow
//! - Stamp identification headers with consistent running totals
//!
//! # Design Decisions
//! - Pure functions over a descriptor plus a stats snapshot; the caller owns
//!   all state transitions
//! - Sensitive-header matching is case-sensitive by contract

use std::collections::BTreeMap;

use chrono::Utc;
use serde_json::{json, Value};

use crate::proxy::schemas::{ModificationSet, RequestDescriptor, ResponseDescriptor};
use crate::proxy::stats::StatsSnapshot;

/// Marker header identifying traffic touched by this control service.
pub const HEADER_PROXY_MARKER: &str = "X-Proxy-Control";
/// Marker value; bumped when the header contract changes.
pub const PROXY_MARKER_VALUE: &str = "v1.0";

pub const HEADER_REQUEST_ID: &str = "X-Request-ID";
pub const HEADER_RESPONSE_ID: &str = "X-Response-ID";
pub const HEADER_PROCESSED_BY: &str = "X-Processed-By";
pub const HEADER_PROCESSED_AT: &str = "X-Processed-At";
pub const HEADER_STATS_TOTAL_REQUESTS: &str = "X-Stats-Total-Requests";
pub const HEADER_STATS_UNIQUE_HOSTS: &str = "X-Stats-Unique-Hosts";
pub const HEADER_STATS_REQUESTS: &str = "X-Proxy-Stats-Requests";
pub const HEADER_STATS_RESPONSES: &str = "X-Proxy-Stats-Responses";
pub const HEADER_STATS_HOSTS: &str = "X-Proxy-Stats-Hosts";
pub const HEADER_STATS_HEADERS_COUNT: &str = "X-Proxy-Stats-Headers-Count";

/// Requests whose path contains this marker are blocked.
const BLOCKED_PATH_MARKER: &str = "/blocked";

/// Header names containing any of these substrings are stripped from the
/// request. Matching is case-sensitive.
const SENSITIVE_MARKERS: [&str; 3] = ["Secret", "Private", "Token"];

/// Responses originating from hosts containing this marker get CORS headers.
const CORS_HOST_MARKER: &str = "httpbin.org";

/// Evaluate an intercepted request against the mutation policy.
pub fn evaluate_request(desc: &RequestDescriptor, stats: &StatsSnapshot) -> ModificationSet {
    let mut modifications = ModificationSet::default();

    modifications.headers_to_add = BTreeMap::from([
        (HEADER_PROXY_MARKER.to_string(), PROXY_MARKER_VALUE.to_string()),
        (
            HEADER_REQUEST_ID.to_string(),
            format!("req-{}", stats.total_requests),
        ),
        (
            HEADER_PROCESSED_BY.to_string(),
            env!("CARGO_PKG_NAME").to_string(),
        ),
        (HEADER_PROCESSED_AT.to_string(), Utc::now().to_rfc3339()),
        (
            HEADER_STATS_TOTAL_REQUESTS.to_string(),
            stats.total_requests.to_string(),
        ),
        (
            HEADER_STATS_UNIQUE_HOSTS.to_string(),
            stats.unique_hosts.to_string(),
        ),
    ]);

    if desc.path.contains(BLOCKED_PATH_MARKER) {
        modifications.block_request = true;
        modifications.block_message = format!("Path {} is blocked by policy", desc.path);
    }

    for name in desc.headers.keys() {
        if SENSITIVE_MARKERS.iter().any(|marker| name.contains(marker)) {
            modifications.headers_to_remove.push(name.clone());
        }
    }

    modifications
}

/// Evaluate an intercepted response against the mutation policy.
pub fn evaluate_response(desc: &ResponseDescriptor, stats: &StatsSnapshot) -> ModificationSet {
    let mut modifications = ModificationSet::default();

    let headers_received = desc.response.headers.len();
    let response_stats: BTreeMap<String, Value> = BTreeMap::from([
        ("total_requests".to_string(), json!(stats.total_requests)),
        ("total_responses".to_string(), json!(stats.total_responses)),
        ("unique_hosts".to_string(), json!(stats.unique_hosts)),
        ("unique_paths".to_string(), json!(stats.unique_paths)),
        ("headers_received".to_string(), json!(headers_received)),
        ("original_status".to_string(), json!(desc.response.status_code)),
    ]);

    modifications.headers_to_add = BTreeMap::from([
        (HEADER_PROXY_MARKER.to_string(), PROXY_MARKER_VALUE.to_string()),
        (
            HEADER_RESPONSE_ID.to_string(),
            format!("resp-{}", stats.total_responses),
        ),
        (
            HEADER_STATS_REQUESTS.to_string(),
            stats.total_requests.to_string(),
        ),
        (
            HEADER_STATS_RESPONSES.to_string(),
            stats.total_responses.to_string(),
        ),
        (HEADER_STATS_HOSTS.to_string(), stats.unique_hosts.to_string()),
        (
            HEADER_STATS_HEADERS_COUNT.to_string(),
            headers_received.to_string(),
        ),
    ]);

    if desc.request.host.contains(CORS_HOST_MARKER) {
        modifications
            .headers_to_add
            .insert("Access-Control-Allow-Origin".to_string(), "*".to_string());
        modifications.headers_to_add.insert(
            "Access-Control-Allow-Methods".to_string(),
            "GET, POST, OPTIONS".to_string(),
        );
    }

    modifications.include_stats = true;
    modifications.stats = response_stats;

    modifications
}

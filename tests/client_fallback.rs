//! Fallback behavior of the interceptor callback client.
//!
//! The hard requirement under test: the proxy path never fails because the
//! control service is down or misbehaving.

use std::collections::BTreeMap;
use std::time::Duration;

use url::Url;

use proxy_control::config::ControlConfig;
use proxy_control::interceptor::client::{
    ControlUnavailable, HEADER_PROXY_FALLBACK, HEADER_PROXY_STATUS, STATUS_CONNECTED,
    STATUS_UNAVAILABLE,
};
use proxy_control::interceptor::ControlClient;
use proxy_control::proxy::{RequestDescriptor, ResponseDescriptor};
use proxy_control::proxy::schemas::{RequestSummary, ResponseSummary};

mod common;

fn request_descriptor() -> RequestDescriptor {
    RequestDescriptor {
        method: "GET".to_string(),
        host: "example.com".to_string(),
        path: "/".to_string(),
        headers: BTreeMap::new(),
        stats: BTreeMap::new(),
    }
}

fn response_descriptor() -> ResponseDescriptor {
    ResponseDescriptor {
        request: RequestSummary {
            method: "GET".to_string(),
            host: "example.com".to_string(),
            path: "/".to_string(),
        },
        response: ResponseSummary {
            status_code: 200,
            headers: BTreeMap::new(),
        },
        stats: BTreeMap::new(),
    }
}

#[tokio::test]
async fn test_connection_refused_falls_back() {
    // An ephemeral port that was bound and released; nothing listens there.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = ControlClient::with_timeout(
        Url::parse(&format!("http://{}/", addr)).unwrap(),
        None,
        Duration::from_millis(200),
    )
    .unwrap();

    let err = client.process_request(&request_descriptor()).await.unwrap_err();
    assert!(matches!(
        err,
        ControlUnavailable::Transport(_) | ControlUnavailable::Timeout
    ));

    let m = client.process_request_or_fallback(&request_descriptor()).await;
    assert_eq!(m.headers_to_add[HEADER_PROXY_STATUS], STATUS_UNAVAILABLE);
    assert_eq!(m.headers_to_add[HEADER_PROXY_FALLBACK], "true");
    assert!(!m.block_request);
    assert!(m.headers_to_remove.is_empty());
}

#[tokio::test]
async fn test_non_success_status_falls_back() {
    let addr = common::start_raw_backend("500 Internal Server Error", "{}").await;
    let client = ControlClient::with_timeout(
        Url::parse(&format!("http://{}/", addr)).unwrap(),
        None,
        Duration::from_millis(500),
    )
    .unwrap();

    let err = client.process_request(&request_descriptor()).await.unwrap_err();
    assert!(matches!(err, ControlUnavailable::Status(500)));

    let m = client.process_request_or_fallback(&request_descriptor()).await;
    assert_eq!(m.headers_to_add[HEADER_PROXY_FALLBACK], "true");
}

#[tokio::test]
async fn test_malformed_body_falls_back() {
    let addr = common::start_raw_backend("200 OK", "this is not json").await;
    let client = ControlClient::with_timeout(
        Url::parse(&format!("http://{}/", addr)).unwrap(),
        None,
        Duration::from_millis(500),
    )
    .unwrap();

    let err = client.process_response(&response_descriptor()).await.unwrap_err();
    assert!(matches!(err, ControlUnavailable::MalformedBody));

    let m = client.process_response_or_fallback(&response_descriptor()).await;
    assert_eq!(m.headers_to_add[HEADER_PROXY_STATUS], STATUS_UNAVAILABLE);
}

#[tokio::test]
async fn test_live_service_marks_connected() {
    let (addr, _shutdown) = common::spawn_control_service(ControlConfig::default()).await;
    let client = ControlClient::new(
        Url::parse(&format!("http://{}/", addr)).unwrap(),
        None,
    )
    .unwrap();

    let m = client.process_request_or_fallback(&request_descriptor()).await;
    assert_eq!(m.headers_to_add[HEADER_PROXY_STATUS], STATUS_CONNECTED);
    assert!(!m.headers_to_add.contains_key(HEADER_PROXY_FALLBACK));
    assert_eq!(m.headers_to_add["X-Request-ID"], "req-1");

    let m = client.process_response_or_fallback(&response_descriptor()).await;
    assert_eq!(m.headers_to_add["X-Response-ID"], "resp-1");
}

#[tokio::test]
async fn test_client_sends_api_key() {
    let mut config = ControlConfig::default();
    config.security.api_key_enabled = true;
    config.security.api_key = "interceptor-key".to_string();
    let (addr, _shutdown) = common::spawn_control_service(config).await;

    let base = Url::parse(&format!("http://{}/", addr)).unwrap();

    // Without the key the call is typed unavailable (401) and falls back.
    let anonymous = ControlClient::new(base.clone(), None).unwrap();
    let err = anonymous.process_request(&request_descriptor()).await.unwrap_err();
    assert!(matches!(err, ControlUnavailable::Status(401)));

    // With the key the call goes through.
    let keyed = ControlClient::new(base, Some("interceptor-key".to_string())).unwrap();
    let m = keyed.process_request(&request_descriptor()).await.unwrap();
    assert_eq!(m.headers_to_add["X-Proxy-Control"], "v1.0");

    let stats = keyed.get_stats().await.unwrap();
    assert_eq!(stats["total_requests"], 1);
}

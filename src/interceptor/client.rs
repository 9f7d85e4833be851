//! Interceptor callback client.
//!
//! # Responsibilities
//! - Call the control service from inside the proxy's request/response hooks
//! - Keep the call on a short leash (fixed timeout)
//! - Fall back to a local no-op `ModificationSet` on any failure
//!
//! # Design Decisions
//! - Unavailability is a typed result, not a swallowed exception; the
//!   documented no-op fallback is the only sanctioned outcome
//! - The proxy path must never fail because the control service is down

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use url::Url;

use crate::proxy::schemas::{ModificationSet, RequestDescriptor, ResponseDescriptor};
use crate::security::X_API_KEY;

/// Fixed callback timeout. Anything slower than this must not hold up live
/// proxied traffic.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(500);

/// Header stamped on flows to report whether the control service answered.
pub const HEADER_PROXY_STATUS: &str = "X-Proxy-Status";
/// Header stamped on flows handled with the local fallback.
pub const HEADER_PROXY_FALLBACK: &str = "X-Proxy-Fallback";

pub const STATUS_CONNECTED: &str = "control-connected";
pub const STATUS_UNAVAILABLE: &str = "control-unavailable";

/// Why a control call did not produce a usable `ModificationSet`.
#[derive(Error, Debug)]
pub enum ControlUnavailable {
    #[error("control service timed out")]
    Timeout,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("control service answered with status {0}")]
    Status(u16),

    #[error("control service answered with a malformed body")]
    MalformedBody,
}

/// HTTP client for the control protocol.
pub struct ControlClient {
    http: reqwest::Client,
    base_url: Url,
    api_key: Option<String>,
}

impl ControlClient {
    /// Build a client with the fixed default timeout.
    pub fn new(base_url: Url, api_key: Option<String>) -> Result<Self, reqwest::Error> {
        Self::with_timeout(base_url, api_key, DEFAULT_TIMEOUT)
    }

    /// Build a client with an explicit timeout (tests use shorter ones).
    pub fn with_timeout(
        base_url: Url,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .no_proxy()
            .build()?;
        Ok(Self {
            http,
            base_url,
            api_key,
        })
    }

    /// Ask the control service how to mutate an intercepted request.
    pub async fn process_request(
        &self,
        descriptor: &RequestDescriptor,
    ) -> Result<ModificationSet, ControlUnavailable> {
        self.post_json("proxy/process-request", descriptor).await
    }

    /// Ask the control service how to mutate an intercepted response.
    pub async fn process_response(
        &self,
        descriptor: &ResponseDescriptor,
    ) -> Result<ModificationSet, ControlUnavailable> {
        self.post_json("proxy/process-response", descriptor).await
    }

    /// `process_request` with the sanctioned fallback applied on failure.
    pub async fn process_request_or_fallback(
        &self,
        descriptor: &RequestDescriptor,
    ) -> ModificationSet {
        match self.process_request(descriptor).await {
            Ok(modifications) => connected(modifications),
            Err(e) => {
                tracing::warn!(error = %e, "Falling back to local request modifications");
                Self::fallback()
            }
        }
    }

    /// `process_response` with the sanctioned fallback applied on failure.
    pub async fn process_response_or_fallback(
        &self,
        descriptor: &ResponseDescriptor,
    ) -> ModificationSet {
        match self.process_response(descriptor).await {
            Ok(modifications) => connected(modifications),
            Err(e) => {
                tracing::warn!(error = %e, "Falling back to local response modifications");
                Self::fallback()
            }
        }
    }

    /// Fetch the current proxy statistics.
    pub async fn get_stats(&self) -> Result<serde_json::Value, ControlUnavailable> {
        let url = self.endpoint("proxy/get-proxy-stats");
        let request = self.with_key(self.http.get(url));
        let response = request.send().await.map_err(map_reqwest_error)?;
        decode(response).await
    }

    /// Reset the proxy statistics, returning `{message, previous_stats}`.
    pub async fn reset_stats(&self) -> Result<serde_json::Value, ControlUnavailable> {
        let url = self.endpoint("proxy/reset-proxy-stats");
        let request = self.with_key(self.http.post(url));
        let response = request.send().await.map_err(map_reqwest_error)?;
        decode(response).await
    }

    /// Fetch the service status from `/info/status`.
    pub async fn get_status(&self) -> Result<serde_json::Value, ControlUnavailable> {
        let url = self.endpoint("info/status");
        let response = self.http.get(url).send().await.map_err(map_reqwest_error)?;
        decode(response).await
    }

    /// The local no-op `ModificationSet`: only the fallback marker headers,
    /// nothing blocked, nothing removed.
    pub fn fallback() -> ModificationSet {
        let mut modifications = ModificationSet::default();
        modifications
            .headers_to_add
            .insert(HEADER_PROXY_STATUS.to_string(), STATUS_UNAVAILABLE.to_string());
        modifications
            .headers_to_add
            .insert(HEADER_PROXY_FALLBACK.to_string(), "true".to_string());
        modifications
    }

    async fn post_json<B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<ModificationSet, ControlUnavailable> {
        let url = self.endpoint(path);
        let request = self.with_key(self.http.post(url)).json(body);
        let response = request.send().await.map_err(map_reqwest_error)?;
        decode(response).await
    }

    fn endpoint(&self, path: &str) -> Url {
        // Invalid joins cannot happen for the fixed paths used here; fall
        // back to the base URL rather than panicking.
        self.base_url
            .join(path)
            .unwrap_or_else(|_| self.base_url.clone())
    }

    fn with_key(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => builder.header(X_API_KEY, key),
            None => builder,
        }
    }
}

fn connected(mut modifications: ModificationSet) -> ModificationSet {
    modifications
        .headers_to_add
        .entry(HEADER_PROXY_STATUS.to_string())
        .or_insert_with(|| STATUS_CONNECTED.to_string());
    modifications
}

fn map_reqwest_error(e: reqwest::Error) -> ControlUnavailable {
    if e.is_timeout() {
        ControlUnavailable::Timeout
    } else {
        ControlUnavailable::Transport(e.to_string())
    }
}

async fn decode<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ControlUnavailable> {
    let status = response.status();
    if !status.is_success() {
        return Err(ControlUnavailable::Status(status.as_u16()));
    }
    response
        .json::<T>()
        .await
        .map_err(|_| ControlUnavailable::MalformedBody)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_adds_marker_headers_only() {
        let m = ControlClient::fallback();
        assert_eq!(m.headers_to_add[HEADER_PROXY_STATUS], STATUS_UNAVAILABLE);
        assert_eq!(m.headers_to_add[HEADER_PROXY_FALLBACK], "true");
        assert_eq!(m.headers_to_add.len(), 2);
        assert!(!m.block_request);
        assert!(m.headers_to_remove.is_empty());
    }

    #[test]
    fn test_endpoint_join() {
        let client = ControlClient::new(
            Url::parse("http://127.0.0.1:10016/").unwrap(),
            None,
        )
        .unwrap();
        assert_eq!(
            client.endpoint("proxy/process-request").as_str(),
            "http://127.0.0.1:10016/proxy/process-request"
        );
    }
}

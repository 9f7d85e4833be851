//! Request identification middleware.
//!
//! # Responsibilities
//! - Stamp `x-request-id` (UUID v4) on every inbound request
//! - Preserve an id the caller already supplied
//!
//! # Design Decisions
//! - The id is added as early as possible so every log line can carry it

use axum::body::Body;
use axum::http::{HeaderValue, Request};
use tower::{Layer, Service};
use uuid::Uuid;

/// Header carrying the per-request correlation id.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Tower layer that stamps `x-request-id` on inbound requests.
#[derive(Clone, Copy, Debug, Default)]
pub struct RequestIdLayer;

impl<S> Layer<S> for RequestIdLayer {
    type Service = RequestIdService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestIdService { inner }
    }
}

/// Service wrapper produced by [`RequestIdLayer`].
#[derive(Clone, Debug)]
pub struct RequestIdService<S> {
    inner: S,
}

impl<S> Service<Request<Body>> for RequestIdService<S>
where
    S: Service<Request<Body>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        if !req.headers().contains_key(X_REQUEST_ID) {
            let id = Uuid::new_v4().to_string();
            if let Ok(value) = HeaderValue::from_str(&id) {
                req.headers_mut().insert(X_REQUEST_ID, value);
            }
        }
        self.inner.call(req)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;
    use tower::{service_fn, ServiceExt};

    /// Echo service: hands the (possibly stamped) request back out.
    fn echo() -> impl Service<Request<Body>, Response = Request<Body>, Error = Infallible> {
        RequestIdLayer.layer(service_fn(|req: Request<Body>| async move {
            Ok::<_, Infallible>(req)
        }))
    }

    #[tokio::test]
    async fn test_request_id_stamped_before_inner_service() {
        let req = Request::builder().body(Body::empty()).unwrap();
        let seen = echo().oneshot(req).await.unwrap();

        let id = seen.headers().get(X_REQUEST_ID).unwrap().to_str().unwrap();
        assert!(Uuid::parse_str(id).is_ok());
    }

    #[tokio::test]
    async fn test_caller_supplied_request_id_preserved() {
        let req = Request::builder()
            .header(X_REQUEST_ID, "caller-id")
            .body(Body::empty())
            .unwrap();
        let seen = echo().oneshot(req).await.unwrap();

        assert_eq!(seen.headers().get(X_REQUEST_ID).unwrap(), "caller-id");
    }
}

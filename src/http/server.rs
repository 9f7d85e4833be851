//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with the proxy and info handlers
//! - Wire up middleware (tracing, timeout, request ID, API key)
//! - Bind the server to a listener and serve with graceful shutdown
//!
//! # Design Decisions
//! - One `AppState` shared by all handlers; the stats tracker is the only
//!   mutable piece
//! - The `/info` endpoints are never behind the API key guard so health
//!   probes keep working when a key is configured

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{body::Body, http::Request, middleware, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::limit::GlobalConcurrencyLimitLayer;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::ControlConfig;
use crate::http::request::{RequestIdLayer, X_REQUEST_ID};
use crate::info::routes::info_router;
use crate::info::ServiceInfo;
use crate::proxy::routes::proxy_router;
use crate::proxy::StatsTracker;
use crate::security::api_key::require_api_key;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub stats: Arc<StatsTracker>,
    pub info: Arc<ServiceInfo>,
    pub config: Arc<ControlConfig>,
}

impl AppState {
    pub fn new(config: ControlConfig) -> Self {
        Self {
            stats: Arc::new(StatsTracker::new()),
            info: Arc::new(ServiceInfo::new()),
            config: Arc::new(config),
        }
    }
}

/// HTTP server for the proxy control service.
pub struct ControlServer {
    router: Router,
    state: AppState,
}

impl ControlServer {
    /// Create a new server with the given configuration.
    pub fn new(config: ControlConfig) -> Self {
        let state = AppState::new(config);
        let router = Self::build_router(state.clone());
        Self { router, state }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        let mut proxy_routes = proxy_router(state.clone());
        if state.config.security.api_key_enabled {
            proxy_routes = proxy_routes.layer(middleware::from_fn_with_state(
                state.config.security.clone(),
                require_api_key,
            ));
        }

        Router::new()
            .merge(proxy_routes)
            .merge(info_router(state.clone()))
            .layer(TimeoutLayer::new(Duration::from_secs(
                state.config.timeouts.request_secs,
            )))
            .layer(GlobalConcurrencyLimitLayer::new(
                state.config.listener.max_connections,
            ))
            .layer(
                TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                    let request_id = request
                        .headers()
                        .get(X_REQUEST_ID)
                        .and_then(|value| value.to_str().ok())
                        .unwrap_or("unknown");
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = %request_id,
                    )
                }),
            )
            // Outermost so the trace span below it sees the stamped id.
            .layer(RequestIdLayer)
    }

    /// Run the server, accepting connections on the given listener until the
    /// shutdown channel fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            api_key_enabled = self.state.config.security.api_key_enabled,
            "Control service starting"
        );

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("Control service stopped");
        Ok(())
    }
}

//! Service metadata endpoints.
//!
//! # Responsibilities
//! - Liveness (`/info/health`)
//! - Service status and environment (`/info/status`)
//! - Component versions (`/info/versions`)
//! - Server process info (`/info/server`)

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::http::server::AppState;
use crate::info::service::{ServiceEnvironment, POLICY_REVISION, SCHEMA_REVISION, SERVICE_NAME};

#[derive(Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub service: &'static str,
}

#[derive(Serialize)]
pub struct ServiceStatus {
    pub name: &'static str,
    pub version: &'static str,
    pub status: &'static str,
    pub environment: ServiceEnvironment,
}

#[derive(Serialize)]
pub struct ServiceVersions {
    pub proxy_control: &'static str,
    pub policy: &'static str,
    pub schema: &'static str,
}

#[derive(Serialize)]
pub struct ServerInfo {
    pub hostname: String,
    pub pid: u32,
    pub started_at: String,
    pub uptime_secs: i64,
}

/// Build the `/info` sub-router.
pub fn info_router(state: AppState) -> Router {
    Router::new()
        .route("/info/health", get(get_health))
        .route("/info/status", get(get_status))
        .route("/info/versions", get(get_versions))
        .route("/info/server", get(get_server))
        .with_state(state)
}

async fn get_health() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "healthy",
        service: SERVICE_NAME,
    })
}

async fn get_status(State(state): State<AppState>) -> Json<ServiceStatus> {
    Json(ServiceStatus {
        name: SERVICE_NAME,
        version: state.info.version(),
        status: "operational",
        environment: state.info.environment(),
    })
}

async fn get_versions(State(state): State<AppState>) -> Json<ServiceVersions> {
    Json(ServiceVersions {
        proxy_control: state.info.version(),
        policy: POLICY_REVISION,
        schema: SCHEMA_REVISION,
    })
}

async fn get_server(State(state): State<AppState>) -> Json<ServerInfo> {
    Json(ServerInfo {
        hostname: state.info.hostname(),
        pid: std::process::id(),
        started_at: state.info.started_at().to_rfc3339(),
        uptime_secs: state.info.uptime_secs(),
    })
}

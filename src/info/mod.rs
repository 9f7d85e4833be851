//! Service metadata subsystem (`/info/*`).

pub mod routes;
pub mod service;

pub use service::{ServiceEnvironment, ServiceInfo, SERVICE_NAME};

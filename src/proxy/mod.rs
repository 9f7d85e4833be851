//! Proxy control subsystem.
//!
//! # Data Flow
//! ```text
//! interceptor callback (inside the proxy process)
//!     → POST /proxy/process-request | /proxy/process-response
//!     → routes.rs (boundary validation, 422 on bad descriptors)
//!     → stats.rs (record under one lock, snapshot back)
//!     → policy.rs (pure evaluation → ModificationSet)
//!     → JSON response applied by the interceptor
//! ```
//!
//! # Design Decisions
//! - The policy is pure; all mutable state lives in the stats tracker
//! - Descriptors are validated before any counter moves

pub mod policy;
pub mod routes;
pub mod schemas;
pub mod stats;

pub use schemas::{ModificationSet, RequestDescriptor, ResponseDescriptor};
pub use stats::{ProxyStats, StatsSnapshot, StatsTracker};

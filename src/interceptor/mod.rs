//! Interceptor callback side of the control protocol.
//!
//! This is the consumer of the `/proxy` endpoints: it runs inside the proxy
//! process, serializes flow summaries, and applies whatever the control
//! service answers. When the service is unreachable it proceeds with a local
//! no-op fallback rather than blocking live traffic.

pub mod client;

pub use client::{ControlClient, ControlUnavailable, DEFAULT_TIMEOUT};

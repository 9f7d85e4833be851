//! Proxy control service library.
//!
//! A control plane for an interception proxy: interceptor callbacks POST flow
//! summaries to `/proxy/*` and apply the returned header modifications and
//! block decisions; `/info/*` serves service metadata.

pub mod config;
pub mod error;
pub mod http;
pub mod info;
pub mod interceptor;
pub mod lifecycle;
pub mod observability;
pub mod proxy;
pub mod security;

pub use config::ControlConfig;
pub use http::ControlServer;
pub use interceptor::ControlClient;
pub use lifecycle::Shutdown;

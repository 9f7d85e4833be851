//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! handlers produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through all log lines via the tracing layer
//! - Metrics are cheap (atomic increments)

pub mod logging;
pub mod metrics;

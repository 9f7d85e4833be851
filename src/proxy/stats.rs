//! In-memory traffic statistics.
//!
//! # Responsibilities
//! - Count processed requests and responses
//! - Track the distinct hosts and paths observed since the last reset
//! - Hand out consistent snapshots to the policy and the stats endpoints
//!
//! # Design Decisions
//! - One mutex guards the whole aggregate so a counter increment and the set
//!   insertion from the same logical event are observed together
//! - Lock hold time is O(1); no I/O happens under the lock
//! - Sets grow unbounded between resets; callers reset periodically
//! - No persistence: a restart loses all history

use std::collections::BTreeSet;
use std::sync::{Mutex, PoisonError};

use serde::Serialize;

/// Aggregate statistics for the lifetime of the control service.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct ProxyStats {
    pub total_requests: u64,
    pub total_responses: u64,
    pub hosts_seen: BTreeSet<String>,
    pub paths_seen: BTreeSet<String>,
}

/// Counter view taken at a single point in time, used by the policy to emit
/// running totals that are consistent with each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub total_requests: u64,
    pub total_responses: u64,
    pub unique_hosts: usize,
    pub unique_paths: usize,
}

impl From<&ProxyStats> for StatsSnapshot {
    fn from(stats: &ProxyStats) -> Self {
        Self {
            total_requests: stats.total_requests,
            total_responses: stats.total_responses,
            unique_hosts: stats.hosts_seen.len(),
            unique_paths: stats.paths_seen.len(),
        }
    }
}

/// Shared tracker owned by the control server.
#[derive(Debug, Default)]
pub struct StatsTracker {
    inner: Mutex<ProxyStats>,
}

impl StatsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a processed request and return the post-update snapshot.
    ///
    /// Returning the snapshot from the same lock acquisition keeps the
    /// request id and running totals the policy emits mutually consistent.
    pub fn record_request(&self, host: &str, path: &str) -> StatsSnapshot {
        let mut stats = self.lock();
        stats.total_requests += 1;
        if !stats.hosts_seen.contains(host) {
            stats.hosts_seen.insert(host.to_string());
        }
        if !stats.paths_seen.contains(path) {
            stats.paths_seen.insert(path.to_string());
        }
        StatsSnapshot::from(&*stats)
    }

    /// Record a processed response and return the post-update snapshot.
    pub fn record_response(&self) -> StatsSnapshot {
        let mut stats = self.lock();
        stats.total_responses += 1;
        StatsSnapshot::from(&*stats)
    }

    /// Clone of the full aggregate, sets included.
    pub fn snapshot(&self) -> ProxyStats {
        self.lock().clone()
    }

    /// Zero all counters and clear both sets, returning the pre-reset state.
    pub fn reset(&self) -> ProxyStats {
        let mut stats = self.lock();
        std::mem::take(&mut *stats)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ProxyStats> {
        // A poisoned lock only means a panicking thread held it; the
        // aggregate is still structurally valid.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

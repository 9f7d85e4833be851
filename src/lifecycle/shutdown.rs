//! Graceful shutdown signalling.

use tokio::sync::broadcast;

/// Broadcast-backed shutdown handle shared by the server and signal tasks.
///
/// Clones share the underlying channel; every subscriber sees the trigger.
#[derive(Clone, Debug)]
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        Self {
            tx: broadcast::channel(1).0,
        }
    }

    /// New receiver that resolves once shutdown is triggered.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Signal all subscribers to stop. Safe to call more than once.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

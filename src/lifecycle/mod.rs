//! Process lifecycle: startup ordering, signals, graceful shutdown.

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
pub use signals::spawn_signal_listener;

//! Two-peer game session over TCP.
//!
//! A single [`Coordinator`] task owns the game, the current snapshot and both
//! slots. Reader tasks only forward lines; the acceptor task only forwards
//! connections. Everything else observes the session through a
//! [`SessionHandle`] or through broadcast snapshots.

mod coordinator;
mod slot;

pub use coordinator::Coordinator;
pub use slot::SlotState;

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use strictly_tictactoe::Mark;
use tokio::sync::watch;
use tracing::info;

/// Fixed-interval polling bounded by a cycle count.
///
/// Timeouts are counted in cycles, not wall-clock time: `max_cycles`
/// consecutive intervals without qualifying input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_new::new)]
pub struct BoundedPoll {
    interval: Duration,
    max_cycles: u32,
}

impl BoundedPoll {
    /// Pause between two checks.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Checks before giving up.
    pub fn max_cycles(&self) -> u32 {
        self.max_cycles
    }
}

impl Default for BoundedPoll {
    /// One second, ten cycles.
    fn default() -> Self {
        Self::new(Duration::from_secs(1), 10)
    }
}

/// Everything the coordinator needs to start.
#[derive(Debug, Clone, derive_new::new)]
pub struct SessionConfig {
    /// Address to listen on.
    pub bind_addr: SocketAddr,
    /// Idle timeout for the player to move.
    pub idle: BoundedPoll,
    /// Rematch voting window.
    pub voting: BoundedPoll,
}

/// Slot index for a mark: X sits first, O second.
pub(crate) fn slot_index(mark: Mark) -> usize {
    match mark {
        Mark::X => 0,
        Mark::O => 1,
    }
}

/// Cloneable view of a running session.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    local_addr: SocketAddr,
    shutdown: Arc<watch::Sender<bool>>,
    connected: [Arc<AtomicBool>; 2],
}

impl SessionHandle {
    pub(crate) fn new(
        local_addr: SocketAddr,
        shutdown: watch::Sender<bool>,
        connected: [Arc<AtomicBool>; 2],
    ) -> Self {
        Self {
            local_addr,
            shutdown: Arc::new(shutdown),
            connected,
        }
    }

    /// Address the session listens on.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Whether the slot for `mark` currently holds a playing peer.
    pub fn is_connected(&self, mark: Mark) -> bool {
        self.connected[slot_index(mark)].load(Ordering::Acquire)
    }

    /// Asks the coordinator to stop. Idempotent.
    pub fn shutdown(&self) {
        if !self.shutdown.send_replace(true) {
            info!(addr = %self.local_addr, "Shutdown requested");
        }
    }

    /// True once shutdown has been requested.
    pub fn is_shut_down(&self) -> bool {
        *self.shutdown.borrow()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<bool> {
        self.shutdown.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_poll_is_one_second_ten_cycles() {
        let poll = BoundedPoll::default();
        assert_eq!(poll.interval(), Duration::from_secs(1));
        assert_eq!(poll.max_cycles(), 10);
    }

    #[test]
    fn test_handle_shutdown_is_idempotent() {
        let (tx, rx) = watch::channel(false);
        let handle = SessionHandle::new(
            "127.0.0.1:1".parse().unwrap(),
            tx,
            [Arc::new(AtomicBool::new(true)), Arc::new(AtomicBool::new(false))],
        );
        assert!(!handle.is_shut_down());
        handle.shutdown();
        handle.shutdown();
        assert!(handle.is_shut_down());
        assert!(*rx.borrow());
        assert!(handle.is_connected(Mark::X));
        assert!(!handle.is_connected(Mark::O));
    }
}

//! Durable snapshot persistence.

mod error;
mod html;
mod memory;

pub use error::StoreError;
pub use html::HtmlStore;
pub use memory::MemoryStore;

use strictly_tictactoe::Snapshot;

/// Loads and saves the current snapshot.
///
/// The coordinator calls [`load`](SnapshotStore::load) once at startup and
/// [`save`](SnapshotStore::save) after every snapshot change, both on the
/// blocking thread pool, so implementations may do synchronous I/O.
pub trait SnapshotStore: Send + Sync + 'static {
    /// Returns the persisted snapshot, or `None` if nothing was saved yet.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if persisted data exists but cannot be read.
    fn load(&self) -> Result<Option<Snapshot>, StoreError>;

    /// Replaces the persisted snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the snapshot cannot be written.
    fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError>;
}

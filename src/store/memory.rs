//! In-process snapshot store.

use super::{SnapshotStore, StoreError};
use std::sync::{Arc, Mutex, PoisonError};
use strictly_tictactoe::Snapshot;
use tracing::debug;

/// Keeps every saved snapshot in memory. Clones share the same history.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    saved: Arc<Mutex<Vec<Snapshot>>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that already holds `snapshot`.
    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        Self {
            saved: Arc::new(Mutex::new(vec![snapshot])),
        }
    }

    /// Every snapshot saved so far, oldest first.
    pub fn history(&self) -> Vec<Snapshot> {
        self.saved
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The most recently saved snapshot.
    pub fn latest(&self) -> Option<Snapshot> {
        self.history().pop()
    }
}

impl SnapshotStore for MemoryStore {
    fn load(&self) -> Result<Option<Snapshot>, StoreError> {
        let saved = self
            .saved
            .lock()
            .map_err(|_| StoreError::new("snapshot history lock poisoned"))?;
        Ok(saved.last().cloned())
    }

    fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        let mut saved = self
            .saved
            .lock()
            .map_err(|_| StoreError::new("snapshot history lock poisoned"))?;
        saved.push(snapshot.clone());
        debug!(count = saved.len(), "Snapshot stored");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_store_loads_none() {
        let store = MemoryStore::new();
        assert_eq!(store.load().unwrap(), None);
        assert!(store.history().is_empty());
    }

    #[test]
    fn test_clones_share_history() {
        let store = MemoryStore::new();
        let observer = store.clone();
        store.save(&Snapshot::waiting()).unwrap();
        assert_eq!(observer.latest(), Some(Snapshot::waiting()));
        assert_eq!(observer.load().unwrap(), Some(Snapshot::waiting()));
    }
}

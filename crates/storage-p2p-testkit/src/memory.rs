//! In-memory reference adapters.
//!
//! Not a shipped production backend — analogous to the teacher's
//! `rt-test-utils::MockWsServer`, these exist purely so the core crate's
//! own test suite and `fuzz-harness` have something concrete to run
//! against. Both are safe to share across threads: every public method
//! takes `&self` and serializes through an internal mutex, matching the
//! concurrency model in spec.md §5 where many threads may share one
//! storage as long as they don't race the same `(ConnectionID,
//! direction)` pair.

use std::collections::HashMap;
use std::sync::Mutex;

use storage_p2p::{ConnectionID, ConnectionState, StateStore, Storage, StorageError};

/// A shared, in-process blob store.
#[derive(Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<Vec<u8>, Vec<u8>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries currently stored (handy for test assertions).
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Storage for MemoryStorage {
    fn list(&self) -> Result<Vec<Vec<u8>>, StorageError> {
        Ok(self.entries.lock().unwrap().keys().cloned().collect())
    }

    fn read(&self, name: &[u8]) -> Result<Vec<u8>, StorageError> {
        self.entries
            .lock()
            .unwrap()
            .get(name)
            .cloned()
            .ok_or(StorageError::NoSuchEntry)
    }

    fn write(&self, name: &[u8], data: &[u8]) -> Result<(), StorageError> {
        self.entries
            .lock()
            .unwrap()
            .insert(name.to_vec(), data.to_vec());
        Ok(())
    }

    fn delete(&self, name: &[u8]) -> Result<(), StorageError> {
        self.entries.lock().unwrap().remove(name);
        Ok(())
    }
}

/// A shared, in-process connection-counter store.
#[derive(Default)]
pub struct MemoryStateStore {
    states: Mutex<HashMap<ConnectionID, ConnectionState>>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for MemoryStateStore {
    fn list(&self) -> Result<Vec<ConnectionID>, StorageError> {
        Ok(self.states.lock().unwrap().keys().cloned().collect())
    }

    fn load(&self, id: &ConnectionID) -> Result<ConnectionState, StorageError> {
        Ok(self
            .states
            .lock()
            .unwrap()
            .get(id)
            .copied()
            .unwrap_or(ConnectionState::ZERO))
    }

    fn store(&self, id: &ConnectionID, state: Option<ConnectionState>) -> Result<(), StorageError> {
        let mut map = self.states.lock().unwrap();
        match state {
            Some(s) => {
                map.insert(id.clone(), s);
            }
            None => {
                map.remove(id);
            }
        }
        Ok(())
    }
}

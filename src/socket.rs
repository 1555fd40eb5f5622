//! Per-endpoint orchestration facade bundling sender, receiver, and
//! discovery behind one `(state store, storage)` pair.

use std::collections::HashSet;
use std::sync::Arc;

use storage_p2p_wire::{decode, Address, ConnectionID};
use tracing::debug;

use crate::discovery;
use crate::error::{SocketError, StorageError};
use crate::receiver::{Consume, Receiver, View};
use crate::sender::Sender;
use crate::state::StateStore;
use crate::storage::Storage;

/// `destroy` loops list+delete to a fixpoint (no remaining blobs for the
/// pair) rather than a single pass, closing the race spec.md §9 flags
/// between listing and deleting. This caps how many rounds it will race
/// a concurrently-writing peer before giving up.
const DESTROY_MAX_ROUNDS: usize = 8;

/// A per-endpoint facade over one shared `(storage, state)` pair.
///
/// Cheap to construct per call; all state lives in the shared adapters,
/// so a `Socket` itself holds nothing but two `Arc`s.
#[derive(Clone)]
pub struct Socket {
    storage: Arc<dyn Storage>,
    state: Arc<dyn StateStore>,
}

impl Socket {
    pub fn new(storage: Arc<dyn Storage>, state: Arc<dyn StateStore>) -> Self {
        Socket { storage, state }
    }

    fn sender(&self, conn: ConnectionID) -> Sender {
        Sender::new(self.storage.clone(), self.state.clone(), conn)
    }

    fn receiver(&self, conn: ConnectionID) -> Receiver {
        Receiver::new(self.storage.clone(), self.state.clone(), conn)
    }

    /// Union of the state store's own connection list and a fresh scan
    /// of storage for blobs addressed to `local`.
    pub fn discover(&self, local: &Address) -> Result<HashSet<ConnectionID>, StorageError> {
        let mut found = discovery::scan(self.storage.as_ref(), local)?;
        found.extend(
            self.state
                .list()?
                .into_iter()
                .filter(|c| &c.local == local),
        );
        Ok(found)
    }

    pub fn peek(&self, conn: &ConnectionID, nth: u64) -> Result<Option<Vec<u8>>, StorageError> {
        self.receiver(conn.clone()).peek(nth)
    }

    pub fn can_receive(&self, conn: &ConnectionID) -> Result<bool, StorageError> {
        Ok(self.peek(conn, 0)?.is_some())
    }

    pub fn send(&self, conn: &ConnectionID, message: &[u8]) -> Result<(), StorageError> {
        self.sender(conn.clone()).send(message)
    }

    pub fn receive(&self, conn: &ConnectionID) -> Result<Option<Vec<u8>>, StorageError> {
        self.receiver(conn.clone()).receive()
    }

    pub fn gc(&self, conn: &ConnectionID) -> Result<(), StorageError> {
        self.receiver(conn.clone()).gc()
    }

    /// Delete both directions' blobs between `conn.local` and
    /// `conn.remote`, then the local state entry.
    ///
    /// Loops to a fixpoint: each round re-lists storage, deletes every
    /// matching blob it finds, and only clears local state once a round
    /// finds nothing left to delete. If a peer keeps writing faster than
    /// we can drain, this gives up after `DESTROY_MAX_ROUNDS` rounds and
    /// returns an error rather than looping forever or silently leaking
    /// entries.
    pub fn destroy(&self, conn: &ConnectionID) -> Result<(), SocketError> {
        for round in 0..DESTROY_MAX_ROUNDS {
            let names = self.storage.list().map_err(SocketError::Storage)?;
            let mut deleted = 0u64;
            for name in names {
                let header = match decode(&name) {
                    Ok(h) => h,
                    Err(_) => continue,
                };
                let forward = header.sender == conn.local && header.receiver == conn.remote;
                let backward = header.sender == conn.remote && header.receiver == conn.local;
                if forward || backward {
                    self.storage.delete(&name).map_err(SocketError::Storage)?;
                    deleted += 1;
                }
            }
            if deleted == 0 {
                self.state.store(conn, None).map_err(SocketError::Storage)?;
                debug!(rounds = round + 1, "destroy: converged");
                return Ok(());
            }
        }
        Err(SocketError::DestroyDidNotConverge {
            rounds: DESTROY_MAX_ROUNDS,
        })
    }
}

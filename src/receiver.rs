//! Reading, consuming, and garbage-collecting inbound messages.
//!
//! Split into two capabilities, per the teacher-neutral rendering of the
//! source's `Viewer` → `Receiver` inheritance (spec.md §9): [`View`] is
//! read-only (`peek`/`pending`); [`Consume`] extends it with the
//! state-mutating operations (`receive`/`receive_with`/`gc`). [`Viewer`]
//! vends only `View`; [`Receiver`] wraps a `Viewer` and delegates to it
//! explicitly for the read-only half, the same plain field-forwarding the
//! teacher's own wrapper types use rather than a `Deref`-based shortcut.

use std::collections::HashSet;
use std::sync::Arc;

use storage_p2p_wire::{decode, encode, ConnectionID, MessageHeader};
use tracing::{debug, trace, warn};

use crate::error::{ReceiveWithError, StorageError};
use crate::state::{bump_rx, StateStore};
use crate::storage::Storage;

/// Read-only access to the next inbound messages on a connection.
pub trait View {
    /// The message at logical offset `rx + nth`, or `None` if no blob
    /// exists for that header yet. Never mutates state.
    fn peek(&self, nth: u64) -> Result<Option<Vec<u8>>, StorageError>;

    /// The number of contiguous messages ready to be received, i.e. the
    /// smallest `k >= 0` such that the blob at offset `rx + k` is absent.
    fn pending(&self) -> Result<u64, StorageError>;
}

/// Consuming access: advances `rx` and reclaims storage behind it.
pub trait Consume: View {
    /// Fetch and consume the message at `rx`. Returns `Ok(None)` (without
    /// advancing state) if no such entry exists yet; raises on any other
    /// storage failure. On success, opportunistically runs `gc()` and
    /// swallows any error from it — the message is already consumed, and
    /// gc is always safe to retry later.
    fn receive(&self) -> Result<Option<Vec<u8>>, StorageError>;

    /// Like `receive`, but runs `f` on the fetched bytes *before*
    /// advancing `rx`. `rx` only advances if `f` succeeds, so the caller
    /// may retry `f` against the same bytes arbitrarily many times.
    fn receive_with<F, T, E>(&self, f: F) -> Result<Option<T>, ReceiveWithError<E>>
    where
        F: FnOnce(&[u8]) -> Result<T, E>;

    /// Delete every already-consumed inbound blob: entries whose header
    /// decodes, addresses this connection in the inbound direction, and
    /// whose counter is strictly below the `rx` snapshot taken at the
    /// start of the call. Idempotent. Aborts on the first delete failure;
    /// per spec.md §9 the undeleted remainder still satisfies GC safety,
    /// so a partial run is always safe to retry.
    fn gc(&self) -> Result<(), StorageError>;
}

/// Read-only view over a connection's inbound stream.
pub struct Viewer {
    storage: Arc<dyn Storage>,
    state: Arc<dyn StateStore>,
    id: ConnectionID,
}

impl Viewer {
    pub fn new(storage: Arc<dyn Storage>, state: Arc<dyn StateStore>, id: ConnectionID) -> Self {
        Viewer { storage, state, id }
    }

    pub fn connection(&self) -> &ConnectionID {
        &self.id
    }

    /// `(sender=remote, receiver=local, counter)` — the inbound header at
    /// a given counter value.
    fn inbound_header(&self, counter: u64) -> MessageHeader {
        MessageHeader::new(self.id.remote.clone(), self.id.local.clone(), counter)
    }

    fn inbound_counters_present(&self) -> Result<HashSet<u64>, StorageError> {
        let names = self.storage.list()?;
        let mut counters = HashSet::new();
        for name in names {
            if let Ok(h) = decode(&name) {
                if h.sender == self.id.remote && h.receiver == self.id.local {
                    counters.insert(h.counter);
                }
            }
        }
        Ok(counters)
    }
}

impl View for Viewer {
    fn peek(&self, nth: u64) -> Result<Option<Vec<u8>>, StorageError> {
        let s = self.state.load(&self.id)?;
        let counter = s.rx.saturating_add(nth);
        let name = encode(&self.inbound_header(counter));
        match self.storage.read(&name) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(StorageError::NoSuchEntry) => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn pending(&self) -> Result<u64, StorageError> {
        let s = self.state.load(&self.id)?;
        let present = self.inbound_counters_present()?;
        let mut k = 0u64;
        while present.contains(&s.rx.saturating_add(k)) {
            k += 1;
        }
        Ok(k)
    }
}

/// Consumes inbound messages and garbage-collects what it has consumed.
pub struct Receiver {
    viewer: Viewer,
}

impl Receiver {
    pub fn new(storage: Arc<dyn Storage>, state: Arc<dyn StateStore>, id: ConnectionID) -> Self {
        Receiver {
            viewer: Viewer::new(storage, state, id),
        }
    }

    pub fn connection(&self) -> &ConnectionID {
        self.viewer.connection()
    }
}

impl View for Receiver {
    fn peek(&self, nth: u64) -> Result<Option<Vec<u8>>, StorageError> {
        self.viewer.peek(nth)
    }

    fn pending(&self) -> Result<u64, StorageError> {
        self.viewer.pending()
    }
}

impl Consume for Receiver {
    fn receive(&self) -> Result<Option<Vec<u8>>, StorageError> {
        let s = self.viewer.state.load(&self.viewer.id)?;
        let name = encode(&self.viewer.inbound_header(s.rx));
        let message = match self.viewer.storage.read(&name) {
            Ok(m) => m,
            Err(StorageError::NoSuchEntry) => return Ok(None),
            Err(e) => return Err(e),
        };
        self.viewer
            .state
            .store(&self.viewer.id, Some(bump_rx(s)))?;
        debug!(new_rx = s.rx + 1, "receive: committed");
        if let Err(e) = self.gc() {
            warn!(error = %e, "receive: opportunistic gc failed, ignoring");
        }
        Ok(Some(message))
    }

    fn receive_with<F, T, E>(&self, f: F) -> Result<Option<T>, ReceiveWithError<E>>
    where
        F: FnOnce(&[u8]) -> Result<T, E>,
    {
        let s = self.viewer.state.load(&self.viewer.id)?;
        let name = encode(&self.viewer.inbound_header(s.rx));
        let message = match self.viewer.storage.read(&name) {
            Ok(m) => m,
            Err(StorageError::NoSuchEntry) => return Ok(None),
            Err(e) => return Err(ReceiveWithError::Storage(e)),
        };
        let result = f(&message).map_err(ReceiveWithError::Callback)?;
        self.viewer
            .state
            .store(&self.viewer.id, Some(bump_rx(s)))?;
        if let Err(e) = self.gc() {
            warn!(error = %e, "receive_with: opportunistic gc failed, ignoring");
        }
        Ok(Some(result))
    }

    fn gc(&self) -> Result<(), StorageError> {
        let rx_snapshot = self.viewer.state.load(&self.viewer.id)?.rx;
        let names = self.viewer.storage.list()?;
        let mut deleted = 0u64;
        for name in names {
            let header = match decode(&name) {
                Ok(h) => h,
                Err(_) => continue,
            };
            if header.sender == self.viewer.id.remote
                && header.receiver == self.viewer.id.local
                && header.counter < rx_snapshot
            {
                self.viewer.storage.delete(&name)?;
                deleted += 1;
            }
        }
        trace!(deleted, rx_snapshot, "gc: swept consumed inbound entries");
        Ok(())
    }
}

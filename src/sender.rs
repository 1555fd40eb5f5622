//! Writes the next outgoing message under its deterministic name.

use std::sync::Arc;

use storage_p2p_wire::{encode, ConnectionID, MessageHeader};
use tracing::{debug, trace};

use crate::error::StorageError;
use crate::state::{bump_tx, StateStore};
use crate::storage::Storage;

/// Writes messages local→remote on one connection, advancing `tx`.
///
/// `send` is load–decide–write–commit: on any error, neither the
/// storage nor the counter has moved, so retrying the exact call is
/// always safe. Because the blob name is a pure function of
/// `(id, tx, message)`, a retry of the *same* message after a prior
/// write failure simply overwrites its own partial attempt with
/// identical bytes.
pub struct Sender {
    storage: Arc<dyn Storage>,
    state: Arc<dyn StateStore>,
    id: ConnectionID,
}

impl Sender {
    pub fn new(storage: Arc<dyn Storage>, state: Arc<dyn StateStore>, id: ConnectionID) -> Self {
        Sender { storage, state, id }
    }

    /// The connection this sender writes on.
    pub fn connection(&self) -> &ConnectionID {
        &self.id
    }

    /// Send `message` as the next outbound entry on this connection.
    pub fn send(&self, message: &[u8]) -> Result<(), StorageError> {
        let s = self.state.load(&self.id)?;
        let header = MessageHeader::new(self.id.local.clone(), self.id.remote.clone(), s.tx);
        let name = encode(&header);
        trace!(tx = s.tx, len = message.len(), "send: writing blob");
        self.storage.write(&name, message)?;
        self.state.store(&self.id, Some(bump_tx(s)))?;
        debug!(new_tx = s.tx + 1, "send: committed");
        Ok(())
    }
}

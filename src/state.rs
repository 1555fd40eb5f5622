//! Per-connection persistent counters and the store that holds them.

use storage_p2p_wire::ConnectionID;

use crate::error::StorageError;

/// The per-connection counter pair.
///
/// `rx` is the number of messages already consumed remote→local (and so
/// also the counter of the next expected inbound message). `tx` is the
/// number of messages already sent local→remote (and the counter of the
/// next outbound message). Both start at 0 and only ever increase by 1,
/// one successful operation at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConnectionState {
    pub rx: u64,
    pub tx: u64,
}

impl ConnectionState {
    pub const ZERO: ConnectionState = ConnectionState { rx: 0, tx: 0 };

    fn with_rx(self, rx: u64) -> Self {
        ConnectionState { rx, ..self }
    }

    fn with_tx(self, tx: u64) -> Self {
        ConnectionState { tx, ..self }
    }
}

/// The persistence capability required from a connection-counter backend.
///
/// An absent entry is semantically `{rx: 0, tx: 0}` — callers never need
/// to distinguish "never seen" from "seen and at zero". Implementations
/// materialize that default lazily: [`StateStore::load`] for an unknown
/// id simply returns [`ConnectionState::ZERO`] rather than an error.
pub trait StateStore: Send + Sync {
    /// Enumerate all connections this store currently holds state for.
    fn list(&self) -> Result<Vec<ConnectionID>, StorageError>;

    /// Load the state for `id`, or `ConnectionState::ZERO` if absent.
    fn load(&self, id: &ConnectionID) -> Result<ConnectionState, StorageError>;

    /// Overwrite the state for `id`, or delete it entirely when `state`
    /// is `None` (used by [`crate::Socket::destroy`]).
    fn store(&self, id: &ConnectionID, state: Option<ConnectionState>) -> Result<(), StorageError>;
}

pub(crate) fn bump_tx(state: ConnectionState) -> ConnectionState {
    state.with_tx(state.tx + 1)
}

pub(crate) fn bump_rx(state: ConnectionState) -> ConnectionState {
    state.with_rx(state.rx + 1)
}

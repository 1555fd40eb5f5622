//! Error types crossing the public boundary.
//!
//! Mirrors the teacher's per-crate-boundary `thiserror` pattern (one enum
//! per adapter/facade, not a single global error) rather than collapsing
//! everything into one type.

use thiserror::Error;

/// An error surfaced by a [`crate::Storage`] or [`crate::StateStore`]
/// adapter.
///
/// `NoSuchEntry` is the one variant the core itself interprets: `peek`
/// always converts it to `None`, and `receive`/`receive_with` convert it
/// to `Ok(None)` too (per the "Option for peek, raise for receive" choice,
/// a *missing* entry is not treated as a raised error — only adapter I/O
/// failures are). Everything else is an opaque, adapter-supplied failure.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The requested entry does not exist.
    #[error("no such entry")]
    NoSuchEntry,
    /// Any other adapter failure (network, disk, permission, ...).
    #[error("storage adapter error: {0}")]
    Io(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl StorageError {
    /// Wrap an arbitrary adapter error as a generic I/O failure.
    pub fn io(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        StorageError::Io(Box::new(err))
    }
}

/// The error returned by [`crate::Receiver::receive_with`], which layers
/// the caller's own callback failure on top of the usual storage error.
#[derive(Debug, Error)]
pub enum ReceiveWithError<E> {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("callback failed: {0}")]
    Callback(E),
}

/// Error surfaced by [`crate::Socket`]'s multi-step operations.
#[derive(Debug, Error)]
pub enum SocketError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    /// `destroy` could not reach a state with zero matching blobs within
    /// its retry budget — a peer is concurrently writing faster than we
    /// can delete. See the Open Question resolution in DESIGN.md.
    #[error("destroy did not converge after {rounds} rounds")]
    DestroyDidNotConverge { rounds: usize },
}

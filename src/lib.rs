//! StorageP2P: ordered, reliable, peer-to-peer message streams exchanged
//! over a mostly-dumb shared blob store.
//!
//! Two endpoints that share nothing but a blob store supporting
//! list/read/atomic-write/delete can use this crate to exchange FIFO,
//! exactly-once, duplicate-free message streams. The hard part the
//! protocol solves is the garbage-collection discipline: how to keep the
//! store bounded under concurrent use and arbitrary retries, using
//! nothing but the storage's atomic-replace guarantee as synchronization.
//!
//! # Layering
//!
//! - [`storage_p2p_wire`] (re-exported from the crate root) supplies the
//!   canonical [`MessageHeader`] codec and the `Address`/`ConnectionID`
//!   data model.
//! - [`Storage`] and [`StateStore`] are the two capabilities this crate
//!   consumes; it ships no production adapter for either (see
//!   `storage-p2p-testkit` for an in-memory reference used by tests).
//! - [`Sender`], [`Viewer`]/[`Receiver`], and [`discovery::scan`] are the
//!   low-level building blocks; [`Socket`] is the per-endpoint facade
//!   most callers want.

pub mod discovery;
pub mod error;
pub mod receiver;
pub mod sender;
pub mod socket;
pub mod state;
pub mod storage;

pub use error::{ReceiveWithError, SocketError, StorageError};
pub use receiver::{Consume, Receiver, View, Viewer};
pub use sender::Sender;
pub use socket::Socket;
pub use state::{ConnectionState, StateStore};
pub use storage::Storage;

pub use storage_p2p_wire::{
    decode, encode, Address, AddressTooLong, ConnectionID, DecodeError, MessageHeader,
};

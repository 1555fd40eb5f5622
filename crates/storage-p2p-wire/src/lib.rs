//! MessageHeader codec: canonical, deterministic, injective byte encoding
//! of `(sender, receiver, counter)` triples, used as the sole addressing
//! primitive between StorageP2P endpoints.
//!
//! See [`header`] for the wire format itself.

pub mod address;
pub mod connection;
pub mod header;

pub use address::{Address, AddressTooLong, MAX_ADDRESS_LEN};
pub use connection::ConnectionID;
pub use header::{decode, encode, from_blob_name, to_blob_name, DecodeError, MessageHeader, MAX_ENCODED_LEN};

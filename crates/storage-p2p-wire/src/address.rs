//! Opaque endpoint identifiers.
//!
//! An [`Address`] is nothing more than up to 24 bytes that two endpoints
//! agree identify one of them. The library never interprets the bytes; it
//! only needs them to compare equal, hash, and order consistently so they
//! can be embedded in a canonical [`crate::MessageHeader`] encoding.

use std::fmt;

/// Maximum length of an address in bytes, per the wire format's bound.
pub const MAX_ADDRESS_LEN: usize = 24;

/// Opaque byte-string identifier for one endpoint of a connection.
///
/// Two construction modes are supported: [`Address::random`] generates a
/// fresh, collision-resistant 24-byte value; [`Address::predefined`]
/// accepts a caller-supplied value (the caller is responsible for
/// uniqueness). Addresses are immutable once constructed.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address(Vec<u8>);

/// Error returned when a caller-supplied address exceeds [`MAX_ADDRESS_LEN`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("address length {len} exceeds the {MAX_ADDRESS_LEN}-byte maximum")]
pub struct AddressTooLong {
    pub len: usize,
}

impl Address {
    /// Generate a cryptographically random 24-byte address.
    pub fn random() -> Self {
        use rand::RngCore;
        let mut bytes = vec![0u8; MAX_ADDRESS_LEN];
        rand::thread_rng().fill_bytes(&mut bytes);
        Address(bytes)
    }

    /// Build an address from caller-supplied bytes.
    ///
    /// The caller is responsible for the value's uniqueness within the
    /// storage the address will be used against. Returns an error if
    /// `bytes` is longer than [`MAX_ADDRESS_LEN`].
    pub fn predefined(bytes: impl Into<Vec<u8>>) -> Result<Self, AddressTooLong> {
        let bytes = bytes.into();
        if bytes.len() > MAX_ADDRESS_LEN {
            return Err(AddressTooLong { len: bytes.len() });
        }
        Ok(Address(bytes))
    }

    /// Borrow the raw bytes of the address.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub(crate) fn from_raw_unchecked(bytes: Vec<u8>) -> Self {
        Address(bytes)
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", hex_string(&self.0))
    }
}

fn hex_string(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

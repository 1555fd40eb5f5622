//! Canonical encoding of [`MessageHeader`], the sole addressing primitive
//! of the protocol: a blob's storage name *is* its encoded header.
//!
//! # Wire format
//!
//! A fixed sequence of three tag-length-value fields, in this exact order:
//!
//! ```text
//! [0x01][len][sender bytes]   -- len <= 24
//! [0x02][len][receiver bytes] -- len <= 24
//! [0x03][0x08][counter BE u64]
//! ```
//!
//! Explicit length bytes make every field self-describing without a
//! delimiter that could collide with address content, which is what makes
//! the encoding an injection: no two distinct headers can share an
//! encoding, since the length-prefixed sender/receiver fields can never be
//! ambiguous about where they end. Decoding additionally requires that the
//! whole input be consumed — anything with trailing bytes, a wrong tag, or
//! a length that doesn't match the remaining input is rejected outright,
//! which is what lets [`list()`](crate) skip foreign blobs silently
//! instead of erroring on them.

use base64::Engine;

use crate::Address;
use crate::connection::ConnectionID;

const TAG_SENDER: u8 = 0x01;
const TAG_RECEIVER: u8 = 0x02;
const TAG_COUNTER: u8 = 0x03;
const COUNTER_LEN: u8 = 8;

/// Upper bound on an encoded header's length, per the wire format's contract.
pub const MAX_ENCODED_LEN: usize = 100;

/// The unique name of a single message blob: `(sender, receiver, counter)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MessageHeader {
    pub sender: Address,
    pub receiver: Address,
    pub counter: u64,
}

impl MessageHeader {
    pub fn new(sender: Address, receiver: Address, counter: u64) -> Self {
        MessageHeader {
            sender,
            receiver,
            counter,
        }
    }

    /// The `ConnectionID` of the receiving endpoint for this header:
    /// `(local: receiver, remote: sender)`.
    pub fn receiver_connection(&self) -> ConnectionID {
        ConnectionID::new(self.receiver.clone(), self.sender.clone())
    }
}

/// Why a byte string failed to decode as a canonical [`MessageHeader`].
///
/// Never surfaced from `list()` scans (malformed entries there are
/// silently skipped, per spec) — only from a direct call to [`decode`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("truncated header: expected at least {expected} more bytes, found {found}")]
    Truncated { expected: usize, found: usize },
    #[error("unexpected tag {found:#04x} at offset {offset}, expected {expected:#04x}")]
    UnexpectedTag { offset: usize, expected: u8, found: u8 },
    #[error("field length {len} exceeds maximum of {max}")]
    FieldTooLong { len: usize, max: usize },
    #[error("counter field length was {len}, expected exactly {expected}")]
    BadCounterLength { len: usize, expected: u8 },
    #[error("{extra} trailing byte(s) after a complete header")]
    TrailingBytes { extra: usize },
    #[error("invalid base64: {0}")]
    InvalidBase64(String),
}

/// Encode a header into its canonical byte form. Total, pure, and injective.
pub fn encode(header: &MessageHeader) -> Vec<u8> {
    let mut out = Vec::with_capacity(MAX_ENCODED_LEN);
    push_field(&mut out, TAG_SENDER, header.sender.as_bytes());
    push_field(&mut out, TAG_RECEIVER, header.receiver.as_bytes());
    out.push(TAG_COUNTER);
    out.push(COUNTER_LEN);
    out.extend_from_slice(&header.counter.to_be_bytes());
    out
}

fn push_field(out: &mut Vec<u8>, tag: u8, bytes: &[u8]) {
    out.push(tag);
    out.push(bytes.len() as u8);
    out.extend_from_slice(bytes);
}

/// Decode a byte string that is expected to be the exact canonical
/// encoding of some header. Any deviation — wrong tag order, a length
/// that doesn't match what remains, or trailing bytes — is rejected.
pub fn decode(bytes: &[u8]) -> Result<MessageHeader, DecodeError> {
    let mut pos = 0usize;
    let sender = read_field(bytes, &mut pos, TAG_SENDER)?;
    let receiver = read_field(bytes, &mut pos, TAG_RECEIVER)?;
    let counter = read_counter(bytes, &mut pos)?;

    if pos != bytes.len() {
        return Err(DecodeError::TrailingBytes {
            extra: bytes.len() - pos,
        });
    }

    Ok(MessageHeader {
        sender: Address::from_raw_unchecked(sender),
        receiver: Address::from_raw_unchecked(receiver),
        counter,
    })
}

fn read_field(bytes: &[u8], pos: &mut usize, expected_tag: u8) -> Result<Vec<u8>, DecodeError> {
    let tag = read_u8(bytes, *pos)?;
    if tag != expected_tag {
        return Err(DecodeError::UnexpectedTag {
            offset: *pos,
            expected: expected_tag,
            found: tag,
        });
    }
    let len = read_u8(bytes, *pos + 1)? as usize;
    if len > crate::address::MAX_ADDRESS_LEN {
        return Err(DecodeError::FieldTooLong {
            len,
            max: crate::address::MAX_ADDRESS_LEN,
        });
    }
    let start = *pos + 2;
    let end = start
        .checked_add(len)
        .ok_or(DecodeError::Truncated { expected: len, found: 0 })?;
    if end > bytes.len() {
        return Err(DecodeError::Truncated {
            expected: end - bytes.len(),
            found: 0,
        });
    }
    *pos = end;
    Ok(bytes[start..end].to_vec())
}

fn read_counter(bytes: &[u8], pos: &mut usize) -> Result<u64, DecodeError> {
    let tag = read_u8(bytes, *pos)?;
    if tag != TAG_COUNTER {
        return Err(DecodeError::UnexpectedTag {
            offset: *pos,
            expected: TAG_COUNTER,
            found: tag,
        });
    }
    let len = read_u8(bytes, *pos + 1)?;
    if len != COUNTER_LEN {
        return Err(DecodeError::BadCounterLength {
            len: len as usize,
            expected: COUNTER_LEN,
        });
    }
    let start = *pos + 2;
    let end = start + COUNTER_LEN as usize;
    if end > bytes.len() {
        return Err(DecodeError::Truncated {
            expected: end - bytes.len(),
            found: 0,
        });
    }
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&bytes[start..end]);
    *pos = end;
    Ok(u64::from_be_bytes(buf))
}

fn read_u8(bytes: &[u8], pos: usize) -> Result<u8, DecodeError> {
    bytes.get(pos).copied().ok_or(DecodeError::Truncated {
        expected: 1,
        found: 0,
    })
}

/// Encode a header and Base64-url-encode (no padding) the result, for
/// storage adapters that require printable blob names.
pub fn to_blob_name(header: &MessageHeader) -> String {
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(encode(header))
}

/// Inverse of [`to_blob_name`].
pub fn from_blob_name(name: &str) -> Result<MessageHeader, DecodeError> {
    let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(name)
        .map_err(|e| DecodeError::InvalidBase64(e.to_string()))?;
    decode(&bytes)
}

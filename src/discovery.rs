//! Finding which connections have traffic addressed to a local endpoint.

use std::collections::HashSet;

use storage_p2p_wire::{decode, Address, ConnectionID};

use crate::error::StorageError;
use crate::storage::Storage;

/// Scan `storage` for every connection with at least one blob addressed
/// to `local`. Undecodable names (foreign blobs sharing the store) are
/// silently skipped, never reported as errors.
pub fn scan(storage: &dyn Storage, local: &Address) -> Result<HashSet<ConnectionID>, StorageError> {
    let names = storage.list()?;
    let mut found = HashSet::new();
    for name in names {
        let header = match decode(&name) {
            Ok(h) => h,
            Err(_) => continue,
        };
        if &header.receiver == local {
            found.insert(ConnectionID::new(header.receiver, header.sender));
        }
    }
    Ok(found)
}

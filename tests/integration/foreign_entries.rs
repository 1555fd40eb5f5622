//! Scenario 6 (spec section 8): a blob store shared by StorageP2P may
//! also hold entries this protocol didn't write — garbage bytes, or
//! headers addressed to a different endpoint entirely. Those must never
//! surface through `discover`, `peek`, or `receive`.

use std::sync::Arc;

use storage_p2p::{Address, ConnectionID, Socket};
use storage_p2p_testkit::{MemoryStateStore, MemoryStorage};

#[test]
fn undecodable_blobs_are_ignored() {
    let storage = Arc::new(MemoryStorage::new());
    let state = Arc::new(MemoryStateStore::new());
    let socket = Socket::new(storage.clone(), state);

    storage.write(b"not-a-header-at-all", b"garbage").unwrap();
    storage.write(&[0x01, 0x02, 0x03], b"truncated tlv").unwrap();

    let local = Address::predefined(vec![9]).unwrap();
    assert!(socket.discover(&local).unwrap().is_empty());
    let conn = ConnectionID::new(local.clone(), local);
    assert_eq!(socket.receive(&conn).unwrap(), None);
    assert_eq!(socket.peek(&conn, 0).unwrap(), None);
}

#[test]
fn headers_addressed_to_other_endpoints_are_invisible_to_local() {
    let storage = Arc::new(MemoryStorage::new());
    let state = Arc::new(MemoryStateStore::new());
    let socket = Socket::new(storage.clone(), state);

    let local = Address::predefined(vec![1]).unwrap();
    let other = Address::predefined(vec![2]).unwrap();
    let bystander_a = Address::predefined(vec![3]).unwrap();
    let bystander_b = Address::predefined(vec![4]).unwrap();

    // A connection between two endpoints that aren't `local`.
    let bystander_conn = ConnectionID::new(bystander_a, bystander_b);
    socket.send(&bystander_conn, b"not for you").unwrap();

    let local_conn = ConnectionID::new(other, local.clone());
    assert!(!socket.discover(&local).unwrap().contains(&bystander_conn));
    assert_eq!(socket.receive(&local_conn).unwrap(), None);
}

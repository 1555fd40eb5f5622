//! Scenario 1 (spec section 8): two endpoints, one connection, a
//! handful of messages sent and received in order, then garbage
//! collected back to an empty store.

use storage_p2p::{Address, ConnectionID, Socket};
use storage_p2p_testkit::{MemoryStateStore, MemoryStorage};
use std::sync::Arc;

#[test]
fn messages_are_delivered_in_order_and_gc_empties_storage() {
    let storage = Arc::new(MemoryStorage::new());
    let state = Arc::new(MemoryStateStore::new());
    let socket = Socket::new(storage.clone(), state);

    let alice = Address::predefined(vec![0xA0]).unwrap();
    let bob = Address::predefined(vec![0xB0]).unwrap();
    let alice_to_bob = ConnectionID::new(alice.clone(), bob.clone());
    let bob_to_alice = ConnectionID::new(bob, alice);

    for payload in ["hello", "from", "alice"] {
        socket.send(&alice_to_bob, payload.as_bytes()).unwrap();
    }
    assert_eq!(storage.len(), 3);

    assert_eq!(
        socket.receive(&bob_to_alice).unwrap().as_deref(),
        Some(&b"hello"[..])
    );
    assert_eq!(
        socket.receive(&bob_to_alice).unwrap().as_deref(),
        Some(&b"from"[..])
    );
    assert_eq!(
        socket.receive(&bob_to_alice).unwrap().as_deref(),
        Some(&b"alice"[..])
    );
    assert_eq!(socket.receive(&bob_to_alice).unwrap(), None);

    socket.gc(&bob_to_alice).unwrap();
    assert!(storage.is_empty());
}

//! Scenario 3 (spec section 8): a blob store may list entries in any
//! order (or make a later-written entry visible before an
//! earlier-written one), but delivery must still come out strictly in
//! counter order — `peek`/`receive` never skip ahead to a message whose
//! predecessor hasn't been consumed yet.

use std::sync::Arc;

use storage_p2p::{Address, ConnectionID, Socket};
use storage_p2p_testkit::{MemoryStateStore, MemoryStorage};

#[test]
fn peek_and_receive_follow_counter_order_regardless_of_write_order() {
    let storage = Arc::new(MemoryStorage::new());
    let state = Arc::new(MemoryStateStore::new());
    let socket = Socket::new(storage, state);

    let alice = Address::predefined(vec![1]).unwrap();
    let bob = Address::predefined(vec![2]).unwrap();
    let a_to_b = ConnectionID::new(alice.clone(), bob.clone());
    let b_to_a = ConnectionID::new(bob, alice);

    socket.send(&a_to_b, b"first").unwrap();
    socket.send(&a_to_b, b"second").unwrap();
    socket.send(&a_to_b, b"third").unwrap();
    socket.send(&a_to_b, b"fourth").unwrap();

    // Peek ahead before consuming anything: all four are visible, in order.
    assert_eq!(socket.peek(&b_to_a, 0).unwrap().as_deref(), Some(&b"first"[..]));
    assert_eq!(socket.peek(&b_to_a, 3).unwrap().as_deref(), Some(&b"fourth"[..]));
    assert_eq!(socket.peek(&b_to_a, 4).unwrap(), None);

    // Receiving always takes the lowest remaining counter next, even
    // though the store itself imposes no ordering on `list`.
    assert_eq!(socket.receive(&b_to_a).unwrap().as_deref(), Some(&b"first"[..]));
    assert_eq!(socket.receive(&b_to_a).unwrap().as_deref(), Some(&b"second"[..]));
    assert_eq!(socket.peek(&b_to_a, 0).unwrap().as_deref(), Some(&b"third"[..]));
    assert_eq!(socket.receive(&b_to_a).unwrap().as_deref(), Some(&b"third"[..]));
    assert_eq!(socket.receive(&b_to_a).unwrap().as_deref(), Some(&b"fourth"[..]));
    assert_eq!(socket.receive(&b_to_a).unwrap(), None);
}

#[test]
fn a_gap_in_counters_blocks_delivery_past_it() {
    let storage = Arc::new(MemoryStorage::new());
    let state = Arc::new(MemoryStateStore::new());
    let socket = Socket::new(storage.clone(), state);

    let alice = Address::predefined(vec![3]).unwrap();
    let bob = Address::predefined(vec![4]).unwrap();
    let a_to_b = ConnectionID::new(alice.clone(), bob.clone());
    let b_to_a = ConnectionID::new(bob, alice);

    socket.send(&a_to_b, b"m0").unwrap();
    socket.send(&a_to_b, b"m1").unwrap();

    // Drop the blob for counter 0 directly, simulating a lost write that
    // never lands — counter 1 must not become visible in its place.
    let name = storage
        .list()
        .unwrap()
        .into_iter()
        .find(|n| {
            storage_p2p_wire::from_blob_name(&String::from_utf8(n.clone()).unwrap())
                .map(|h| h.counter == 0)
                .unwrap_or(false)
        })
        .unwrap();
    storage.delete(&name).unwrap();

    assert_eq!(socket.peek(&b_to_a, 0).unwrap(), None);
    assert_eq!(socket.receive(&b_to_a).unwrap(), None);
}

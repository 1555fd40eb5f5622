//! Many-threaded fuzz driver for StorageP2P.
//!
//! A test artifact, not part of the public library surface (spec.md §6):
//! spins up one OS thread per simulated endpoint, all sharing one
//! in-memory storage and state store — each optionally wrapped in a
//! [`FaultInjector`] — and exercises the concurrent two-way exchange
//! scenario described in spec.md §8 #4. Mirrors the teacher's
//! `services/emulator`, minus the async runtime: the core protocol this
//! harness drives is synchronous and blocking by design (spec.md §5), so
//! the harness uses `std::thread` rather than tokio tasks.

use std::sync::Arc;
use std::thread;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use storage_p2p::{Address, ConnectionID, Socket, StateStore, Storage, StorageError};
use storage_p2p_testkit::{FaultInjector, MemoryStateStore, MemoryStorage};
use tracing::{info, warn};

/// Parameters for one fuzz run.
#[derive(Debug, Clone)]
pub struct FuzzConfig {
    /// Number of simulated endpoints; `endpoints * (endpoints - 1)`
    /// directed connections are exercised.
    pub endpoints: usize,
    /// Iterations each endpoint's thread runs.
    pub iterations: usize,
    /// Per-storage-call injected transient failure probability, `0.0..=1.0`.
    pub error_rate: f64,
    /// Seed for both the fault injector and each endpoint's message-count RNG.
    pub seed: u64,
}

/// A connection whose sender's `tx` and receiver's `rx` disagree after a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mismatch {
    pub from: usize,
    pub to: usize,
    pub tx: u64,
    pub rx: u64,
}

/// Outcome of a fuzz run.
#[derive(Debug)]
pub struct FuzzReport {
    /// Blobs left in storage after every endpoint drained every connection.
    pub storage_entries_remaining: usize,
    /// Connections where the sender's `tx` and the receiver's `rx` disagree.
    pub mismatches: Vec<Mismatch>,
}

impl FuzzReport {
    pub fn is_clean(&self) -> bool {
        self.storage_entries_remaining == 0 && self.mismatches.is_empty()
    }
}

/// Run the concurrent two-way fuzz scenario and return its final state.
pub fn run(config: FuzzConfig) -> FuzzReport {
    let storage: Arc<FaultInjector<MemoryStorage>> = Arc::new(FaultInjector::with_rate(
        MemoryStorage::new(),
        config.error_rate,
        config.seed,
    ));
    let state: Arc<FaultInjector<MemoryStateStore>> = Arc::new(FaultInjector::with_rate(
        MemoryStateStore::new(),
        config.error_rate,
        config.seed.wrapping_add(1),
    ));
    let socket = Socket::new(
        storage.clone() as Arc<dyn Storage>,
        state.clone() as Arc<dyn StateStore>,
    );

    let addresses: Vec<Address> = (0..config.endpoints)
        .map(|i| Address::predefined(vec![i as u8]).expect("endpoint index fits in one byte"))
        .collect();

    info!(
        endpoints = config.endpoints,
        iterations = config.iterations,
        error_rate = config.error_rate,
        "fuzz-harness: starting concurrent two-way run"
    );

    let handles: Vec<_> = (0..config.endpoints)
        .map(|i| {
            let socket = socket.clone();
            let addresses = addresses.clone();
            let seed = config.seed.wrapping_add(7919 * (i as u64 + 1));
            let iterations = config.iterations;
            thread::spawn(move || drive_endpoint(socket, addresses, i, iterations, seed))
        })
        .collect();
    for h in handles {
        h.join().expect("endpoint thread panicked");
    }

    // Final drain pass: every endpoint consumes anything left in flight.
    for i in 0..addresses.len() {
        for j in 0..addresses.len() {
            if i == j {
                continue;
            }
            let inbound = ConnectionID::new(addresses[i].clone(), addresses[j].clone());
            while retry(|| socket.receive(&inbound)).is_some() {}
        }
    }

    let mut mismatches = Vec::new();
    for i in 0..addresses.len() {
        for j in 0..addresses.len() {
            if i == j {
                continue;
            }
            let outbound = ConnectionID::new(addresses[i].clone(), addresses[j].clone());
            let inbound = ConnectionID::new(addresses[j].clone(), addresses[i].clone());
            let tx = retry(|| state.load(&outbound)).tx;
            let rx = retry(|| state.load(&inbound)).rx;
            if tx != rx {
                mismatches.push(Mismatch { from: i, to: j, tx, rx });
            }
        }
    }

    let report = FuzzReport {
        storage_entries_remaining: retry(|| storage.list()).len(),
        mismatches,
    };
    if !report.is_clean() {
        warn!(?report, "fuzz-harness: run did not end clean");
    }
    report
}

fn drive_endpoint(
    socket: Socket,
    addresses: Vec<Address>,
    i: usize,
    iterations: usize,
    seed: u64,
) {
    let mut rng = StdRng::seed_from_u64(seed);
    for _ in 0..iterations {
        for (j, peer) in addresses.iter().enumerate() {
            if j == i {
                continue;
            }
            let outbound = ConnectionID::new(addresses[i].clone(), peer.clone());
            let n: u32 = rng.gen_range(0..7);
            for k in 0..n {
                let payload = format!("{i}-{j}-{k}");
                retry(|| socket.send(&outbound, payload.as_bytes()));
            }
        }
        for (j, peer) in addresses.iter().enumerate() {
            if j == i {
                continue;
            }
            let inbound = ConnectionID::new(addresses[i].clone(), peer.clone());
            while retry(|| socket.receive(&inbound)).is_some() {}
        }
    }
}

/// Spin-retry a fallible call until it succeeds, yielding between
/// attempts. Models the caller-side "retry with backoff" discipline
/// spec.md §5 requires of users of this library; the library itself
/// never retries internally.
fn retry<T>(mut f: impl FnMut() -> Result<T, StorageError>) -> T {
    loop {
        match f() {
            Ok(v) => return v,
            Err(_) => thread::yield_now(),
        }
    }
}

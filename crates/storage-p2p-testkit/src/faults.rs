//! Synthetic transient-error injection for storage adapters under test.
//!
//! Grounded in the teacher's `emulator-v2::faults` module: there, a
//! `FaultSchedule` maps an event count to a `FaultOutcome` and the first
//! matching schedule entry wins. This module adapts that shape to a
//! protocol with no network/jitter dimension: faults are keyed by
//! *storage call type* rather than event count, and are either a fixed,
//! ordered queue of forced outcomes (for "the first two attempts fail,
//! the third succeeds" scenarios) or a seeded random rate (for "10% of
//! calls fail" scenarios). A scripted outcome always takes priority over
//! the random rate, mirroring the teacher's first-match-wins rule.

use std::collections::VecDeque;
use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use storage_p2p::{ConnectionID, ConnectionState, StateStore, Storage, StorageError};
use thiserror::Error;

/// The error `FaultInjector` reports for an injected failure.
#[derive(Debug, Error)]
#[error("injected transient storage error")]
pub struct InjectedError;

fn injected() -> StorageError {
    StorageError::io(InjectedError)
}

/// Which storage call a scripted fault applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    List,
    Read,
    Write,
    Delete,
}

/// Wraps a [`Storage`] (or [`StateStore`]) with synthetic transient
/// failures, for exercising the "idempotent on error" retry discipline
/// spec.md §5/§8 requires.
pub struct FaultInjector<S> {
    inner: S,
    /// Per-operation queues of forced outcomes, consumed front-to-back.
    /// `Some(true)` means "fail this call"; entries are removed once used.
    scripted: Mutex<[VecDeque<bool>; 4]>,
    /// Fallback failure probability once the scripted queue for an
    /// operation is empty, in `[0.0, 1.0]`.
    rate: f64,
    rng: Mutex<StdRng>,
}

impl<S> FaultInjector<S> {
    /// Wrap `inner`, failing calls with probability `rate` (seeded for
    /// reproducibility).
    pub fn with_rate(inner: S, rate: f64, seed: u64) -> Self {
        FaultInjector {
            inner,
            scripted: Mutex::new([
                VecDeque::new(),
                VecDeque::new(),
                VecDeque::new(),
                VecDeque::new(),
            ]),
            rate: rate.clamp(0.0, 1.0),
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Wrap `inner` with no randomness; only explicitly scripted
    /// failures (via [`FaultInjector::fail_next`]) occur.
    pub fn scripted_only(inner: S) -> Self {
        Self::with_rate(inner, 0.0, 0)
    }

    /// Queue `count` forced failures for the next `count` calls to `op`.
    pub fn fail_next(&self, op: Op, count: usize) {
        let mut scripted = self.scripted.lock().unwrap();
        let queue = &mut scripted[op as usize];
        for _ in 0..count {
            queue.push_back(true);
        }
    }

    fn should_fail(&self, op: Op) -> bool {
        if let Some(forced) = self.scripted.lock().unwrap()[op as usize].pop_front() {
            return forced;
        }
        if self.rate <= 0.0 {
            return false;
        }
        self.rng.lock().unwrap().gen::<f64>() < self.rate
    }
}

impl<S: Storage> Storage for FaultInjector<S> {
    fn list(&self) -> Result<Vec<Vec<u8>>, StorageError> {
        if self.should_fail(Op::List) {
            return Err(injected());
        }
        self.inner.list()
    }

    fn read(&self, name: &[u8]) -> Result<Vec<u8>, StorageError> {
        if self.should_fail(Op::Read) {
            return Err(injected());
        }
        self.inner.read(name)
    }

    fn write(&self, name: &[u8], data: &[u8]) -> Result<(), StorageError> {
        if self.should_fail(Op::Write) {
            return Err(injected());
        }
        self.inner.write(name, data)
    }

    fn delete(&self, name: &[u8]) -> Result<(), StorageError> {
        if self.should_fail(Op::Delete) {
            return Err(injected());
        }
        self.inner.delete(name)
    }
}

impl<S: StateStore> StateStore for FaultInjector<S> {
    fn list(&self) -> Result<Vec<ConnectionID>, StorageError> {
        if self.should_fail(Op::List) {
            return Err(injected());
        }
        self.inner.list()
    }

    fn load(&self, id: &ConnectionID) -> Result<ConnectionState, StorageError> {
        if self.should_fail(Op::Read) {
            return Err(injected());
        }
        self.inner.load(id)
    }

    fn store(&self, id: &ConnectionID, state: Option<ConnectionState>) -> Result<(), StorageError> {
        if self.should_fail(Op::Write) {
            return Err(injected());
        }
        self.inner.store(id, state)
    }
}

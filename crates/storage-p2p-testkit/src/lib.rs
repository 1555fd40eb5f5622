//! In-memory reference adapters and a synthetic error injector for
//! testing StorageP2P. Not a shipped production backend — this is a
//! test/dev collaborator only, analogous to the teacher's
//! `rt-test-utils` crate.

pub mod faults;
pub mod memory;

pub use faults::{FaultInjector, InjectedError, Op};
pub use memory::{MemoryStateStore, MemoryStorage};

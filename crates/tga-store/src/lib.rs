// tga-store/src/lib.rs
// ============================================================================
// Crate: tga-store
// Description: Backend-agnostic persistence port for the execution log,
//              derived state, checkpoints, and warm-path sessions, plus an
//              in-memory reference adapter.
// Dependencies: tga-core, thiserror
// ============================================================================

//! Defines [`StateStore`], the one seam between the runtime engine and
//! durable storage, and ships [`InMemoryStateStore`] as its process-local
//! reference implementation. `tga-store-sqlite` implements the same trait
//! against a durable backend using the shared [`validation::validate_append`]
//! invariant checks, so the two backends can never silently diverge on what
//! counts as a legal append.

pub mod error;
pub mod locks;
pub mod memory;
pub mod port;
pub mod validation;

pub use error::StoreError;
pub use locks::TraceLockGuard;
pub use locks::TraceLockRegistry;
pub use memory::InMemoryStateStore;
pub use port::StateStore;
pub use validation::validate_append;

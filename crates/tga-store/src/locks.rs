// tga-store/src/locks.rs
// ============================================================================
// Module: Per-Trace Lock Registry
// Description: Lazily-created mutual exclusion primitives keyed by trace_id.
// Purpose: Give every StateStore adapter the same single-writer-per-trace
//          guarantee via an RAII guard rather than paired acquire/release
//          calls.
// Dependencies: std::sync, tga-core
// ============================================================================

//! ## Overview
//! The reference port describes `acquire_trace_lock`/`release_trace_lock` as
//! a paired call; Rust expresses the same guarantee more safely as an RAII
//! guard whose `Drop` releases the lock on every exit path, including
//! unwinding. [`TraceLockRegistry`] is a map of `trace_id -> Arc<(Mutex<bool>,
//! Condvar)>`, protected by a top-level mutex per §9's "Per-trace locking"
//! design note; entries are created lazily and never reclaimed, which is
//! acceptable for the bounded memory a single run accumulates.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Condvar;
use std::sync::Mutex;

use tga_core::TraceId;

// ============================================================================
// SECTION: Lock Registry
// ============================================================================

type TraceLockCell = Arc<(Mutex<bool>, Condvar)>;

/// Lazily-populated per-`trace_id` mutual exclusion registry.
#[derive(Debug, Default)]
pub struct TraceLockRegistry {
    locks: Mutex<HashMap<TraceId, TraceLockCell>>,
}

impl TraceLockRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Blocks until the lock for `trace_id` is available, then returns a
    /// guard that releases it on drop.
    ///
    /// # Panics
    ///
    /// Never panics under normal operation; a poisoned inner mutex (only
    /// reachable if a prior holder panicked while holding it) is recovered
    /// from rather than propagated, since the guarded boolean itself is
    /// always left in a consistent state by [`TraceLockGuard::drop`].
    #[must_use]
    pub fn acquire(&self, trace_id: &TraceId) -> TraceLockGuard {
        let cell = {
            let mut locks = self.locks.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
            locks.entry(trace_id.clone()).or_insert_with(|| Arc::new((Mutex::new(false), Condvar::new()))).clone()
        };

        let (mutex, condvar) = &*cell;
        let mut held = mutex.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        while *held {
            held = condvar.wait(held).unwrap_or_else(std::sync::PoisonError::into_inner);
        }
        *held = true;
        drop(held);

        TraceLockGuard { cell }
    }
}

// ============================================================================
// SECTION: Lock Guard
// ============================================================================

/// RAII guard for a single trace's exclusive lock. Releases on drop,
/// waking exactly one other waiter if any are blocked in [`TraceLockRegistry::acquire`].
#[must_use = "dropping this guard immediately releases the trace lock"]
pub struct TraceLockGuard {
    cell: TraceLockCell,
}

impl Drop for TraceLockGuard {
    fn drop(&mut self) {
        let (mutex, condvar) = &*self.cell;
        let mut held = mutex.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        *held = false;
        condvar.notify_one();
    }
}

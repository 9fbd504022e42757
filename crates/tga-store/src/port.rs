// tga-store/src/port.rs
// ============================================================================
// Module: State Store Port
// Description: The backend-agnostic persistence contract the runtime uses.
// Purpose: Define the one seam between the lifecycle engine and storage.
// Dependencies: tga-core, crate::{error, locks}
// ============================================================================

//! ## Overview
//! [`StateStore`] is the sole shared mutable resource in the system (§5):
//! every mutation the runtime performs goes through this trait. An adapter
//! must guarantee that [`StateStore::append_log_entry`] persists the entry
//! and the derived [`tga_core::ExecutionState`] atomically — both or
//! neither — and that concurrent callers on the same `trace_id` serialize
//! through [`StateStore::acquire_trace_lock`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use tga_core::ExecutionCheckpoint;
use tga_core::ExecutionState;
use tga_core::LogEntry;
use tga_core::PlanId;
use tga_core::SessionId;
use tga_core::SessionRecord;
use tga_core::TraceId;

use crate::error::StoreError;
use crate::locks::TraceLockGuard;

// ============================================================================
// SECTION: Port Trait
// ============================================================================

/// Backend-agnostic persistence contract for the execution log, derived
/// state, checkpoints, and warm-path sessions.
pub trait StateStore {
    /// Blocks until the per-trace lock for `trace_id` is held, returning a
    /// guard that releases it on drop.
    fn acquire_trace_lock(&self, trace_id: &TraceId) -> TraceLockGuard;

    /// Returns the current derived state for `trace_id`, or `None` if no
    /// entry has ever been appended for it.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on a storage-layer failure.
    fn load_state(&self, trace_id: &TraceId) -> Result<Option<ExecutionState>, StoreError>;

    /// Validates and persists `entry`, recomputing and writing the derived
    /// state in the same atomic unit.
    ///
    /// `plan_id` is only consulted when `entry` is the genesis entry for its
    /// trace (the execution log has no `plan_id` field of its own; the
    /// derived [`ExecutionState`] does, and must be seeded from somewhere
    /// the first time a trace is observed). Every other append ignores it.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::SequenceGap`], [`StoreError::HashChainBroken`],
    /// [`StoreError::InvalidTransition`], [`StoreError::GenesisInvalid`], or
    /// [`StoreError::DigestMismatch`] when `entry` fails validation; no
    /// mutation occurs in that case. Returns other [`StoreError`] variants
    /// on a storage-layer failure.
    fn append_log_entry(&self, entry: &LogEntry, plan_id: &PlanId) -> Result<(), StoreError>;

    /// Returns entries for `trace_id` with `sequence_number > after_seq`,
    /// ordered ascending.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on a storage-layer failure.
    fn list_log_entries(&self, trace_id: &TraceId, after_seq: u64) -> Result<Vec<LogEntry>, StoreError>;

    /// Persists a checkpoint snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on a storage-layer failure.
    fn write_checkpoint(&self, checkpoint: &ExecutionCheckpoint) -> Result<(), StoreError>;

    /// Returns the most recently written checkpoint for `trace_id`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on a storage-layer failure.
    fn load_latest_checkpoint(&self, trace_id: &TraceId) -> Result<Option<ExecutionCheckpoint>, StoreError>;

    /// Persists a new warm-path session record.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DuplicateSession`] if `(principal_id,
    /// capability_jti)` already exists, or another [`StoreError`] variant
    /// on a storage-layer failure.
    fn put_session(&self, session: &SessionRecord) -> Result<(), StoreError>;

    /// Returns the session record for `session_id`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on a storage-layer failure.
    fn get_session(&self, session_id: &SessionId) -> Result<Option<SessionRecord>, StoreError>;

    /// Updates `last_seen_at` for `session_id` to `now`, synchronously.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on a storage-layer failure.
    fn touch_session(&self, session_id: &SessionId, now: &str) -> Result<(), StoreError>;

    /// Deletes every session with `expires_at < now`, returning the count
    /// removed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on a storage-layer failure.
    fn delete_expired_sessions(&self, now: &str) -> Result<u64, StoreError>;

    /// Prepares the backend for use: creates schema objects, applies
    /// durability pragmas, and hardens file permissions where the backend
    /// has any of those concepts. Idempotent — safe to call on every
    /// startup regardless of whether the backend already exists.
    ///
    /// The in-memory adapter has no such setup and accepts the default
    /// no-op implementation.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on a storage-layer failure.
    fn initialize(&self) -> Result<(), StoreError> {
        Ok(())
    }

    /// Recomputes `checkpoint.checkpoint_state`'s canonical digest and
    /// compares it against `checkpoint.checkpoint_digest`.
    ///
    /// Backend-independent: provided once here so every adapter agrees on
    /// what a valid checkpoint looks like.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if `checkpoint_state` fails to canonicalize.
    fn validate_checkpoint(&self, checkpoint: &ExecutionCheckpoint) -> Result<bool, StoreError> {
        Ok(checkpoint.verify()?)
    }
}

// tga-core/src/core/checkpoint.rs
// ============================================================================
// Module: Execution Checkpoint
// Description: Optional snapshot of execution state for fast recovery.
// Purpose: Let recovery skip a full-log replay when a recent checkpoint exists.
// Dependencies: serde, serde_json, crate::core::{canonical, identifiers}
// ============================================================================

//! ## Overview
//! A checkpoint is a point-in-time snapshot of whatever state a host finds
//! useful to cache; the core only guarantees that `checkpoint_digest`
//! verifies against `checkpoint_state`. Checkpoints never replace the log —
//! the hash chain remains the source of truth.

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::core::canonical::HashDigest;
use crate::core::canonical::HashError;
use crate::core::canonical::hash_canonical_json;
use crate::core::identifiers::TraceId;

/// The schema identity carried by every execution checkpoint.
pub const CHECKPOINT_SCHEMA_ID: &str = "talos.tga.execution_checkpoint";
/// The schema version carried by every execution checkpoint.
pub const CHECKPOINT_SCHEMA_VERSION: &str = "v1";

/// Snapshot of execution state at a given sequence number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionCheckpoint {
    /// Constant schema identity; always [`CHECKPOINT_SCHEMA_ID`].
    pub schema_id: String,
    /// Constant schema version; always [`CHECKPOINT_SCHEMA_VERSION`].
    pub schema_version: String,
    /// The trace this checkpoint snapshots.
    pub trace_id: TraceId,
    /// The sequence number this checkpoint was taken at.
    pub checkpoint_sequence_number: u64,
    /// Opaque snapshot payload; any JSON tree.
    pub checkpoint_state: Value,
    /// Canonical digest of `checkpoint_state`.
    pub checkpoint_digest: HashDigest,
    /// ISO-8601 UTC timestamp this checkpoint was written at.
    pub ts: String,
}

impl ExecutionCheckpoint {
    /// Builds a checkpoint, computing `checkpoint_digest` over
    /// `checkpoint_state`.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] if `checkpoint_state` fails to canonicalize.
    pub fn new(
        trace_id: TraceId,
        checkpoint_sequence_number: u64,
        checkpoint_state: Value,
        ts: String,
    ) -> Result<Self, HashError> {
        let checkpoint_digest = hash_canonical_json(&checkpoint_state)?;
        Ok(Self {
            schema_id: CHECKPOINT_SCHEMA_ID.to_string(),
            schema_version: CHECKPOINT_SCHEMA_VERSION.to_string(),
            trace_id,
            checkpoint_sequence_number,
            checkpoint_state,
            checkpoint_digest,
            ts,
        })
    }

    /// Returns whether `checkpoint_digest` matches the canonical digest of
    /// `checkpoint_state` as it stands now.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] if `checkpoint_state` fails to canonicalize.
    pub fn verify(&self) -> Result<bool, HashError> {
        Ok(hash_canonical_json(&self.checkpoint_state)? == self.checkpoint_digest)
    }
}

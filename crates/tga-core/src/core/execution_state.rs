// tga-core/src/core/execution_state.rs
// ============================================================================
// Module: Execution State Projection
// Description: The derived, per-trace current-state record.
// Purpose: Let callers answer "what state is this trace in?" without a replay.
// Dependencies: serde, crate::core::{canonical, identifiers, state}
// ============================================================================

//! ## Overview
//! [`ExecutionState`] is recomputed after every [`crate::core::log::LogEntry`]
//! append and may also be rebuilt from scratch by replaying a trace's full
//! log — both paths must agree, which is why its own digest covers exactly
//! the same fields either way.

use serde::Deserialize;
use serde::Serialize;

use crate::core::canonical::HashDigest;
use crate::core::canonical::HashError;
use crate::core::canonical::hash_canonical_json_excluding;
use crate::core::identifiers::PlanId;
use crate::core::identifiers::TraceId;
use crate::core::state::ExecutionStateValue;

/// The schema identity carried by every execution state projection.
pub const EXECUTION_STATE_SCHEMA_ID: &str = "talos.tga.execution_state";
/// The schema version carried by every execution state projection.
pub const EXECUTION_STATE_SCHEMA_VERSION: &str = "v1";

const DIGEST_EXCLUDED_FIELDS: &[&str] = &["state_digest"];

/// Derived view of a trace's current execution state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionState {
    /// Constant schema identity; always [`EXECUTION_STATE_SCHEMA_ID`].
    pub schema_id: String,
    /// Constant schema version; always [`EXECUTION_STATE_SCHEMA_VERSION`].
    pub schema_version: String,
    /// The trace this state describes.
    pub trace_id: TraceId,
    /// The plan this trace belongs to.
    pub plan_id: PlanId,
    /// The state the trace is currently in.
    pub current_state: ExecutionStateValue,
    /// The sequence number of the most recently appended entry.
    pub last_sequence_number: u64,
    /// The `entry_digest` of the most recently appended entry.
    pub last_entry_digest: HashDigest,
    /// Self-digest over this projection, excluding itself.
    pub state_digest: HashDigest,
}

impl ExecutionState {
    /// Creates the initial projection from a trace's genesis entry.
    #[must_use]
    pub fn genesis(
        trace_id: TraceId,
        plan_id: PlanId,
        current_state: ExecutionStateValue,
        last_sequence_number: u64,
        last_entry_digest: HashDigest,
    ) -> Self {
        let mut state = Self {
            schema_id: EXECUTION_STATE_SCHEMA_ID.to_string(),
            schema_version: EXECUTION_STATE_SCHEMA_VERSION.to_string(),
            trace_id,
            plan_id,
            current_state,
            last_sequence_number,
            last_entry_digest,
            state_digest: HashDigest::zero(),
        };
        if let Ok(digest) = state.compute_digest() {
            state.state_digest = digest;
        }
        state
    }

    /// Applies a newly appended entry's transition to this projection,
    /// recomputing `state_digest` in place.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] if the updated projection fails to serialize.
    pub fn apply(
        &mut self,
        to_state: ExecutionStateValue,
        sequence_number: u64,
        entry_digest: HashDigest,
    ) -> Result<(), HashError> {
        self.current_state = to_state;
        self.last_sequence_number = sequence_number;
        self.last_entry_digest = entry_digest;
        self.state_digest = self.compute_digest()?;
        Ok(())
    }

    /// Computes this projection's digest, excluding `state_digest` itself.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] if the projection fails to serialize.
    pub fn compute_digest(&self) -> Result<HashDigest, HashError> {
        hash_canonical_json_excluding(self, DIGEST_EXCLUDED_FIELDS)
    }
}

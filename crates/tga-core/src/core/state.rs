// tga-core/src/core/state.rs
// ============================================================================
// Module: Execution State Enumerations
// Description: Moore machine states, artifact kinds, and transition rules.
// Purpose: Define the single source of truth for legal lifecycle transitions.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! The execution lifecycle is a Moore machine: the log entry's `to_state`
//! alone determines what happens next. [`is_allowed_transition`] is the one
//! place that decides whether an edge is legal; both the log-entry append
//! path and any replaying recovery code must call through it rather than
//! re-deriving the rule.

use serde::Deserialize;
use serde::Serialize;

/// A state in the execution lifecycle Moore machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionStateValue {
    /// Initial state: the action request has been recorded but not yet
    /// decided.
    Pending,
    /// The supervisor's decision authorized the tool call.
    Authorized,
    /// The tool call has been dispatched and is in flight.
    Executing,
    /// Terminal: the tool effect reported success.
    Completed,
    /// Terminal: the tool effect reported failure.
    Failed,
    /// Terminal: the supervisor denied the action request.
    Denied,
}

impl ExecutionStateValue {
    /// Returns whether this state is terminal (no further transitions are
    /// legal from it).
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Denied)
    }
}

/// The kind of payload a log entry's `artifact_digest` is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactType {
    /// The initiating action request (genesis entry).
    ActionRequest,
    /// The supervisor's authorize/deny decision.
    SupervisorDecision,
    /// The descriptor of a dispatched tool invocation.
    ToolCall,
    /// The reported outcome of a dispatched tool invocation.
    ToolEffect,
}

/// The five transitions a legitimate, non-genesis log entry may record.
const ALLOWED_TRANSITIONS: &[(ExecutionStateValue, ExecutionStateValue)] = &[
    (ExecutionStateValue::Pending, ExecutionStateValue::Authorized),
    (ExecutionStateValue::Pending, ExecutionStateValue::Denied),
    (ExecutionStateValue::Authorized, ExecutionStateValue::Executing),
    (ExecutionStateValue::Executing, ExecutionStateValue::Completed),
    (ExecutionStateValue::Executing, ExecutionStateValue::Failed),
];

/// Returns whether `(from, to)` is a legal transition for the log entry at
/// `sequence_number`.
///
/// The genesis self-loop `(PENDING, PENDING)` is legal only at
/// `sequence_number == 1`; every other pair is checked against
/// [`ALLOWED_TRANSITIONS`] regardless of sequence number.
#[must_use]
pub fn is_allowed_transition(
    from: ExecutionStateValue,
    to: ExecutionStateValue,
    sequence_number: u64,
) -> bool {
    if from == ExecutionStateValue::Pending && to == ExecutionStateValue::Pending {
        return sequence_number == 1;
    }
    ALLOWED_TRANSITIONS.contains(&(from, to))
}

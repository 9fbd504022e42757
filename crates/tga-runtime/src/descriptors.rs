// tga-runtime/src/descriptors.rs
// ============================================================================
// Module: Runtime Descriptors
// Description: The wire-shaped values the four lifecycle operations return.
// Purpose: Give authorize/record/recover a typed, serializable result
//          distinct from the execution log entries they derive from.
// Dependencies: serde, serde_json, tga-core
// ============================================================================

//! ## Overview
//! §4.4 and §6 describe the shape a caller receives from each operation
//! without requiring it to parse an execution log entry itself. These
//! types are that shape: constructed from the entries the engine appends,
//! but independently serializable so a transport binding can hand them
//! straight to a caller.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use tga_core::ExecutionStateValue;
use tga_core::HashDigest;
use tga_core::IdempotencyKey;
use tga_core::LogEntry;
use tga_core::PlanId;
use tga_core::SessionId;
use tga_core::ToolCallId;
use tga_core::TraceId;

// ============================================================================
// SECTION: Tool Call Descriptor
// ============================================================================

/// The `server`/`name`/`args` triple identifying one tool invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallInvocation {
    /// The MCP tool server hosting the tool.
    pub server: String,
    /// The tool name within that server.
    pub name: String,
    /// The arguments the tool call will be dispatched with.
    pub args: Value,
}

/// The descriptor dispatched to a tool server once a trace has moved into
/// `EXECUTING`. Its digest is recorded as the `tool_call` log entry's
/// `artifact_digest`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallDescriptor {
    /// Identifies this dispatch. Equal to the authorizing session's id.
    pub tool_call_id: ToolCallId,
    /// The trace this call belongs to.
    pub trace_id: TraceId,
    /// The plan this trace is executing.
    pub plan_id: PlanId,
    /// Digest of the capability token that authorized this call.
    pub capability_digest: HashDigest,
    /// The call itself.
    pub call: ToolCallInvocation,
    /// Idempotency key a tool server can use to de-duplicate a retried
    /// dispatch after recovery.
    pub idempotency_key: IdempotencyKey,
    /// The warm-path session this dispatch is authorized under.
    pub session_id: SessionId,
}

// ============================================================================
// SECTION: Authorization Descriptor
// ============================================================================

/// The result of either `authorize_tool_call` or `authorize_warm_path`.
///
/// `trace_id`, `sequence_number`, and `artifact_digest` are only populated
/// on the cold path: a warm-path session carries no `trace_id` of its own
/// (see `tga_core::SessionRecord`), so the warm path has no log entry to
/// report a sequence number or digest for either.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorizationDescriptor {
    /// Identifies the authorized dispatch.
    pub tool_call_id: ToolCallId,
    /// The warm-path session now backing this authorization.
    pub session_id: SessionId,
    /// The trace this authorization was issued under. `None` on the warm
    /// path.
    pub trace_id: Option<TraceId>,
    /// The sequence number of the `tool_call` entry this authorization
    /// produced. `None` on the warm path, which appends nothing.
    pub sequence_number: Option<u64>,
    /// Digest of the `tool_call` entry's artifact. `None` on the warm
    /// path.
    pub artifact_digest: Option<HashDigest>,
    /// Digest of the canonicalized call arguments, present on both paths.
    pub args_digest: HashDigest,
}

// ============================================================================
// SECTION: Tool Effect
// ============================================================================

/// The disposition a dispatched tool call resolved with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ToolEffectStatus {
    /// The tool call completed successfully.
    Success,
    /// The tool call failed.
    Failure,
}

/// The outcome a tool server reports back for a dispatched call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolEffectOutcome {
    /// Whether the call succeeded.
    pub status: ToolEffectStatus,
    /// A human-readable message, present on failure and optional on
    /// success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// The effect a tool server reports after executing a dispatched call.
/// Logged verbatim as the `tool_effect` entry's artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolEffect {
    /// The call this effect resolves.
    pub tool_call_id: ToolCallId,
    /// The idempotency key the call was dispatched with, when the caller
    /// supplies one back for correlation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idempotency_key: Option<IdempotencyKey>,
    /// Whether the call succeeded or failed.
    pub outcome: ToolEffectOutcome,
    /// Arbitrary result data the tool returned.
    #[serde(default)]
    pub data: Value,
}

// ============================================================================
// SECTION: Recovery Report
// ============================================================================

/// The result of `recover`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecoveryReport {
    /// The trace recovered.
    pub trace_id: TraceId,
    /// The lifecycle state the trace was found in.
    pub recovered_state: ExecutionStateValue,
    /// The highest sequence number found in the validated log.
    pub recovered_from_seq: u64,
    /// `true` when the trace was left `EXECUTING` with a `tool_call` entry
    /// that has no matching `tool_effect` — the caller should re-dispatch
    /// `tool_call` using its `idempotency_key`.
    pub re_dispatched: bool,
    /// The `tool_call` entry to re-dispatch, present only when
    /// `re_dispatched` is `true`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call: Option<LogEntry>,
    /// Digest of the last validated entry in the chain.
    pub latest_entry_digest: HashDigest,
}

// tga-core/src/core/log.rs
// ============================================================================
// Module: Execution Log Entry
// Description: The atomic, immutable record of the append-only audit trail.
// Purpose: Bind hash-chain integrity and Moore-machine transitions together.
// Dependencies: serde, crate::core::{canonical, identifiers, state}
// ============================================================================

//! ## Overview
//! A [`LogEntry`] is never mutated once appended. Its `entry_digest` is the
//! SHA-256 of its own canonical JSON with `entry_digest` itself excluded;
//! [`LogEntry::compute_digest`] and [`LogEntry::verify_digest`] are the only
//! supported ways to produce or check that value.

use serde::Deserialize;
use serde::Serialize;

use crate::core::canonical::HashDigest;
use crate::core::canonical::HashError;
use crate::core::canonical::hash_canonical_json_excluding;
use crate::core::identifiers::IdempotencyKey;
use crate::core::identifiers::PrincipalId;
use crate::core::identifiers::SessionId;
use crate::core::identifiers::ToolCallId;
use crate::core::identifiers::TraceId;
use crate::core::state::ArtifactType;
use crate::core::state::ExecutionStateValue;

/// The schema identity carried by every execution log entry.
pub const LOG_ENTRY_SCHEMA_ID: &str = "talos.tga.execution_log_entry";
/// The schema version carried by every execution log entry.
pub const LOG_ENTRY_SCHEMA_VERSION: &str = "v1";

/// Fields excluded from a log entry's own digest computation: the digest
/// itself, since it would otherwise depend on its own value.
const DIGEST_EXCLUDED_FIELDS: &[&str] = &["entry_digest"];

/// Append-only log entry with hash-chain integrity.
///
/// # Invariants
/// - `entry_digest == compute_digest()` once the entry is finalized.
/// - For the genesis entry (`sequence_number == 1`), `prev_entry_digest` is
///   the zero digest and `from_state == to_state == Pending`.
/// - For every other entry, `prev_entry_digest` equals the predecessor's
///   `entry_digest` and `sequence_number` is exactly one greater.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Constant schema identity; always [`LOG_ENTRY_SCHEMA_ID`].
    pub schema_id: String,
    /// Constant schema version; always [`LOG_ENTRY_SCHEMA_VERSION`].
    pub schema_version: String,
    /// The trace this entry belongs to.
    pub trace_id: TraceId,
    /// Identity of the capability issuer bound to this trace.
    pub principal_id: PrincipalId,
    /// Strictly monotonic per trace, starting at 1, with no gaps.
    pub sequence_number: u64,
    /// Predecessor's `entry_digest`; the zero digest for the genesis entry.
    pub prev_entry_digest: HashDigest,
    /// SHA-256 over the canonical JSON of this entry with this field
    /// excluded.
    pub entry_digest: HashDigest,
    /// ISO-8601 UTC timestamp, millisecond precision, `Z` suffix.
    pub ts: String,
    /// The state this trace was in before this entry.
    pub from_state: ExecutionStateValue,
    /// The state this trace transitioned to as a result of this entry.
    pub to_state: ExecutionStateValue,
    /// The kind of artifact this entry binds to.
    pub artifact_type: ArtifactType,
    /// Identity of the artifact payload.
    pub artifact_id: String,
    /// Base64url SHA-256 binding to the external artifact content.
    pub artifact_digest: HashDigest,
    /// Set when this entry concerns a specific dispatched tool call.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<ToolCallId>,
    /// Set when this entry concerns a call an external tool can
    /// deduplicate on retry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idempotency_key: Option<IdempotencyKey>,
    /// Set when this entry was authorized through the warm path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<SessionId>,
}

impl LogEntry {
    /// Computes this entry's digest over its own canonical JSON, excluding
    /// the `entry_digest` field.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] if the entry fails to serialize.
    pub fn compute_digest(&self) -> Result<HashDigest, HashError> {
        hash_canonical_json_excluding(self, DIGEST_EXCLUDED_FIELDS)
    }

    /// Returns whether `entry_digest` matches what [`Self::compute_digest`]
    /// would produce right now.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] if the entry fails to serialize.
    pub fn verify_digest(&self) -> Result<bool, HashError> {
        Ok(self.compute_digest()? == self.entry_digest)
    }

    /// Returns whether this is the genesis entry of its trace.
    #[must_use]
    pub fn is_genesis(&self) -> bool {
        self.sequence_number == 1
    }
}

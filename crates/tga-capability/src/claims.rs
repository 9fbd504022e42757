// tga-capability/src/claims.rs
// ============================================================================
// Module: Capability Claim Set
// Description: The decoded shape of a Supervisor-minted capability token.
// Purpose: Strict, deny-unknown-fields models for the JWS payload.
// Dependencies: serde, tga-core
// ============================================================================

//! ## Overview
//! A capability is a JWS-signed claim set binding a trace and plan to a set
//! of tool-call constraints. Decoding is strict: any field the Supervisor
//! did not document is a rejection, not a silently ignored extra.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

/// The fixed audience value every capability must carry.
pub const CAPABILITY_AUDIENCE: &str = "talos-gateway";

/// The sole signature algorithm the validator accepts.
pub const CAPABILITY_ALGORITHM: &str = "EdDSA";

/// Case-sensitive tool-name prefixes treated as mutating under a read-only
/// capability.
pub const MUTATION_PREFIXES: &[&str] =
    &["create-", "update-", "delete-", "write-", "apply-"];

// ============================================================================
// SECTION: Constraints
// ============================================================================

/// Per-call constraints a capability restricts its bearer to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CapabilityConstraints {
    /// The single tool server this capability authorizes.
    pub tool_server: String,
    /// The single tool name this capability authorizes.
    pub tool_name: String,
    /// Optional allowlist of call targets, interpreted by the tool executor.
    #[serde(default)]
    pub target_allowlist: Vec<String>,
    /// Optional base64url digest of an argument schema. Accepted and stored;
    /// not cross-checked against call arguments in this build (see
    /// [`crate::validator`]).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arg_constraints: Option<String>,
    /// Whether this capability forbids mutation-prefixed tool names.
    #[serde(default)]
    pub read_only: bool,
}

// ============================================================================
// SECTION: Capability Claims
// ============================================================================

/// The decoded, strictly-typed payload of a capability token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CapabilityClaims {
    /// Issuer: the Supervisor principal, bound to the trace's `principal_id`.
    pub iss: String,
    /// Audience; must equal [`CAPABILITY_AUDIENCE`].
    pub aud: String,
    /// Issued-at, Unix seconds.
    pub iat: i64,
    /// Not-before, Unix seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbf: Option<i64>,
    /// Expiry, Unix seconds.
    pub exp: i64,
    /// Unique nonce, used as the session cache's `capability_jti`.
    pub nonce: String,
    /// The trace this capability authorizes.
    pub trace_id: String,
    /// The higher-level plan this trace belongs to.
    pub plan_id: String,
    /// Per-call constraints.
    pub constraints: CapabilityConstraints,
}

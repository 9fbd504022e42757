// tga-core/src/core/session.rs
// ============================================================================
// Module: Session Record
// Description: The warm-path authorization cache entry.
// Purpose: Let repeated authorizations skip signature re-verification.
// Dependencies: serde, serde_json, crate::core::identifiers
// ============================================================================

//! ## Overview
//! A [`SessionRecord`] is created once, on a successful cold-path
//! authorization, and then only ever read or `touch`ed until it expires.
//! `(principal_id, capability_jti)` is unique — a store's schema must
//! enforce this, not just this type.

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::core::identifiers::CapabilityJti;
use crate::core::identifiers::PrincipalId;
use crate::core::identifiers::SessionId;

/// A warm-path cache entry binding a principal's capability constraints to
/// a session id that can be presented instead of a fresh JWS.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Identifies this session for warm-path lookups.
    pub session_id: SessionId,
    /// The principal (capability issuer) this session was minted for.
    pub principal_id: PrincipalId,
    /// The capability's `nonce` claim, used for the uniqueness constraint.
    pub capability_jti: CapabilityJti,
    /// The capability JWS header's `kid`, or empty if absent.
    pub capability_kid: String,
    /// ISO-8601 UTC timestamp after which this session may no longer be
    /// used for warm-path authorization.
    pub expires_at: String,
    /// Canonicalized constraints this session enforces on every warm-path
    /// call (tool_server, tool_name, target_allowlist, read_only, etc.).
    pub constraints: Value,
    /// ISO-8601 UTC timestamp this session was created at.
    pub created_at: String,
    /// ISO-8601 UTC timestamp this session was last used at; advances
    /// monotonically on every successful warm-path authorization.
    pub last_seen_at: String,
}

impl SessionRecord {
    /// Returns whether `now` is at or past `expires_at`.
    ///
    /// Timestamps are ISO-8601 with a fixed-width, zero-padded format, so
    /// lexicographic comparison agrees with chronological comparison.
    #[must_use]
    pub fn is_expired(&self, now: &str) -> bool {
        now >= self.expires_at.as_str()
    }
}

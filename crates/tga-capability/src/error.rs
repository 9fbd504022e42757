// tga-capability/src/error.rs
// ============================================================================
// Module: Capability Validator Errors
// Description: Error taxonomy for capability decoding and constraint checks.
// Purpose: Surface the Authorization error kinds the runtime coarsens upward.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! Every variant here maps onto one of the `Authorization` error kinds the
//! runtime's error taxonomy names. The validator never panics on untrusted
//! input; malformed tokens always become a typed error.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

// ============================================================================
// SECTION: Validator Error
// ============================================================================

/// Errors raised while decoding or enforcing a capability token.
#[derive(Debug, Error)]
pub enum ValidatorError {
    /// The token is not well-formed JWS compact serialization.
    #[error("malformed capability token: {0}")]
    Malformed(String),

    /// The `alg` header is not exactly `EdDSA`.
    #[error("unsupported capability algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// Signature verification against the configured public key failed.
    #[error("capability signature invalid")]
    SignatureInvalid,

    /// The decoded payload contains unknown fields or fails to parse.
    #[error("capability payload rejected: {0}")]
    PayloadRejected(String),

    /// `aud` did not equal `talos-gateway`.
    #[error("capability audience mismatch")]
    AudienceMismatch,

    /// `exp` is at or before the injected clock's current time.
    #[error("capability expired")]
    Expired,

    /// `nbf` is after the injected clock's current time.
    #[error("capability not yet valid")]
    NotYetValid,

    /// `trace_id` or `plan_id` is not a well-formed time-ordered id.
    #[error("capability carries a malformed identifier: {0}")]
    MalformedIdentifier(String),

    /// The requested tool server/name does not match the capability's
    /// constraints.
    #[error("tool unauthorized: {0}")]
    ToolUnauthorized(String),

    /// A mutation-prefixed tool was requested under a read-only capability.
    #[error("read-only violation: tool '{0}' is a mutation tool")]
    ReadOnlyViolation(String),

    /// `args` failed the referenced argument schema (not enforced in this
    /// build; see [`crate::validator`] module docs).
    #[error("argument constraints violated")]
    ArgumentsViolation,

    /// The configured public key could not be loaded.
    #[error("invalid supervisor public key: {0}")]
    InvalidPublicKey(String),
}

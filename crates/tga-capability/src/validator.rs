// tga-capability/src/validator.rs
// ============================================================================
// Module: Capability Validator
// Description: Decodes, verifies, and enforces Talos capability tokens.
// Purpose: The sole trust boundary between an untrusted tool request and the
//          runtime's authorization decision.
// Dependencies: ed25519-dalek, tga-core, crate::{claims, jws, error}
// ============================================================================

//! ## Overview
//! The validator never reads wall-clock time directly; every expiry check
//! takes "now" from an injected [`tga_core::Clock`], which keeps the same
//! capability deterministically expired or valid across repeated test runs.
//!
//! Argument-schema enforcement (`arg_constraints`) is accepted and stored on
//! the decoded capability but is not cross-checked against call arguments in
//! this build — schema resolution is a documented deferral, not an omission.

// ============================================================================
// SECTION: Imports
// ============================================================================

use ed25519_dalek::VerifyingKey;
use serde_json::Value;
use tga_core::Clock;
use tga_core::HashDigest;
use tga_core::PlanId;
use tga_core::TraceId;
use tga_core::core::idgen::is_time_ordered_id;
use tga_core::hash_bytes;

use crate::claims::CAPABILITY_AUDIENCE;
use crate::claims::CapabilityClaims;
use crate::claims::MUTATION_PREFIXES;
use crate::error::ValidatorError;
use crate::jws;

// ============================================================================
// SECTION: Decoded Capability
// ============================================================================

/// A capability that has passed signature verification, strict schema
/// decoding, and standard claim checks, ready for call-time enforcement.
#[derive(Debug, Clone)]
pub struct DecodedCapability {
    /// The strictly-typed claim set.
    pub claims: CapabilityClaims,
    /// The key identifier from the JWS header, or empty when the header
    /// omitted `kid`.
    pub kid: String,
    /// The trace this capability authorizes, parsed from `claims.trace_id`.
    pub trace_id: TraceId,
    /// The plan this trace belongs to, parsed from `claims.plan_id`.
    pub plan_id: PlanId,
}

// ============================================================================
// SECTION: Validator
// ============================================================================

/// Validates signed capability tokens against the Supervisor's public key
/// and an injected clock.
pub struct CapabilityValidator<'a> {
    public_key: VerifyingKey,
    clock: &'a dyn Clock,
}

impl<'a> CapabilityValidator<'a> {
    /// Creates a validator bound to a verified Ed25519 public key and clock.
    #[must_use]
    pub fn new(public_key: VerifyingKey, clock: &'a dyn Clock) -> Self {
        Self { public_key, clock }
    }

    /// Creates a validator from PEM, base64, or raw public key material.
    ///
    /// # Errors
    ///
    /// Returns [`ValidatorError::InvalidPublicKey`] when the material cannot
    /// be decoded into a valid Ed25519 verifying key.
    pub fn from_key_material(material: &str, clock: &'a dyn Clock) -> Result<Self, ValidatorError> {
        let public_key = jws::load_public_key(material)?;
        Ok(Self::new(public_key, clock))
    }

    /// Decodes a JWS compact token, verifies its signature, and checks the
    /// standard and Talos-specific claims.
    ///
    /// # Errors
    ///
    /// See [`ValidatorError`]: `Malformed`/`UnsupportedAlgorithm` for
    /// structural problems, `SignatureInvalid` for a bad signature,
    /// `PayloadRejected` for an unknown or missing claim field,
    /// `AudienceMismatch`, `Expired`, `NotYetValid`, and
    /// `MalformedIdentifier` for `trace_id`/`plan_id` that do not parse as
    /// time-ordered ids.
    pub fn decode_and_verify(&self, token: &str) -> Result<DecodedCapability, ValidatorError> {
        let verified = jws::parse_and_verify(token, &self.public_key)?;

        let claims: CapabilityClaims = serde_json::from_slice(&verified.payload)
            .map_err(|err| ValidatorError::PayloadRejected(err.to_string()))?;

        self.validate_standard_claims(&claims)?;

        if !is_time_ordered_id(&claims.trace_id) {
            return Err(ValidatorError::MalformedIdentifier("trace_id".to_string()));
        }
        if !is_time_ordered_id(&claims.plan_id) {
            return Err(ValidatorError::MalformedIdentifier("plan_id".to_string()));
        }

        let trace_id = TraceId::new(claims.trace_id.clone());
        let plan_id = PlanId::new(claims.plan_id.clone());
        let kid = verified.header.kid.unwrap_or_default();

        Ok(DecodedCapability { claims, kid, trace_id, plan_id })
    }

    fn validate_standard_claims(&self, claims: &CapabilityClaims) -> Result<(), ValidatorError> {
        if claims.aud != CAPABILITY_AUDIENCE {
            return Err(ValidatorError::AudienceMismatch);
        }
        let now = self.clock.now_unix_millis() / 1000;
        if claims.exp <= now {
            return Err(ValidatorError::Expired);
        }
        if let Some(nbf) = claims.nbf {
            if nbf > now {
                return Err(ValidatorError::NotYetValid);
            }
        }
        Ok(())
    }

    /// Enforces a decoded capability's constraints against a specific tool
    /// call.
    ///
    /// # Errors
    ///
    /// Returns [`ValidatorError::ToolUnauthorized`] when `tool_server`/
    /// `tool_name` do not exactly match the capability's constraints, and
    /// [`ValidatorError::ReadOnlyViolation`] when a mutation-prefixed tool
    /// name is requested under a read-only capability. `arg_constraints` is
    /// accepted but not enforced; see the module overview.
    pub fn validate_tool_call(
        cap: &DecodedCapability,
        tool_server: &str,
        tool_name: &str,
        _args: &Value,
    ) -> Result<(), ValidatorError> {
        let constraints = &cap.claims.constraints;
        if constraints.tool_server != tool_server || constraints.tool_name != tool_name {
            return Err(ValidatorError::ToolUnauthorized(format!(
                "{tool_server}:{tool_name}, expected {}:{}",
                constraints.tool_server, constraints.tool_name
            )));
        }
        if constraints.read_only
            && MUTATION_PREFIXES.iter().any(|prefix| tool_name.starts_with(prefix))
        {
            return Err(ValidatorError::ReadOnlyViolation(tool_name.to_string()));
        }
        Ok(())
    }
}

/// Returns the base64url SHA-256 digest of the raw JWS compact string, used
/// as the capability's normative binding in the execution log's
/// `artifact_digest` field.
#[must_use]
pub fn calculate_capability_digest(token: &str) -> HashDigest {
    hash_bytes(token.as_bytes())
}

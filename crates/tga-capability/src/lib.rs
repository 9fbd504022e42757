// tga-capability/src/lib.rs
// ============================================================================
// Crate: tga-capability
// Description: Capability token decoding, signature verification, and
//              call-time constraint enforcement for the Talos Governance
//              Agent.
// Dependencies: tga-core, ed25519-dalek, serde, serde_json, base64, thiserror
// ============================================================================

//! Decodes Supervisor-minted capability tokens (JWS compact, EdDSA over
//! Ed25519), verifies their signature and standard claims against an
//! injected clock, and enforces per-call constraints (tool identity,
//! read-only mutation prefixes). Depends only on [`tga_core`] for the
//! canonical digest and identifier primitives.

pub mod claims;
pub mod error;
pub mod jws;
pub mod validator;

pub use claims::CAPABILITY_ALGORITHM;
pub use claims::CAPABILITY_AUDIENCE;
pub use claims::CapabilityClaims;
pub use claims::CapabilityConstraints;
pub use claims::MUTATION_PREFIXES;
pub use error::ValidatorError;
pub use jws::JwsHeader;
pub use jws::load_public_key;
pub use validator::CapabilityValidator;
pub use validator::DecodedCapability;
pub use validator::calculate_capability_digest;

// tga-core/src/core/canonical.rs
// ============================================================================
// Module: Canonicalization & Digest
// Description: RFC 8785 JSON canonicalization and base64url content hashing.
// Purpose: Provide deterministic digests for log entries, state, and sessions.
// Dependencies: serde, serde_jcs, sha2, base64
// ============================================================================

//! ## Overview
//! Every digest in the execution log is SHA-256 over RFC 8785 canonical JSON,
//! rendered as unpadded base64url (43 characters). Digests are part of audit
//! integrity: a single bit flip anywhere in a canonicalized model must change
//! the digest.

// ============================================================================
// SECTION: Imports
// ============================================================================

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::Deserialize;
use serde::Serialize;
use sha2::Digest as _;
use sha2::Sha256;
use thiserror::Error;

// ============================================================================
// SECTION: Hash Algorithm
// ============================================================================

/// Supported hash algorithms for Talos Governance Agent artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HashAlgorithm {
    /// SHA-256 hashing, the sole supported algorithm for this build.
    Sha256,
}

/// Default hash algorithm for the Talos Governance Agent.
pub const DEFAULT_HASH_ALGORITHM: HashAlgorithm = HashAlgorithm::Sha256;

/// The length in ASCII characters of an unpadded base64url SHA-256 digest.
pub const DIGEST_LEN: usize = 43;

/// The all-zero digest, predecessor of the genesis log entry.
pub const ZERO_DIGEST: &str = "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";

// ============================================================================
// SECTION: Hash Digest
// ============================================================================

/// Deterministic content hash representation.
///
/// Always exactly [`DIGEST_LEN`] ASCII characters: unpadded base64url over
/// 32 raw SHA-256 bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HashDigest(String);

impl HashDigest {
    /// Creates a digest from raw hash bytes.
    #[must_use]
    pub fn new(bytes: &[u8]) -> Self {
        Self(URL_SAFE_NO_PAD.encode(bytes))
    }

    /// Returns the digest's base64url string form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the zero digest constant.
    #[must_use]
    pub fn zero() -> Self {
        Self(ZERO_DIGEST.to_string())
    }

    /// Returns whether this is the zero digest.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == ZERO_DIGEST
    }
}

impl From<String> for HashDigest {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for HashDigest {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl std::fmt::Display for HashDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised when computing canonical hashes.
#[derive(Debug, Error)]
pub enum HashError {
    /// JSON canonicalization failed.
    #[error("failed to canonicalize json: {0}")]
    Canonicalization(String),
}

// ============================================================================
// SECTION: Hashing Helpers
// ============================================================================

/// Returns canonical JSON bytes for a serializable value using RFC 8785.
///
/// # Errors
///
/// Returns [`HashError::Canonicalization`] when serialization fails.
pub fn canonical_json_bytes<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, HashError> {
    serde_jcs::to_vec(value).map_err(|err| HashError::Canonicalization(err.to_string()))
}

/// Hashes canonical JSON using SHA-256, emitted as unpadded base64url.
///
/// # Errors
///
/// Returns [`HashError::Canonicalization`] when serialization fails.
pub fn hash_canonical_json<T: Serialize + ?Sized>(value: &T) -> Result<HashDigest, HashError> {
    let bytes = canonical_json_bytes(value)?;
    Ok(hash_bytes(&bytes))
}

/// Hashes the canonical JSON of `value` with the named top-level fields
/// removed first, so a self-referential digest field never participates in
/// its own computation.
///
/// # Errors
///
/// Returns [`HashError::Canonicalization`] when serialization fails or the
/// value does not serialize to a JSON object.
pub fn hash_canonical_json_excluding<T: Serialize + ?Sized>(
    value: &T,
    excluded_fields: &[&str],
) -> Result<HashDigest, HashError> {
    let mut encoded = serde_json::to_value(value)
        .map_err(|err| HashError::Canonicalization(err.to_string()))?;
    if let Some(object) = encoded.as_object_mut() {
        for field in excluded_fields {
            object.remove(*field);
        }
    }
    hash_canonical_json(&encoded)
}

/// Hashes raw bytes using SHA-256, emitted as unpadded base64url.
#[must_use]
pub fn hash_bytes(bytes: &[u8]) -> HashDigest {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let digest = hasher.finalize();
    HashDigest::new(&digest)
}

// tga-capability/src/jws.rs
// ============================================================================
// Module: JWS Compact Serialization
// Description: Hand-rolled parsing and Ed25519 verification of JWS tokens.
// Purpose: Avoid a general-purpose JWT dependency for a single, fixed alg.
// Dependencies: base64, ed25519-dalek, serde_json
// ============================================================================

//! ## Overview
//! The Supervisor issues exactly one kind of token: JWS compact
//! serialization (`base64url(header).base64url(payload).base64url(sig)`)
//! signed with EdDSA over Ed25519. Rather than pull in a full JWT
//! implementation for a single fixed algorithm, the three segments are
//! split and decoded directly, matching the narrow scope of what a
//! capability token actually needs.

// ============================================================================
// SECTION: Imports
// ============================================================================

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use ed25519_dalek::Signature;
use ed25519_dalek::Verifier as _;
use ed25519_dalek::VerifyingKey;
use serde::Deserialize;
use serde::Serialize;

use crate::claims::CAPABILITY_ALGORITHM;
use crate::error::ValidatorError;

// ============================================================================
// SECTION: Header
// ============================================================================

/// The JWS protected header. Only `alg` and the optional `kid` are
/// meaningful to the validator; other header fields are ignored rather than
/// rejected, since the header is not part of the strict payload contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwsHeader {
    /// Signature algorithm; must equal [`CAPABILITY_ALGORITHM`].
    pub alg: String,
    /// Optional key identifier, carried onto the session record unchanged.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,
}

// ============================================================================
// SECTION: Compact Token
// ============================================================================

/// A parsed, signature-verified JWS compact token.
pub struct VerifiedToken {
    /// The decoded protected header.
    pub header: JwsHeader,
    /// The raw decoded payload bytes, not yet parsed into claims.
    pub payload: Vec<u8>,
}

/// Splits `token` into its three base64url segments without decoding them.
fn split_compact(token: &str) -> Result<[&str; 3], ValidatorError> {
    let mut parts = token.split('.');
    let header = parts.next();
    let payload = parts.next();
    let signature = parts.next();
    let extra = parts.next();
    match (header, payload, signature, extra) {
        (Some(h), Some(p), Some(s), None) if !h.is_empty() && !p.is_empty() && !s.is_empty() => {
            Ok([h, p, s])
        }
        _ => Err(ValidatorError::Malformed(
            "expected exactly three non-empty dot-separated segments".to_string(),
        )),
    }
}

/// Parses and verifies a JWS compact token's signature against `key`.
///
/// The signing input is the ASCII bytes of `header_b64 + "." + payload_b64`,
/// per the JWS compact serialization signing convention.
///
/// # Errors
///
/// Returns [`ValidatorError::Malformed`] if the token is not three non-empty
/// dot-separated segments or the segments do not base64url-decode,
/// [`ValidatorError::UnsupportedAlgorithm`] if `alg` is not `EdDSA`, and
/// [`ValidatorError::SignatureInvalid`] if the signature does not verify.
pub fn parse_and_verify(token: &str, key: &VerifyingKey) -> Result<VerifiedToken, ValidatorError> {
    let [header_b64, payload_b64, signature_b64] = split_compact(token)?;

    let header_bytes = URL_SAFE_NO_PAD
        .decode(header_b64)
        .map_err(|err| ValidatorError::Malformed(format!("header base64url: {err}")))?;
    let header: JwsHeader = serde_json::from_slice(&header_bytes)
        .map_err(|err| ValidatorError::Malformed(format!("header json: {err}")))?;
    if header.alg != CAPABILITY_ALGORITHM {
        return Err(ValidatorError::UnsupportedAlgorithm(header.alg));
    }

    let payload = URL_SAFE_NO_PAD
        .decode(payload_b64)
        .map_err(|err| ValidatorError::Malformed(format!("payload base64url: {err}")))?;

    let signature_bytes = URL_SAFE_NO_PAD
        .decode(signature_b64)
        .map_err(|err| ValidatorError::Malformed(format!("signature base64url: {err}")))?;
    let signature = Signature::try_from(signature_bytes.as_slice())
        .map_err(|_err| ValidatorError::Malformed("signature is not 64 bytes".to_string()))?;

    let signing_input = format!("{header_b64}.{payload_b64}");
    key.verify(signing_input.as_bytes(), &signature)
        .map_err(|_err| ValidatorError::SignatureInvalid)?;

    Ok(VerifiedToken { header, payload })
}

// ============================================================================
// SECTION: Public Key Loading
// ============================================================================

/// Loads an Ed25519 public key from PEM text, a bare base64 blob, or raw
/// 32-byte material, accepting whichever form the Supervisor's configuration
/// provides.
///
/// # Errors
///
/// Returns [`ValidatorError::InvalidPublicKey`] when the material does not
/// decode to exactly 32 bytes or is not a valid Ed25519 point.
pub fn load_public_key(material: &str) -> Result<VerifyingKey, ValidatorError> {
    let body: String = if material.contains("-----BEGIN") {
        material
            .lines()
            .filter(|line| !line.starts_with("-----"))
            .collect()
    } else {
        material.split_whitespace().collect()
    };

    let key_bytes = URL_SAFE_NO_PAD
        .decode(body.trim_end_matches('='))
        .or_else(|_| base64::engine::general_purpose::STANDARD.decode(body.trim()))
        .map_err(|err| ValidatorError::InvalidPublicKey(format!("base64 decode: {err}")))?;

    let key_bytes: [u8; 32] = key_bytes
        .as_slice()
        .try_into()
        .map_err(|_| ValidatorError::InvalidPublicKey("expected 32 raw key bytes".to_string()))?;

    VerifyingKey::from_bytes(&key_bytes)
        .map_err(|err| ValidatorError::InvalidPublicKey(err.to_string()))
}

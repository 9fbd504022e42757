// tga-capability/tests/jws.rs
// ============================================================================
// Module: JWS Parsing Tests
// Description: Coverage for compact-serialization structural validation.
// Dependencies: tga-capability, ed25519-dalek
// ============================================================================

//! ## Overview
//! Exercises the structural checks `jws::parse_and_verify` performs before
//! any cryptographic work: segment count, non-empty segments, and base64url
//! decodability.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use ed25519_dalek::SigningKey;
use tga_capability::ValidatorError;
use tga_capability::jws::parse_and_verify;

fn test_key() -> SigningKey {
    SigningKey::from_bytes(&[3; 32])
}

#[test]
fn rejects_too_few_segments() {
    let key = test_key();
    let err = parse_and_verify("only.two", &key.verifying_key()).expect_err("should reject");
    assert!(matches!(err, ValidatorError::Malformed(_)));
}

#[test]
fn rejects_too_many_segments() {
    let key = test_key();
    let err =
        parse_and_verify("a.b.c.d", &key.verifying_key()).expect_err("should reject");
    assert!(matches!(err, ValidatorError::Malformed(_)));
}

#[test]
fn rejects_an_empty_segment() {
    let key = test_key();
    let err = parse_and_verify("a..c", &key.verifying_key()).expect_err("should reject");
    assert!(matches!(err, ValidatorError::Malformed(_)));
}

#[test]
fn rejects_non_base64_header() {
    let key = test_key();
    let err =
        parse_and_verify("not base64!.payload.sig", &key.verifying_key()).expect_err("should reject");
    assert!(matches!(err, ValidatorError::Malformed(_)));
}

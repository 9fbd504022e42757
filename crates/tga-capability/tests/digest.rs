// tga-capability/tests/digest.rs
// ============================================================================
// Module: Capability Digest Tests
// Description: Coverage for the normative base64url capability digest.
// Dependencies: tga-capability, tga-core
// ============================================================================

//! ## Overview
//! The capability digest binds the exact raw JWS compact string, not the
//! decoded claims, into the execution log's `artifact_digest` field.

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

use tga_capability::calculate_capability_digest;
use tga_core::DIGEST_LEN;

#[test]
fn digest_is_base64url_and_stable() {
    let token = "header.payload.signature";
    let first = calculate_capability_digest(token);
    let second = calculate_capability_digest(token);
    assert_eq!(first, second);
    assert_eq!(first.as_str().len(), DIGEST_LEN);
    assert!(!first.as_str().contains('='));
}

#[test]
fn digest_changes_with_any_byte_of_the_token() {
    let first = calculate_capability_digest("header.payload.signatureA");
    let second = calculate_capability_digest("header.payload.signatureB");
    assert_ne!(first, second);
}

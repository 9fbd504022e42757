// tga-capability/tests/key_loading.rs
// ============================================================================
// Module: Public Key Loading Tests
// Description: Coverage for PEM-armored and bare-base64 key material.
// Dependencies: tga-capability, ed25519-dalek, base64
// ============================================================================

//! ## Overview
//! The Supervisor's public key may arrive PEM-armored or as a bare base64
//! blob; both forms must resolve to the same verifying key.

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

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use ed25519_dalek::SigningKey;
use tga_capability::ValidatorError;
use tga_capability::load_public_key;

#[test]
fn loads_a_bare_base64_key() {
    let key = SigningKey::from_bytes(&[5; 32]);
    let encoded = STANDARD.encode(key.verifying_key().to_bytes());
    let loaded = load_public_key(&encoded).expect("load");
    assert_eq!(loaded.to_bytes(), key.verifying_key().to_bytes());
}

#[test]
fn loads_a_pem_armored_key() {
    let key = SigningKey::from_bytes(&[5; 32]);
    let encoded = STANDARD.encode(key.verifying_key().to_bytes());
    let pem = format!("-----BEGIN PUBLIC KEY-----\n{encoded}\n-----END PUBLIC KEY-----\n");
    let loaded = load_public_key(&pem).expect("load");
    assert_eq!(loaded.to_bytes(), key.verifying_key().to_bytes());
}

#[test]
fn rejects_material_that_is_not_thirty_two_bytes() {
    let err = load_public_key("dG9vIHNob3J0").expect_err("should reject");
    assert!(matches!(err, ValidatorError::InvalidPublicKey(_)));
}

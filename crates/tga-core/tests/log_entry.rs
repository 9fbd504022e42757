// tga-core/tests/log_entry.rs
// ============================================================================
// Module: Execution Log Entry Tests
// Description: Tests for digest computation and chaining over log entries.
// Dependencies: tga-core
// ============================================================================
//! ## Overview
//! Builds a short genesis -> authorized hash chain by hand and checks the
//! digest/chaining invariants the runtime and storage adapters both rely on.

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

use tga_core::ArtifactType;
use tga_core::ExecutionStateValue;
use tga_core::HashDigest;
use tga_core::LOG_ENTRY_SCHEMA_ID;
use tga_core::LOG_ENTRY_SCHEMA_VERSION;
use tga_core::LogEntry;
use tga_core::PrincipalId;
use tga_core::TraceId;

fn sample_entry(
    trace_id: &str,
    principal_id: &str,
    sequence_number: u64,
    prev_entry_digest: HashDigest,
    from_state: ExecutionStateValue,
    to_state: ExecutionStateValue,
) -> LogEntry {
    let mut entry = LogEntry {
        schema_id: LOG_ENTRY_SCHEMA_ID.to_string(),
        schema_version: LOG_ENTRY_SCHEMA_VERSION.to_string(),
        trace_id: TraceId::new(trace_id),
        principal_id: PrincipalId::new(principal_id),
        sequence_number,
        prev_entry_digest,
        entry_digest: HashDigest::zero(),
        ts: "2026-07-27T00:00:00.000Z".to_string(),
        from_state,
        to_state,
        artifact_type: ArtifactType::ActionRequest,
        artifact_id: "plan-1".to_string(),
        artifact_digest: HashDigest::zero(),
        tool_call_id: None,
        idempotency_key: None,
        session_id: None,
    };
    entry.entry_digest = entry.compute_digest().expect("digest");
    entry
}

#[test]
fn digest_excludes_itself_and_verifies() {
    let entry = sample_entry(
        "01890a5d-ac96-7def-89ab-0123456789ab",
        "01890a5d-ac96-7def-89ab-0123456789ac",
        1,
        HashDigest::zero(),
        ExecutionStateValue::Pending,
        ExecutionStateValue::Pending,
    );
    assert!(entry.verify_digest().expect("verify"));
    assert!(entry.is_genesis());
}

#[test]
fn tampering_with_any_field_changes_the_digest() {
    let mut entry = sample_entry(
        "01890a5d-ac96-7def-89ab-0123456789ab",
        "01890a5d-ac96-7def-89ab-0123456789ac",
        1,
        HashDigest::zero(),
        ExecutionStateValue::Pending,
        ExecutionStateValue::Pending,
    );
    let original_digest = entry.entry_digest.clone();
    entry.artifact_id = "tampered".to_string();
    let recomputed = entry.compute_digest().expect("digest");
    assert_ne!(original_digest, recomputed);
}

#[test]
fn a_two_entry_chain_links_by_digest() {
    let genesis = sample_entry(
        "01890a5d-ac96-7def-89ab-0123456789ab",
        "01890a5d-ac96-7def-89ab-0123456789ac",
        1,
        HashDigest::zero(),
        ExecutionStateValue::Pending,
        ExecutionStateValue::Pending,
    );
    let authorized = sample_entry(
        "01890a5d-ac96-7def-89ab-0123456789ab",
        "01890a5d-ac96-7def-89ab-0123456789ac",
        2,
        genesis.entry_digest.clone(),
        ExecutionStateValue::Pending,
        ExecutionStateValue::Authorized,
    );
    assert_eq!(authorized.prev_entry_digest, genesis.entry_digest);
    assert_eq!(authorized.sequence_number, genesis.sequence_number + 1);
}

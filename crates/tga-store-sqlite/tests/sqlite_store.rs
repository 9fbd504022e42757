// tga-store-sqlite/tests/sqlite_store.rs
// ============================================================================
// Module: SQLite Store Tests
// Description: Validate the durable StateStore implementation's behavior.
// Purpose: Ensure durable persistence, integrity checks, and parity with
//          the in-memory adapter.
// Dependencies: tga-store-sqlite, tga-store, tga-core, rusqlite, tempfile
// ============================================================================

//! ## Overview
//! Conformance tests for the SQLite-backed state store: WAL durability
//! across instances, append invariant enforcement identical to the
//! in-memory adapter, session uniqueness, schema version rejection, and
//! path hardening.

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
    reason = "Test-only assertions and helpers are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use tga_core::ArtifactType;
use tga_core::CapabilityJti;
use tga_core::ExecutionStateValue;
use tga_core::HashDigest;
use tga_core::LOG_ENTRY_SCHEMA_ID;
use tga_core::LOG_ENTRY_SCHEMA_VERSION;
use tga_core::LogEntry;
use tga_core::PlanId;
use tga_core::PrincipalId;
use tga_core::SessionId;
use tga_core::SessionRecord;
use tga_core::TraceId;
use tga_store::StateStore;
use tga_store::StoreError;
use tga_store_sqlite::SCHEMA_VERSION;
use tga_store_sqlite::SqliteStateStore;
use tga_store_sqlite::SqliteStoreConfig;
use tga_store_sqlite::SqliteStoreError;
use tempfile::TempDir;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn entry(
    trace_id: &str,
    sequence_number: u64,
    prev_entry_digest: HashDigest,
    from_state: ExecutionStateValue,
    to_state: ExecutionStateValue,
) -> LogEntry {
    let mut e = LogEntry {
        schema_id: LOG_ENTRY_SCHEMA_ID.to_string(),
        schema_version: LOG_ENTRY_SCHEMA_VERSION.to_string(),
        trace_id: TraceId::new(trace_id),
        principal_id: PrincipalId::new("principal-1"),
        sequence_number,
        prev_entry_digest,
        entry_digest: HashDigest::zero(),
        ts: "2026-07-27T00:00:00.000Z".to_string(),
        from_state,
        to_state,
        artifact_type: ArtifactType::ActionRequest,
        artifact_id: "artifact-1".to_string(),
        artifact_digest: HashDigest::zero(),
        tool_call_id: None,
        idempotency_key: None,
        session_id: None,
    };
    e.entry_digest = e.compute_digest().expect("digest");
    e
}

fn genesis(trace_id: &str) -> LogEntry {
    entry(trace_id, 1, HashDigest::zero(), ExecutionStateValue::Pending, ExecutionStateValue::Pending)
}

fn store_for(path: &std::path::Path) -> SqliteStateStore {
    let config = SqliteStoreConfig::new(path);
    SqliteStateStore::open(&config).expect("store init")
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn appends_and_loads_the_projected_state() {
    let temp = TempDir::new().expect("tempdir");
    let path = temp.path().join("store.sqlite");
    let store = store_for(&path);
    let plan_id = PlanId::new("plan-1");

    let g = genesis("01890a5d-ac96-7def-89ab-0123456789ab");
    store.append_log_entry(&g, &plan_id).expect("append genesis");

    let state = store.load_state(&g.trace_id).expect("load").expect("present");
    assert_eq!(state.plan_id, plan_id);
    assert_eq!(state.current_state, ExecutionStateValue::Pending);
}

#[test]
fn state_persists_across_store_instances() {
    let temp = TempDir::new().expect("tempdir");
    let path = temp.path().join("store.sqlite");
    let plan_id = PlanId::new("plan-1");
    let g = genesis("01890a5d-ac96-7def-89ab-0123456789ab");

    {
        let store = store_for(&path);
        store.append_log_entry(&g, &plan_id).expect("append genesis");
    }

    let store = store_for(&path);
    let state = store.load_state(&g.trace_id).expect("load").expect("present");
    assert_eq!(state.last_sequence_number, 1);

    let entries = store.list_log_entries(&g.trace_id, 0).expect("list");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].entry_digest, g.entry_digest);
}

#[test]
fn rejects_a_sequence_gap_identically_to_the_in_memory_adapter() {
    let temp = TempDir::new().expect("tempdir");
    let path = temp.path().join("store.sqlite");
    let store = store_for(&path);
    let plan_id = PlanId::new("plan-1");
    let trace_id = "01890a5d-ac96-7def-89ab-0123456789ab";

    let g = genesis(trace_id);
    store.append_log_entry(&g, &plan_id).expect("append genesis");

    let skipped =
        entry(trace_id, 3, g.entry_digest.clone(), ExecutionStateValue::Pending, ExecutionStateValue::Authorized);
    let err = store.append_log_entry(&skipped, &plan_id).expect_err("should reject");
    assert!(matches!(err, StoreError::SequenceGap { expected: 2, actual: 3 }));
}

#[test]
fn rejects_a_broken_hash_chain() {
    let temp = TempDir::new().expect("tempdir");
    let path = temp.path().join("store.sqlite");
    let store = store_for(&path);
    let plan_id = PlanId::new("plan-1");
    let trace_id = "01890a5d-ac96-7def-89ab-0123456789ab";

    let g = genesis(trace_id);
    store.append_log_entry(&g, &plan_id).expect("append genesis");

    let wrong_prev =
        entry(trace_id, 2, HashDigest::zero(), ExecutionStateValue::Pending, ExecutionStateValue::Authorized);
    let err = store.append_log_entry(&wrong_prev, &plan_id).expect_err("should reject");
    assert!(matches!(err, StoreError::HashChainBroken { sequence_number: 2 }));
}

#[test]
fn a_corrupted_log_row_surfaces_as_a_store_error_on_read() {
    let temp = TempDir::new().expect("tempdir");
    let path = temp.path().join("store.sqlite");
    let store = store_for(&path);
    let plan_id = PlanId::new("plan-1");
    let g = genesis("01890a5d-ac96-7def-89ab-0123456789ab");
    store.append_log_entry(&g, &plan_id).expect("append genesis");

    {
        let connection = rusqlite::Connection::open(&path).expect("reopen");
        connection
            .execute(
                "UPDATE execution_logs SET data = 'not json' WHERE trace_id = ?1",
                rusqlite::params![g.trace_id.as_str()],
            )
            .expect("corrupt row");
    }

    let result = store.list_log_entries(&g.trace_id, 0);
    assert!(matches!(result, Err(StoreError::Corrupt(_))));
}

#[test]
fn rejects_a_schema_version_mismatch_on_reopen() {
    let temp = TempDir::new().expect("tempdir");
    let path = temp.path().join("store.sqlite");
    let _store = store_for(&path);

    {
        let connection = rusqlite::Connection::open(&path).expect("reopen");
        connection
            .execute("UPDATE schema_versions SET version = 'bogus-version'", rusqlite::params![])
            .expect("tamper schema version");
    }

    let config = SqliteStoreConfig::new(&path);
    let result = SqliteStateStore::open(&config);
    assert!(matches!(result, Err(SqliteStoreError::VersionMismatch(_))));
}

#[test]
fn initialize_is_idempotent_and_preserves_schema_version() {
    let temp = TempDir::new().expect("tempdir");
    let path = temp.path().join("store.sqlite");
    let store = store_for(&path);
    store.initialize().expect("re-initialize");

    let connection = rusqlite::Connection::open(&path).expect("reopen");
    let version: String = connection
        .query_row("SELECT version FROM schema_versions LIMIT 1", rusqlite::params![], |row| row.get(0))
        .expect("read version");
    assert_eq!(version, SCHEMA_VERSION);
}

#[test]
fn sessions_enforce_the_principal_capability_jti_unique_index() {
    let temp = TempDir::new().expect("tempdir");
    let path = temp.path().join("store.sqlite");
    let store = store_for(&path);

    let session = SessionRecord {
        session_id: SessionId::new("01890a5d-ac96-7def-89ab-0123456789ff"),
        principal_id: PrincipalId::new("principal-1"),
        capability_jti: CapabilityJti::new("cap-jti-1"),
        capability_kid: String::new(),
        expires_at: "2026-07-28T00:00:00.000Z".to_string(),
        constraints: serde_json::json!({}),
        created_at: "2026-07-27T00:00:00.000Z".to_string(),
        last_seen_at: "2026-07-27T00:00:00.000Z".to_string(),
    };
    store.put_session(&session).expect("first insert succeeds");

    let mut duplicate = session.clone();
    duplicate.session_id = SessionId::new("01890a5d-ac96-7def-89ab-0123456789fe");
    let err = store.put_session(&duplicate).expect_err("duplicate should be rejected");
    assert!(matches!(err, StoreError::DuplicateSession(_)));

    store.touch_session(&session.session_id, "2026-07-27T01:00:00.000Z").expect("touch");
    let touched = store.get_session(&session.session_id).expect("get").expect("present");
    assert_eq!(touched.last_seen_at, "2026-07-27T01:00:00.000Z");
}

#[test]
fn expired_sessions_are_swept_and_identity_is_freed() {
    let temp = TempDir::new().expect("tempdir");
    let path = temp.path().join("store.sqlite");
    let store = store_for(&path);

    let expired = SessionRecord {
        session_id: SessionId::new("01890a5d-ac96-7def-89ab-012345678901"),
        principal_id: PrincipalId::new("principal-1"),
        capability_jti: CapabilityJti::new("cap-jti-expired"),
        capability_kid: String::new(),
        expires_at: "2026-07-27T00:00:00.000Z".to_string(),
        constraints: serde_json::json!({}),
        created_at: "2026-07-26T00:00:00.000Z".to_string(),
        last_seen_at: "2026-07-26T00:00:00.000Z".to_string(),
    };
    store.put_session(&expired).expect("insert expired");

    let removed = store.delete_expired_sessions("2026-07-27T00:00:00.000Z").expect("sweep");
    assert_eq!(removed, 1);

    let reinserted = SessionRecord { session_id: SessionId::new("01890a5d-ac96-7def-89ab-012345678903"), ..expired };
    store.put_session(&reinserted).expect("identity freed after sweep");
}

#[test]
fn checkpoints_round_trip_and_return_the_most_recent() {
    let temp = TempDir::new().expect("tempdir");
    let path = temp.path().join("store.sqlite");
    let store = store_for(&path);
    let trace_id = TraceId::new("01890a5d-ac96-7def-89ab-0123456789ab");

    assert!(store.load_latest_checkpoint(&trace_id).expect("load").is_none());

    let first = tga_core::ExecutionCheckpoint::new(
        trace_id.clone(),
        1,
        serde_json::json!({"n": 1}),
        "2026-07-27T00:00:00.000Z".to_string(),
    )
    .expect("build checkpoint");
    store.write_checkpoint(&first).expect("write first");

    let second = tga_core::ExecutionCheckpoint::new(
        trace_id.clone(),
        2,
        serde_json::json!({"n": 2}),
        "2026-07-27T00:01:00.000Z".to_string(),
    )
    .expect("build checkpoint");
    store.write_checkpoint(&second).expect("write second");

    let latest = store.load_latest_checkpoint(&trace_id).expect("load").expect("present");
    assert_eq!(latest.checkpoint_sequence_number, 2);
    assert!(store.validate_checkpoint(&latest).expect("validate"));
}

#[cfg(unix)]
#[test]
fn a_freshly_created_database_file_is_hardened_to_owner_only_permissions() {
    use std::os::unix::fs::PermissionsExt as _;

    let temp = TempDir::new().expect("tempdir");
    let path = temp.path().join("store.sqlite");
    let _store = store_for(&path);

    let mode = std::fs::metadata(&path).expect("stat").permissions().mode() & 0o777;
    assert_eq!(mode, 0o600);
}

#[test]
fn concurrent_appends_to_distinct_traces_all_succeed() {
    let temp = TempDir::new().expect("tempdir");
    let path = temp.path().join("store.sqlite");
    let store = std::sync::Arc::new(store_for(&path));
    let mut handles = Vec::new();

    for index in 0 .. 8 {
        let store = std::sync::Arc::clone(&store);
        handles.push(std::thread::spawn(move || {
            let trace_id = format!("01890a5d-ac96-7def-89ab-00000000000{index}");
            let plan_id = PlanId::new(format!("plan-{index}"));
            let g = genesis(&trace_id);
            store.append_log_entry(&g, &plan_id).expect("append genesis");
        }));
    }

    for handle in handles {
        handle.join().expect("thread join");
    }

    let connection = rusqlite::Connection::open(&path).expect("reopen");
    let count: i64 = connection
        .query_row("SELECT COUNT(*) FROM execution_logs", rusqlite::params![], |row| row.get(0))
        .expect("count rows");
    assert_eq!(count, 8);
}

// tga-core/src/core/mod.rs
// ============================================================================
// Module: Talos Governance Agent Core Types
// Description: Canonical execution-log schema and shared primitives.
// Purpose: Provide stable, serializable types shared by every other crate.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Core types define the execution log entry, its derived state projection,
//! checkpoints, session records, the Moore-machine state enumeration, and
//! the canonicalization/digest/identifier/clock primitives everything else
//! is built from. These types are the canonical source of truth for any
//! derived API surface (the capability validator, the runtime, storage
//! adapters).

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod canonical;
pub mod checkpoint;
pub mod execution_state;
pub mod identifiers;
pub mod idgen;
pub mod log;
pub mod session;
pub mod state;
pub mod time;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use canonical::DEFAULT_HASH_ALGORITHM;
pub use canonical::DIGEST_LEN;
pub use canonical::HashAlgorithm;
pub use canonical::HashDigest;
pub use canonical::HashError;
pub use canonical::ZERO_DIGEST;
pub use canonical::canonical_json_bytes;
pub use canonical::hash_bytes;
pub use canonical::hash_canonical_json;
pub use canonical::hash_canonical_json_excluding;
pub use checkpoint::CHECKPOINT_SCHEMA_ID;
pub use checkpoint::CHECKPOINT_SCHEMA_VERSION;
pub use checkpoint::ExecutionCheckpoint;
pub use execution_state::EXECUTION_STATE_SCHEMA_ID;
pub use execution_state::EXECUTION_STATE_SCHEMA_VERSION;
pub use execution_state::ExecutionState;
pub use identifiers::CapabilityJti;
pub use identifiers::IdempotencyKey;
pub use identifiers::PlanId;
pub use identifiers::PrincipalId;
pub use identifiers::SessionId;
pub use identifiers::ToolCallId;
pub use identifiers::TraceId;
pub use identifiers::has_id_shape;
pub use idgen::is_time_ordered_id;
pub use log::LOG_ENTRY_SCHEMA_ID;
pub use log::LOG_ENTRY_SCHEMA_VERSION;
pub use log::LogEntry;
pub use session::SessionRecord;
pub use state::ArtifactType;
pub use state::ExecutionStateValue;
pub use state::is_allowed_transition;
pub use time::Clock;
pub use time::FixedClock;
pub use time::SystemClock;
pub use time::format_iso8601_millis;

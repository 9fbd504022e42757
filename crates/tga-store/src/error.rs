// tga-store/src/error.rs
// ============================================================================
// Module: State Store Errors
// Description: Error taxonomy for the append-only persistence contract.
// Purpose: Let the runtime distinguish integrity failures from plain I/O.
// Dependencies: thiserror, tga-core
// ============================================================================

//! ## Overview
//! Every variant here maps onto one of the `Integrity`/`Lifecycle`/`Session`
//! error kinds the runtime's error taxonomy names. Adapters (in-memory,
//! SQLite) never invent their own error shapes outside of [`StoreError::Io`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use tga_core::ExecutionStateValue;
use tga_core::HashError;

// ============================================================================
// SECTION: State Store Error
// ============================================================================

/// Errors raised by a [`crate::StateStore`] implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// `entry.sequence_number` was not exactly one greater than the trace's
    /// last appended sequence number.
    #[error("sequence gap: expected {expected}, got {actual}")]
    SequenceGap {
        /// The sequence number the store expected next.
        expected: u64,
        /// The sequence number the caller supplied.
        actual: u64,
    },

    /// `entry.prev_entry_digest` did not match the predecessor's
    /// `entry_digest` (or was not the zero digest for a genesis entry).
    #[error("hash chain broken at sequence {sequence_number}")]
    HashChainBroken {
        /// The sequence number at which the chain broke.
        sequence_number: u64,
    },

    /// `(entry.from_state, entry.to_state)` is not an allowed transition.
    #[error("invalid transition: {from:?} -> {to:?}")]
    InvalidTransition {
        /// The entry's `from_state`.
        from: ExecutionStateValue,
        /// The entry's `to_state`.
        to: ExecutionStateValue,
    },

    /// `entry.entry_digest` did not match its recomputed digest.
    #[error("entry digest mismatch at sequence {sequence_number}")]
    DigestMismatch {
        /// The sequence number of the offending entry.
        sequence_number: u64,
    },

    /// The genesis entry for a trace did not carry the zero digest or
    /// `sequence_number == 1`.
    #[error("genesis entry invalid: {0}")]
    GenesisInvalid(String),

    /// A session with the same `(principal_id, capability_jti)` pair
    /// already exists.
    #[error("duplicate session for principal/capability pair: {0}")]
    DuplicateSession(String),

    /// Canonicalization or digest computation failed while validating or
    /// persisting a model.
    #[error(transparent)]
    Hash(#[from] HashError),

    /// The backing storage medium reported an I/O failure.
    #[error("state store io error: {0}")]
    Io(String),

    /// Stored data failed to deserialize or otherwise violates the schema
    /// the store expects.
    #[error("state store data corrupt: {0}")]
    Corrupt(String),
}

// tga-store/src/validation.rs
// ============================================================================
// Module: Append Validation
// Description: Shared sequence/hash-chain/transition/digest checks.
// Purpose: Let every adapter enforce identical append_log_entry invariants.
// Dependencies: tga-core, crate::error
// ============================================================================

//! ## Overview
//! [`validate_append`] is the one place that decides whether a candidate
//! [`LogEntry`] may follow the trace's current last entry. Both
//! [`crate::memory::InMemoryStateStore`] and `tga-store-sqlite`'s adapter
//! call through this rather than re-deriving the rule, so a bug fixed once
//! is fixed in both backends.

use tga_core::HashDigest;
use tga_core::LogEntry;
use tga_core::is_allowed_transition;

use crate::error::StoreError;

/// Validates that `entry` may legally follow `last`, the trace's current
/// most recent entry (`None` if `entry` would be the genesis entry).
///
/// # Errors
///
/// Returns [`StoreError::SequenceGap`], [`StoreError::GenesisInvalid`],
/// [`StoreError::HashChainBroken`], [`StoreError::InvalidTransition`], or
/// [`StoreError::DigestMismatch`] when `entry` violates the corresponding
/// invariant.
pub fn validate_append(last: Option<&LogEntry>, entry: &LogEntry) -> Result<(), StoreError> {
    let expected_seq = last.map_or(1, |e| e.sequence_number + 1);
    if entry.sequence_number != expected_seq {
        return Err(StoreError::SequenceGap {
            expected: expected_seq,
            actual: entry.sequence_number,
        });
    }

    match last {
        Some(prev) => {
            if entry.prev_entry_digest != prev.entry_digest {
                return Err(StoreError::HashChainBroken { sequence_number: entry.sequence_number });
            }
        }
        None => {
            if entry.prev_entry_digest != HashDigest::zero() {
                return Err(StoreError::GenesisInvalid(
                    "genesis entry must carry the zero digest as prev_entry_digest".to_string(),
                ));
            }
            if entry.sequence_number != 1 {
                return Err(StoreError::GenesisInvalid(
                    "genesis entry must have sequence_number == 1".to_string(),
                ));
            }
        }
    }

    if !is_allowed_transition(entry.from_state, entry.to_state, entry.sequence_number) {
        return Err(StoreError::InvalidTransition {
            from: entry.from_state,
            to: entry.to_state,
        });
    }

    let computed = entry.compute_digest()?;
    if computed != entry.entry_digest {
        return Err(StoreError::DigestMismatch { sequence_number: entry.sequence_number });
    }

    Ok(())
}

// tga-runtime/src/error.rs
// ============================================================================
// Module: Runtime Errors
// Description: The composed error taxonomy the lifecycle engine raises.
// Purpose: Let every internal failure be coarsened to one of three exposed
//          transport codes without leaking adapter-specific detail upward.
// Dependencies: thiserror, tga-core, tga-capability, tga-store
// ============================================================================

//! ## Overview
//! [`RuntimeError`] composes the capability validator's and state store's
//! error types via `#[from]`, scoped to what the runtime itself can fail on
//! (session lookup, lifecycle-state checks, chain re-validation). It never
//! invents a parallel error shape for a concern another crate already owns.
//! [`RuntimeError::transport_code`] performs the three-way coarsening §7
//! describes; the transport binding itself is out of scope here.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use tga_capability::ValidatorError;
use tga_core::HashError;
use tga_store::StoreError;

// ============================================================================
// SECTION: Runtime Error
// ============================================================================

/// Errors raised by [`crate::engine::Runtime`]'s operations.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// Capability decoding, signature, or constraint enforcement failed.
    #[error(transparent)]
    Validator(#[from] ValidatorError),

    /// The state store rejected or failed to perform a read or write.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Canonicalization or digest computation failed while building an
    /// entry or descriptor.
    #[error(transparent)]
    Hash(#[from] HashError),

    /// A warm-path session id did not resolve to a stored record.
    #[error("session not found: {0}")]
    SessionNotFound(String),

    /// A warm-path session's `expires_at` is at or before now.
    #[error("session expired: {0}")]
    SessionExpired(String),

    /// The supplied principal does not match the session's recorded one.
    #[error("principal mismatch: expected {expected}, got {actual}")]
    PrincipalMismatch {
        /// The principal recorded on the session.
        expected: String,
        /// The principal the caller supplied.
        actual: String,
    },

    /// The supplied tool identity or read-only constraint does not match
    /// the session's recorded constraints.
    #[error("constraint mismatch: {0}")]
    ConstraintMismatch(String),

    /// The trace is not in the lifecycle state an operation requires.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// `recover` could not load a state or log for the requested trace.
    #[error("state recovery failed: {0}")]
    StateRecoveryFailed(String),

    /// `recover`'s hash-chain or digest re-validation failed.
    #[error("state checksum mismatch: {0}")]
    StateChecksumMismatch(String),

    /// An operation failed for a reason with no more specific taxonomy
    /// entry (stored data in an unexpected shape, serialization failure
    /// outside the digest path).
    #[error("internal error: {0}")]
    InternalError(String),
}

// ============================================================================
// SECTION: Transport Error Coarsening
// ============================================================================

/// The three error codes §6/§7 permit a transport binding to surface.
///
/// The transport layer may coarsen any internal [`RuntimeError`] into one
/// of these, but must never silently recover from an integrity failure —
/// coarsening changes the caller-visible code, not whether the operation
/// aborted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorCode {
    /// The caller was not authorized to perform the requested operation.
    Unauthorized,
    /// The caller supplied arguments the runtime could not accept.
    InvalidArguments,
    /// An internal failure: storage, integrity, or lifecycle violation.
    InternalError,
}

impl TransportErrorCode {
    /// Returns the wire label for this code.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unauthorized => "UNAUTHORIZED",
            Self::InvalidArguments => "INVALID_ARGUMENTS",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }
}

impl RuntimeError {
    /// Coarsens this error into the transport-facing three-code taxonomy
    /// §7 describes.
    #[must_use]
    pub fn transport_code(&self) -> TransportErrorCode {
        match self {
            Self::Validator(_) | Self::SessionNotFound(_) | Self::SessionExpired(_) |
            Self::PrincipalMismatch { .. } | Self::ConstraintMismatch(_) => {
                TransportErrorCode::Unauthorized
            }
            Self::Store(StoreError::DuplicateSession(_)) => TransportErrorCode::Unauthorized,
            Self::Store(
                StoreError::SequenceGap { .. }
                | StoreError::HashChainBroken { .. }
                | StoreError::InvalidTransition { .. }
                | StoreError::DigestMismatch { .. }
                | StoreError::GenesisInvalid(_)
                | StoreError::Hash(_)
                | StoreError::Io(_)
                | StoreError::Corrupt(_),
            )
            | Self::Hash(_)
            | Self::InvalidState(_)
            | Self::StateRecoveryFailed(_)
            | Self::StateChecksumMismatch(_)
            | Self::InternalError(_) => TransportErrorCode::InternalError,
        }
    }
}

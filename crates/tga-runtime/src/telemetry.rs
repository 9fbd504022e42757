// tga-runtime/src/telemetry.rs
// ============================================================================
// Module: Runtime Diagnostics
// Description: A dependency-free event sink for runtime operation outcomes.
// Purpose: Let an embedder observe authorize/record/recover calls without
//          the runtime crate committing to any particular metrics backend.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Mirrors the shape of a transport-layer metrics seam: an enum naming
//! each operation, an enum naming its outcome, and a trait an embedder can
//! implement to wire the events into whatever observability stack it
//! already runs. [`NoopDiagnosticsSink`] is the default when nothing is
//! supplied.

// ============================================================================
// SECTION: Operation and Outcome
// ============================================================================

/// One of the four operations [`crate::engine::Runtime`] exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeOperation {
    /// `authorize_tool_call` — the cold path.
    AuthorizeCold,
    /// `authorize_warm_path` — the warm path.
    AuthorizeWarm,
    /// `record_tool_effect`.
    RecordToolEffect,
    /// `recover`.
    Recover,
}

impl RuntimeOperation {
    /// Returns the wire label for this operation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AuthorizeCold => "authorize_cold",
            Self::AuthorizeWarm => "authorize_warm",
            Self::RecordToolEffect => "record_tool_effect",
            Self::Recover => "recover",
        }
    }
}

/// Whether an operation succeeded or failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeOutcome {
    /// The operation returned successfully.
    Ok,
    /// The operation returned a [`crate::error::RuntimeError`].
    Error,
}

impl RuntimeOutcome {
    /// Returns the wire label for this outcome.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Error => "error",
        }
    }
}

// ============================================================================
// SECTION: Diagnostics Sink
// ============================================================================

/// Receives one event per completed runtime operation.
pub trait DiagnosticsSink: Send + Sync {
    /// Records that `operation` completed with `outcome`, for the given
    /// `trace_id` when one is applicable (the warm path may not yet know
    /// one; `recover` and the cold path always do).
    fn record(&self, operation: RuntimeOperation, outcome: RuntimeOutcome, trace_id: Option<&str>);
}

/// A [`DiagnosticsSink`] that discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopDiagnosticsSink;

impl DiagnosticsSink for NoopDiagnosticsSink {
    fn record(&self, _operation: RuntimeOperation, _outcome: RuntimeOutcome, _trace_id: Option<&str>) {}
}

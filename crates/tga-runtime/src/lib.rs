// tga-runtime/src/lib.rs
// ============================================================================
// Crate: tga-runtime
// Description: The Talos Governance Agent lifecycle engine.
// Purpose: Bind a capability validator and a state store together into the
//          four operations a tool-calling agent is governed through:
//          cold-path authorization, warm-path authorization, tool-effect
//          recording, and crash recovery.
// Dependencies: tga-core, tga-capability, tga-store
// ============================================================================

//! # tga-runtime
//!
//! The lifecycle engine sitting between a capability-issuing supervisor and
//! the tool servers an agent calls. It owns no transport of its own:
//! embedders construct a [`engine::Runtime`] over a chosen
//! [`tga_store::StateStore`] and a [`tga_core::Clock`], and call its four
//! operations directly.

#![forbid(unsafe_code)]

pub mod config;
pub mod descriptors;
pub mod engine;
pub mod error;
pub mod telemetry;

pub use config::RuntimeConfig;
pub use descriptors::AuthorizationDescriptor;
pub use descriptors::RecoveryReport;
pub use descriptors::ToolCallDescriptor;
pub use descriptors::ToolCallInvocation;
pub use descriptors::ToolEffect;
pub use descriptors::ToolEffectOutcome;
pub use descriptors::ToolEffectStatus;
pub use engine::Runtime;
pub use error::RuntimeError;
pub use error::TransportErrorCode;
pub use telemetry::DiagnosticsSink;
pub use telemetry::NoopDiagnosticsSink;
pub use telemetry::RuntimeOperation;
pub use telemetry::RuntimeOutcome;

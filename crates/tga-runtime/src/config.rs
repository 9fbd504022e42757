// tga-runtime/src/config.rs
// ============================================================================
// Module: Runtime Configuration
// Description: Plain-data construction options for a Runtime instance.
// Purpose: Carry the handful of options §6 names without a CLI-parsing
//          dependency the runtime crate has no use for.
// Dependencies: std
// ============================================================================

//! ## Overview
//! [`RuntimeConfig`] is assembled by whatever embeds the runtime (a
//! transport adapter, a test harness) and handed to [`crate::engine::Runtime::new`].
//! It carries no parsing logic of its own — the owning process decides how
//! its options arrive (file, environment, flags) and builds this struct.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;

// ============================================================================
// SECTION: Runtime Config
// ============================================================================

/// Construction-time options for a [`crate::engine::Runtime`].
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Location of the persistent store, when the chosen [`tga_store::StateStore`]
    /// adapter is file-backed. `None` for an in-memory store.
    pub store_path: Option<PathBuf>,

    /// PEM-encoded Ed25519 public key material the supervisor's capability
    /// tokens are verified against.
    pub supervisor_public_key: String,

    /// When `true`, the owning process should call
    /// [`tga_store::StateStore::delete_expired_sessions`] once at startup
    /// before serving any requests.
    pub startup_session_gc: bool,
}

impl RuntimeConfig {
    /// Builds a config from its two required fields, with
    /// `startup_session_gc` defaulted to `true`.
    #[must_use]
    pub fn new(supervisor_public_key: impl Into<String>, store_path: Option<PathBuf>) -> Self {
        Self {
            store_path,
            supervisor_public_key: supervisor_public_key.into(),
            startup_session_gc: true,
        }
    }
}

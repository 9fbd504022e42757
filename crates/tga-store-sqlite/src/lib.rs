// tga-store-sqlite/src/lib.rs
// ============================================================================
// Module: SQLite State Store
// Description: Durable StateStore backend using SQLite WAL.
// Purpose: Provide production-grade persistence for the execution log,
//          derived state, checkpoints, and warm-path sessions.
// Dependencies: tga-core, tga-store, rusqlite
// ============================================================================

//! ## Overview
//! This crate provides a SQLite-backed [`tga_store::StateStore`]
//! implementation that persists the append-only execution log, its derived
//! per-trace projection, checkpoints, and warm-path session records. It
//! shares [`tga_store::validate_append`] with the in-memory adapter, so a
//! log accepted by one backend is accepted by the other.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use store::SCHEMA_VERSION;
pub use store::SqliteStateStore;
pub use store::SqliteStoreConfig;
pub use store::SqliteStoreError;

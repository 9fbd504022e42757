// tga-store/src/memory.rs
// ============================================================================
// Module: In-Memory State Store
// Description: Process-local StateStore adapter for tests and the reference
//              in-memory deployment.
// Purpose: Exercise the runtime without a SQLite dependency.
// Dependencies: std::sync, tga-core, crate::{error, locks, port, validation}
// ============================================================================

//! ## Overview
//! [`InMemoryStateStore`] holds every table the port describes as plain
//! `Mutex`-guarded maps. It enforces exactly the same append-time
//! invariants [`tga_store_sqlite`](../tga_store_sqlite/index.html)'s durable
//! adapter does, via the shared [`crate::validation::validate_append`]
//! helper, so scenario tests produce identical digests against either
//! backend.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::sync::Mutex;

use tga_core::CapabilityJti;
use tga_core::ExecutionCheckpoint;
use tga_core::ExecutionState;
use tga_core::LogEntry;
use tga_core::PlanId;
use tga_core::PrincipalId;
use tga_core::SessionId;
use tga_core::SessionRecord;
use tga_core::TraceId;

use crate::error::StoreError;
use crate::locks::TraceLockGuard;
use crate::locks::TraceLockRegistry;
use crate::port::StateStore;
use crate::validation::validate_append;

// ============================================================================
// SECTION: Store
// ============================================================================

/// In-process [`StateStore`] backed by plain mutex-guarded maps.
#[derive(Default)]
pub struct InMemoryStateStore {
    locks: TraceLockRegistry,
    logs: Mutex<HashMap<TraceId, Vec<LogEntry>>>,
    states: Mutex<HashMap<TraceId, ExecutionState>>,
    checkpoints: Mutex<HashMap<TraceId, Vec<ExecutionCheckpoint>>>,
    sessions: Mutex<HashMap<SessionId, SessionRecord>>,
    session_identity_index: Mutex<HashMap<(PrincipalId, CapabilityJti), SessionId>>,
}

impl InMemoryStateStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_poisoned_msg(what: &str) -> String {
        format!("in-memory {what} lock poisoned by a prior panic")
    }
}

impl StateStore for InMemoryStateStore {
    fn acquire_trace_lock(&self, trace_id: &TraceId) -> TraceLockGuard {
        self.locks.acquire(trace_id)
    }

    fn load_state(&self, trace_id: &TraceId) -> Result<Option<ExecutionState>, StoreError> {
        let states = self.states.lock().map_err(|_| StoreError::Io(Self::lock_poisoned_msg("state")))?;
        Ok(states.get(trace_id).cloned())
    }

    fn append_log_entry(&self, entry: &LogEntry, plan_id: &PlanId) -> Result<(), StoreError> {
        let mut logs = self.logs.lock().map_err(|_| StoreError::Io(Self::lock_poisoned_msg("log")))?;
        let mut states = self.states.lock().map_err(|_| StoreError::Io(Self::lock_poisoned_msg("state")))?;

        let entries = logs.entry(entry.trace_id.clone()).or_default();
        validate_append(entries.last(), entry)?;

        entries.push(entry.clone());

        let next_state = match states.get(&entry.trace_id) {
            Some(existing) => {
                let mut updated = existing.clone();
                updated.apply(entry.to_state, entry.sequence_number, entry.entry_digest.clone())?;
                updated
            }
            None => ExecutionState::genesis(
                entry.trace_id.clone(),
                plan_id.clone(),
                entry.to_state,
                entry.sequence_number,
                entry.entry_digest.clone(),
            ),
        };
        states.insert(entry.trace_id.clone(), next_state);
        Ok(())
    }

    fn list_log_entries(&self, trace_id: &TraceId, after_seq: u64) -> Result<Vec<LogEntry>, StoreError> {
        let logs = self.logs.lock().map_err(|_| StoreError::Io(Self::lock_poisoned_msg("log")))?;
        Ok(logs
            .get(trace_id)
            .map(|entries| {
                entries
                    .iter()
                    .filter(|entry| entry.sequence_number > after_seq)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn write_checkpoint(&self, checkpoint: &ExecutionCheckpoint) -> Result<(), StoreError> {
        let mut checkpoints =
            self.checkpoints.lock().map_err(|_| StoreError::Io(Self::lock_poisoned_msg("checkpoint")))?;
        checkpoints.entry(checkpoint.trace_id.clone()).or_default().push(checkpoint.clone());
        Ok(())
    }

    fn load_latest_checkpoint(&self, trace_id: &TraceId) -> Result<Option<ExecutionCheckpoint>, StoreError> {
        let checkpoints =
            self.checkpoints.lock().map_err(|_| StoreError::Io(Self::lock_poisoned_msg("checkpoint")))?;
        Ok(checkpoints.get(trace_id).and_then(|list| list.last().cloned()))
    }

    fn put_session(&self, session: &SessionRecord) -> Result<(), StoreError> {
        let mut sessions = self.sessions.lock().map_err(|_| StoreError::Io(Self::lock_poisoned_msg("session")))?;
        let mut index =
            self.session_identity_index.lock().map_err(|_| StoreError::Io(Self::lock_poisoned_msg("session index")))?;

        let identity = (session.principal_id.clone(), session.capability_jti.clone());
        if index.contains_key(&identity) {
            return Err(StoreError::DuplicateSession(format!(
                "principal {} capability_jti {}",
                session.principal_id, session.capability_jti
            )));
        }

        index.insert(identity, session.session_id.clone());
        sessions.insert(session.session_id.clone(), session.clone());
        Ok(())
    }

    fn get_session(&self, session_id: &SessionId) -> Result<Option<SessionRecord>, StoreError> {
        let sessions = self.sessions.lock().map_err(|_| StoreError::Io(Self::lock_poisoned_msg("session")))?;
        Ok(sessions.get(session_id).cloned())
    }

    fn touch_session(&self, session_id: &SessionId, now: &str) -> Result<(), StoreError> {
        let mut sessions = self.sessions.lock().map_err(|_| StoreError::Io(Self::lock_poisoned_msg("session")))?;
        if let Some(session) = sessions.get_mut(session_id) {
            session.last_seen_at = now.to_string();
        }
        Ok(())
    }

    fn delete_expired_sessions(&self, now: &str) -> Result<u64, StoreError> {
        let mut sessions = self.sessions.lock().map_err(|_| StoreError::Io(Self::lock_poisoned_msg("session")))?;
        let mut index =
            self.session_identity_index.lock().map_err(|_| StoreError::Io(Self::lock_poisoned_msg("session index")))?;

        let expired: Vec<SessionId> = sessions
            .values()
            .filter(|session| session.is_expired(now))
            .map(|session| session.session_id.clone())
            .collect();

        for session_id in &expired {
            if let Some(session) = sessions.remove(session_id) {
                index.remove(&(session.principal_id, session.capability_jti));
            }
        }

        Ok(u64::try_from(expired.len()).unwrap_or(u64::MAX))
    }
}

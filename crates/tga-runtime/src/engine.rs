// tga-runtime/src/engine.rs
// ============================================================================
// Module: Lifecycle Engine
// Description: The four operations an agent is governed through.
// Purpose: Bind a capability validator and a state store into
//          authorize_tool_call, authorize_warm_path, record_tool_effect,
//          and recover.
// Dependencies: ed25519-dalek, serde_json, tga-core, tga-capability,
//               tga-store
// ============================================================================

//! ## Overview
//! [`Runtime`] holds one [`tga_store::StateStore`] adapter, one
//! [`tga_core::Clock`], and the supervisor's Ed25519 public key. Every
//! mutation it performs for a given trace happens under that trace's lock,
//! acquired once at the start of the operation and held for its whole
//! read-validate-append sequence (§5). `authorize_warm_path` never writes
//! to the execution log — only `touch_session`, synchronously, before
//! returning.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use ed25519_dalek::VerifyingKey;
use serde_json::Value;

use tga_capability::CapabilityConstraints;
use tga_capability::CapabilityValidator;
use tga_capability::MUTATION_PREFIXES;
use tga_capability::calculate_capability_digest;
use tga_capability::load_public_key;

use tga_core::ArtifactType;
use tga_core::Clock;
use tga_core::ExecutionStateValue;
use tga_core::HashDigest;
use tga_core::IdempotencyKey;
use tga_core::LogEntry;
use tga_core::PlanId;
use tga_core::PrincipalId;
use tga_core::SessionId;
use tga_core::SessionRecord;
use tga_core::ToolCallId;
use tga_core::TraceId;
use tga_core::canonical::hash_canonical_json;
use tga_core::format_iso8601_millis;
use tga_core::idgen;
use tga_core::log::LOG_ENTRY_SCHEMA_ID;
use tga_core::log::LOG_ENTRY_SCHEMA_VERSION;

use tga_store::StateStore;

use crate::config::RuntimeConfig;
use crate::descriptors::AuthorizationDescriptor;
use crate::descriptors::RecoveryReport;
use crate::descriptors::ToolCallDescriptor;
use crate::descriptors::ToolCallInvocation;
use crate::descriptors::ToolEffect;
use crate::descriptors::ToolEffectStatus;
use crate::error::RuntimeError;
use crate::telemetry::DiagnosticsSink;
use crate::telemetry::NoopDiagnosticsSink;
use crate::telemetry::RuntimeOperation;
use crate::telemetry::RuntimeOutcome;

// ============================================================================
// SECTION: Runtime
// ============================================================================

/// The lifecycle engine: one state store, one clock, one trusted key.
pub struct Runtime<S: StateStore, C: Clock> {
    /// Backend holding the execution log, derived state, checkpoints, and
    /// warm-path sessions.
    store: S,
    /// Source of "now", abstracted for deterministic testing.
    clock: C,
    /// The supervisor's Ed25519 public key every capability is verified
    /// against.
    public_key: VerifyingKey,
    /// Sink for per-operation diagnostics; defaults to a no-op.
    diagnostics: Arc<dyn DiagnosticsSink>,
}

impl<S: StateStore, C: Clock> Runtime<S, C> {
    /// Builds a runtime from raw PEM/base64/raw Ed25519 key material.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::Validator`] if `supervisor_public_key` does
    /// not parse as Ed25519 key material.
    pub fn new(store: S, clock: C, supervisor_public_key: &str) -> Result<Self, RuntimeError> {
        let public_key = load_public_key(supervisor_public_key)?;
        Ok(Self { store, clock, public_key, diagnostics: Arc::new(NoopDiagnosticsSink) })
    }

    /// Builds a runtime from a [`RuntimeConfig`]. `config.store_path` and
    /// `config.startup_session_gc` are consulted by the embedder when
    /// constructing `store`; this constructor only consumes the public key.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::Validator`] if the configured key does not
    /// parse as Ed25519 key material.
    pub fn from_config(store: S, clock: C, config: &RuntimeConfig) -> Result<Self, RuntimeError> {
        Self::new(store, clock, &config.supervisor_public_key)
    }

    /// Returns `self` with `diagnostics` replacing the default no-op sink.
    #[must_use]
    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn DiagnosticsSink>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Builds a capability validator borrowing this runtime's key and
    /// clock. Cheap; constructed fresh per call since it borrows `clock`.
    fn validator(&self) -> CapabilityValidator<'_> {
        CapabilityValidator::new(self.public_key, &self.clock)
    }

    /// Emits a diagnostics event, ignoring the concrete `Result` type.
    fn diagnose<T>(&self, operation: RuntimeOperation, trace_id: Option<&str>, result: &Result<T, RuntimeError>) {
        let outcome = if result.is_ok() { RuntimeOutcome::Ok } else { RuntimeOutcome::Error };
        self.diagnostics.record(operation, outcome, trace_id);
    }

    // ------------------------------------------------------------------
    // Cold path
    // ------------------------------------------------------------------

    /// Authorizes a tool call from a capability token, minting a warm-path
    /// session and, if this is the first call seen for the trace, the
    /// genesis entry pair establishing it.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::Validator`] when the capability fails to
    /// decode, verify, or match `tool_server`/`tool_name`/its read-only
    /// constraint. Returns [`RuntimeError::InvalidState`] when the trace
    /// already exists but is not in `AUTHORIZED`. Returns
    /// [`RuntimeError::Store`] on a storage-layer or integrity failure. No
    /// log entries or session are persisted on any error path.
    pub fn authorize_tool_call(
        &self,
        capability_jws: &str,
        tool_server: &str,
        tool_name: &str,
        args: &Value,
    ) -> Result<AuthorizationDescriptor, RuntimeError> {
        let result = self.authorize_tool_call_inner(capability_jws, tool_server, tool_name, args);
        let trace_id = result.as_ref().ok().and_then(|d| d.trace_id.as_ref()).map(TraceId::as_str);
        self.diagnose(RuntimeOperation::AuthorizeCold, trace_id, &result);
        result
    }

    /// The body of [`Self::authorize_tool_call`], split out so diagnostics
    /// can wrap it uniformly.
    fn authorize_tool_call_inner(
        &self,
        capability_jws: &str,
        tool_server: &str,
        tool_name: &str,
        args: &Value,
    ) -> Result<AuthorizationDescriptor, RuntimeError> {
        let decoded = self.validator().decode_and_verify(capability_jws)?;
        CapabilityValidator::validate_tool_call(&decoded, tool_server, tool_name, args)?;

        let _lock = self.store.acquire_trace_lock(&decoded.trace_id);

        let now = self.clock.now_iso8601();
        let principal_id = PrincipalId::new(decoded.claims.iss.clone());
        let session_id = SessionId::new(idgen::generate(&self.clock));
        let capability_jti = decoded.claims.nonce.clone().into();
        let expires_at = format_iso8601_millis(decoded.claims.exp.saturating_mul(1000));
        let constraints = serde_json::to_value(&decoded.claims.constraints)
            .map_err(|err| RuntimeError::InternalError(err.to_string()))?;

        let existing = self.store.load_state(&decoded.trace_id)?;
        if let Some(state) = &existing {
            if state.current_state != ExecutionStateValue::Authorized {
                return Err(RuntimeError::InvalidState(format!(
                    "trace {} is {:?}, expected AUTHORIZED",
                    decoded.trace_id, state.current_state
                )));
            }
        }

        let session = SessionRecord {
            session_id: session_id.clone(),
            principal_id: principal_id.clone(),
            capability_jti,
            capability_kid: decoded.kid.clone(),
            expires_at,
            constraints,
            created_at: now.clone(),
            last_seen_at: now.clone(),
        };
        self.store.put_session(&session)?;

        let (last_seq, last_digest) = match existing {
            None => {
                let action_digest = hash_canonical_json(&decoded.claims)?;
                let genesis = finalize_entry(LogEntry {
                    schema_id: LOG_ENTRY_SCHEMA_ID.to_string(),
                    schema_version: LOG_ENTRY_SCHEMA_VERSION.to_string(),
                    trace_id: decoded.trace_id.clone(),
                    principal_id: principal_id.clone(),
                    sequence_number: 1,
                    prev_entry_digest: HashDigest::zero(),
                    entry_digest: HashDigest::zero(),
                    ts: now.clone(),
                    from_state: ExecutionStateValue::Pending,
                    to_state: ExecutionStateValue::Pending,
                    artifact_type: ArtifactType::ActionRequest,
                    artifact_id: decoded.claims.nonce.clone(),
                    artifact_digest: action_digest,
                    tool_call_id: None,
                    idempotency_key: None,
                    session_id: None,
                })?;
                self.store.append_log_entry(&genesis, &decoded.plan_id)?;

                let capability_digest = calculate_capability_digest(capability_jws);
                let decision = finalize_entry(LogEntry {
                    schema_id: LOG_ENTRY_SCHEMA_ID.to_string(),
                    schema_version: LOG_ENTRY_SCHEMA_VERSION.to_string(),
                    trace_id: decoded.trace_id.clone(),
                    principal_id: principal_id.clone(),
                    sequence_number: 2,
                    prev_entry_digest: genesis.entry_digest.clone(),
                    entry_digest: HashDigest::zero(),
                    ts: now.clone(),
                    from_state: ExecutionStateValue::Pending,
                    to_state: ExecutionStateValue::Authorized,
                    artifact_type: ArtifactType::SupervisorDecision,
                    artifact_id: decoded.claims.nonce.clone(),
                    artifact_digest: capability_digest,
                    tool_call_id: None,
                    idempotency_key: None,
                    session_id: None,
                })?;
                self.store.append_log_entry(&decision, &decoded.plan_id)?;
                (decision.sequence_number, decision.entry_digest)
            }
            Some(state) => (state.last_sequence_number, state.last_entry_digest),
        };

        let tool_call_id = ToolCallId::new(session_id.as_str());
        let idempotency_key = IdempotencyKey::new(idgen::generate(&self.clock));
        let capability_digest = calculate_capability_digest(capability_jws);
        let descriptor = ToolCallDescriptor {
            tool_call_id: tool_call_id.clone(),
            trace_id: decoded.trace_id.clone(),
            plan_id: decoded.plan_id.clone(),
            capability_digest,
            call: ToolCallInvocation {
                server: tool_server.to_string(),
                name: tool_name.to_string(),
                args: args.clone(),
            },
            idempotency_key: idempotency_key.clone(),
            session_id: session_id.clone(),
        };
        let descriptor_digest = hash_canonical_json(&descriptor)?;
        let args_digest = hash_canonical_json(args)?;

        let tool_call_entry = finalize_entry(LogEntry {
            schema_id: LOG_ENTRY_SCHEMA_ID.to_string(),
            schema_version: LOG_ENTRY_SCHEMA_VERSION.to_string(),
            trace_id: decoded.trace_id.clone(),
            principal_id,
            sequence_number: last_seq + 1,
            prev_entry_digest: last_digest,
            entry_digest: HashDigest::zero(),
            ts: now,
            from_state: ExecutionStateValue::Authorized,
            to_state: ExecutionStateValue::Executing,
            artifact_type: ArtifactType::ToolCall,
            artifact_id: tool_call_id.as_str().to_string(),
            artifact_digest: descriptor_digest.clone(),
            tool_call_id: Some(tool_call_id.clone()),
            idempotency_key: Some(idempotency_key),
            session_id: Some(session_id.clone()),
        })?;
        self.store.append_log_entry(&tool_call_entry, &decoded.plan_id)?;

        Ok(AuthorizationDescriptor {
            tool_call_id,
            session_id,
            trace_id: Some(decoded.trace_id),
            sequence_number: Some(tool_call_entry.sequence_number),
            artifact_digest: Some(tool_call_entry.artifact_digest),
            args_digest,
        })
    }

    // ------------------------------------------------------------------
    // Warm path
    // ------------------------------------------------------------------

    /// Authorizes a tool call against an already-minted session, without
    /// touching the execution log.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::SessionNotFound`], [`RuntimeError::SessionExpired`],
    /// [`RuntimeError::PrincipalMismatch`], or [`RuntimeError::ConstraintMismatch`]
    /// when the session or its constraints do not admit this call. Returns
    /// [`RuntimeError::Store`] on a storage-layer failure.
    pub fn authorize_warm_path(
        &self,
        session_id: &SessionId,
        principal_id: &PrincipalId,
        tool_server: &str,
        tool_name: &str,
        args: &Value,
    ) -> Result<AuthorizationDescriptor, RuntimeError> {
        let result = self.authorize_warm_path_inner(session_id, principal_id, tool_server, tool_name, args);
        self.diagnose(RuntimeOperation::AuthorizeWarm, None, &result);
        result
    }

    /// The body of [`Self::authorize_warm_path`].
    fn authorize_warm_path_inner(
        &self,
        session_id: &SessionId,
        principal_id: &PrincipalId,
        tool_server: &str,
        tool_name: &str,
        args: &Value,
    ) -> Result<AuthorizationDescriptor, RuntimeError> {
        let session = self
            .store
            .get_session(session_id)?
            .ok_or_else(|| RuntimeError::SessionNotFound(session_id.as_str().to_string()))?;

        let now = self.clock.now_iso8601();
        if session.is_expired(&now) {
            return Err(RuntimeError::SessionExpired(session_id.as_str().to_string()));
        }
        if &session.principal_id != principal_id {
            return Err(RuntimeError::PrincipalMismatch {
                expected: session.principal_id.as_str().to_string(),
                actual: principal_id.as_str().to_string(),
            });
        }

        let constraints: CapabilityConstraints = serde_json::from_value(session.constraints.clone())
            .map_err(|err| RuntimeError::InternalError(err.to_string()))?;
        if constraints.tool_server != tool_server || constraints.tool_name != tool_name {
            return Err(RuntimeError::ConstraintMismatch(format!(
                "{tool_server}:{tool_name}, expected {}:{}",
                constraints.tool_server, constraints.tool_name
            )));
        }
        if constraints.read_only && MUTATION_PREFIXES.iter().any(|prefix| tool_name.starts_with(prefix)) {
            return Err(RuntimeError::ConstraintMismatch(format!(
                "read-only session cannot call mutating tool {tool_name}"
            )));
        }

        self.store.touch_session(session_id, &now)?;

        let args_digest = hash_canonical_json(args)?;
        let tool_call_id = ToolCallId::new(session_id.as_str());

        Ok(AuthorizationDescriptor {
            tool_call_id,
            session_id: session_id.clone(),
            trace_id: None,
            sequence_number: None,
            artifact_digest: None,
            args_digest,
        })
    }

    // ------------------------------------------------------------------
    // Tool effect recording
    // ------------------------------------------------------------------

    /// Records a tool server's reported outcome for a dispatched call,
    /// closing the trace out to `COMPLETED` or `FAILED`.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::InvalidState`] when the trace is not
    /// `EXECUTING`. Returns [`RuntimeError::Store`] on a storage-layer or
    /// integrity failure.
    pub fn record_tool_effect(&self, trace_id: &TraceId, effect: &ToolEffect) -> Result<LogEntry, RuntimeError> {
        let result = self.record_tool_effect_inner(trace_id, effect);
        self.diagnose(RuntimeOperation::RecordToolEffect, Some(trace_id.as_str()), &result);
        result
    }

    /// The body of [`Self::record_tool_effect`].
    fn record_tool_effect_inner(&self, trace_id: &TraceId, effect: &ToolEffect) -> Result<LogEntry, RuntimeError> {
        let _lock = self.store.acquire_trace_lock(trace_id);

        let state = self
            .store
            .load_state(trace_id)?
            .ok_or_else(|| RuntimeError::InvalidState(format!("trace {trace_id} has no state")))?;
        if state.current_state != ExecutionStateValue::Executing {
            return Err(RuntimeError::InvalidState(format!(
                "trace {trace_id} is {:?}, expected EXECUTING",
                state.current_state
            )));
        }

        let entries = self.store.list_log_entries(trace_id, 0)?;
        let last = entries
            .last()
            .ok_or_else(|| RuntimeError::InvalidState(format!("trace {trace_id} has an empty log")))?;
        let principal_id = last.principal_id.clone();

        let to_state = match effect.outcome.status {
            ToolEffectStatus::Success => ExecutionStateValue::Completed,
            ToolEffectStatus::Failure => ExecutionStateValue::Failed,
        };
        let effect_digest = hash_canonical_json(effect)?;
        let now = self.clock.now_iso8601();

        let entry = finalize_entry(LogEntry {
            schema_id: LOG_ENTRY_SCHEMA_ID.to_string(),
            schema_version: LOG_ENTRY_SCHEMA_VERSION.to_string(),
            trace_id: trace_id.clone(),
            principal_id,
            sequence_number: state.last_sequence_number + 1,
            prev_entry_digest: state.last_entry_digest,
            entry_digest: HashDigest::zero(),
            ts: now,
            from_state: ExecutionStateValue::Executing,
            to_state,
            artifact_type: ArtifactType::ToolEffect,
            artifact_id: effect.tool_call_id.as_str().to_string(),
            artifact_digest: effect_digest,
            tool_call_id: Some(effect.tool_call_id.clone()),
            idempotency_key: effect.idempotency_key.clone(),
            session_id: None,
        })?;
        self.store.append_log_entry(&entry, &plan_id_of(trace_id))?;

        Ok(entry)
    }

    // ------------------------------------------------------------------
    // Recovery
    // ------------------------------------------------------------------

    /// Re-validates the full hash chain for `trace_id` and reports whether
    /// a dispatched tool call was left without a recorded effect.
    ///
    /// Purely read-only: never appends an entry, regardless of outcome.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::StateRecoveryFailed`] when no state or no
    /// log entries exist for `trace_id`. Returns
    /// [`RuntimeError::StateChecksumMismatch`] when the chain fails
    /// linkage or digest re-validation.
    pub fn recover(&self, trace_id: &TraceId) -> Result<RecoveryReport, RuntimeError> {
        let result = self.recover_inner(trace_id);
        self.diagnose(RuntimeOperation::Recover, Some(trace_id.as_str()), &result);
        result
    }

    /// The body of [`Self::recover`].
    fn recover_inner(&self, trace_id: &TraceId) -> Result<RecoveryReport, RuntimeError> {
        let _lock = self.store.acquire_trace_lock(trace_id);

        let state = self
            .store
            .load_state(trace_id)?
            .ok_or_else(|| RuntimeError::StateRecoveryFailed(format!("no state for trace {trace_id}")))?;
        let entries = self.store.list_log_entries(trace_id, 0)?;
        if entries.is_empty() {
            return Err(RuntimeError::StateRecoveryFailed(format!("no log entries for trace {trace_id}")));
        }

        let mut prev_digest = HashDigest::zero();
        for entry in &entries {
            if entry.prev_entry_digest != prev_digest {
                return Err(RuntimeError::StateChecksumMismatch(format!(
                    "sequence {} has prev_entry_digest mismatch",
                    entry.sequence_number
                )));
            }
            let recomputed = entry.compute_digest()?;
            if recomputed != entry.entry_digest {
                return Err(RuntimeError::StateChecksumMismatch(format!(
                    "sequence {} entry digest does not match its content",
                    entry.sequence_number
                )));
            }
            prev_digest = entry.entry_digest.clone();
        }

        let latest_entry_digest = prev_digest;

        let (re_dispatched, tool_call) = if state.current_state == ExecutionStateValue::Executing {
            let dispatched = entries.iter().rev().find(|e| e.artifact_type == ArtifactType::ToolCall);
            let has_effect = entries.iter().any(|e| e.artifact_type == ArtifactType::ToolEffect);
            match dispatched {
                Some(call) if !has_effect => (true, Some(call.clone())),
                _ => (false, None),
            }
        } else {
            (false, None)
        };

        Ok(RecoveryReport {
            trace_id: trace_id.clone(),
            recovered_state: state.current_state,
            recovered_from_seq: state.last_sequence_number,
            re_dispatched,
            tool_call,
            latest_entry_digest,
        })
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Finalizes a [`LogEntry`] built with a placeholder `entry_digest` by
/// computing and filling in the real one.
fn finalize_entry(mut entry: LogEntry) -> Result<LogEntry, RuntimeError> {
    entry.entry_digest = entry.compute_digest()?;
    Ok(entry)
}

/// `append_log_entry`'s `plan_id` parameter is only consulted on a trace's
/// genesis append; every other call already has state, so any syntactically
/// valid id satisfies the store.
fn plan_id_of(trace_id: &TraceId) -> PlanId {
    PlanId::new(trace_id.as_str())
}

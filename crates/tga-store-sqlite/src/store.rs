// tga-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite State Store
// Description: Durable StateStore backed by SQLite WAL.
// Purpose: Persist the execution log, derived state, checkpoints, and
//          warm-path sessions with crash durability and hardened file
//          permissions.
// Dependencies: tga-core, tga-store, rusqlite, serde_json, thiserror
// ============================================================================

//! ## Overview
//! [`SqliteStateStore`] implements [`tga_store::StateStore`] against a
//! single SQLite file. Each table stores its row's canonical JSON body
//! verbatim (`data` columns), with only the columns needed for lookups and
//! uniqueness pulled out; `append_log_entry` runs the read, validate, and
//! two writes (log row + state row) inside one transaction, so a crash
//! mid-append leaves the prior state intact rather than half-updated.
//! Security posture: the database file itself is the trust boundary —
//! [`Self::open`] hardens new files to mode 0600 where the filesystem
//! supports it.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;
use std::sync::Mutex;

use rusqlite::Connection;
use rusqlite::ErrorCode;
use rusqlite::OpenFlags;
use rusqlite::OptionalExtension;
use rusqlite::params;
use thiserror::Error;

use tga_core::Clock;
use tga_core::ExecutionCheckpoint;
use tga_core::ExecutionState;
use tga_core::LogEntry;
use tga_core::PlanId;
use tga_core::SessionId;
use tga_core::SessionRecord;
use tga_core::SystemClock;
use tga_core::TraceId;
use tga_store::StateStore;
use tga_store::StoreError;
use tga_store::TraceLockGuard;
use tga_store::TraceLockRegistry;
use tga_store::validate_append;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Schema version recorded in `schema_versions` on first initialization.
pub const SCHEMA_VERSION: &str = "1.0.0";
/// Default busy timeout applied to every connection.
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

// ============================================================================
// SECTION: Config
// ============================================================================

/// Configuration for the SQLite-backed state store.
#[derive(Debug, Clone)]
pub struct SqliteStoreConfig {
    /// Path to the SQLite database file.
    pub path: PathBuf,
    /// Busy timeout in milliseconds applied via `PRAGMA busy_timeout`.
    pub busy_timeout_ms: u64,
}

impl SqliteStoreConfig {
    /// Builds a config for `path` using the default busy timeout.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while opening or administering the SQLite backend itself,
/// before a failure is coarsened into a [`StoreError`].
#[derive(Debug, Error)]
pub enum SqliteStoreError {
    /// Filesystem-level failure (path validation, permission hardening).
    #[error("sqlite store io error: {0}")]
    Io(String),
    /// The SQLite engine reported an error.
    #[error("sqlite store db error: {0}")]
    Db(String),
    /// A stored row failed to deserialize or referenced data that is
    /// missing, which should be impossible absent external tampering.
    #[error("sqlite store corrupt: {0}")]
    Corrupt(String),
    /// The on-disk schema version does not match [`SCHEMA_VERSION`] and no
    /// migration path exists for it.
    #[error("sqlite store schema version mismatch: {0}")]
    VersionMismatch(String),
}

impl From<SqliteStoreError> for StoreError {
    fn from(error: SqliteStoreError) -> Self {
        match error {
            SqliteStoreError::Io(message) => Self::Io(message),
            SqliteStoreError::Db(message) => Self::Io(message),
            SqliteStoreError::Corrupt(message) | SqliteStoreError::VersionMismatch(message) => {
                Self::Corrupt(message)
            }
        }
    }
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// SQLite-backed [`StateStore`] with WAL durability and hardened file
/// permissions.
pub struct SqliteStateStore {
    connection: Mutex<Connection>,
    locks: TraceLockRegistry,
}

impl SqliteStateStore {
    /// Opens (creating if absent) the database at `config.path`, applying
    /// pragmas and schema, then returns a ready-to-use store.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] if the path is invalid, the file cannot
    /// be opened or hardened, or schema initialization fails.
    pub fn open(config: &SqliteStoreConfig) -> Result<Self, SqliteStoreError> {
        let mut connection = open_connection(config)?;
        initialize_schema(&mut connection)?;
        Ok(Self { connection: Mutex::new(connection), locks: TraceLockRegistry::new() })
    }

    fn lock_poisoned(&self) -> StoreError {
        StoreError::Io("sqlite connection mutex poisoned by a prior panic".to_string())
    }
}

impl StateStore for SqliteStateStore {
    fn acquire_trace_lock(&self, trace_id: &TraceId) -> TraceLockGuard {
        self.locks.acquire(trace_id)
    }

    fn load_state(&self, trace_id: &TraceId) -> Result<Option<ExecutionState>, StoreError> {
        let connection = self.connection.lock().map_err(|_| self.lock_poisoned())?;
        let row: Option<String> = connection
            .query_row(
                "SELECT data FROM execution_states WHERE trace_id = ?1",
                params![trace_id.as_str()],
                |row| row.get(0),
            )
            .optional()
            .map_err(|err| StoreError::Io(err.to_string()))?;
        row.map(|json| {
            serde_json::from_str(&json).map_err(|err| StoreError::Corrupt(err.to_string()))
        })
        .transpose()
    }

    fn append_log_entry(&self, entry: &LogEntry, plan_id: &PlanId) -> Result<(), StoreError> {
        let mut connection = self.connection.lock().map_err(|_| self.lock_poisoned())?;
        let tx = connection.transaction().map_err(|err| StoreError::Io(err.to_string()))?;

        let last_json: Option<String> = tx
            .query_row(
                "SELECT data FROM execution_logs WHERE trace_id = ?1 \
                 ORDER BY sequence_number DESC LIMIT 1",
                params![entry.trace_id.as_str()],
                |row| row.get(0),
            )
            .optional()
            .map_err(|err| StoreError::Io(err.to_string()))?;
        let last: Option<LogEntry> = last_json
            .map(|json| serde_json::from_str(&json).map_err(|err| StoreError::Corrupt(err.to_string())))
            .transpose()?;

        validate_append(last.as_ref(), entry)?;

        let entry_json =
            serde_json::to_string(entry).map_err(|err| StoreError::Corrupt(err.to_string()))?;
        tx.execute(
            "INSERT INTO execution_logs (trace_id, sequence_number, data) VALUES (?1, ?2, ?3)",
            params![entry.trace_id.as_str(), i64::try_from(entry.sequence_number).unwrap_or(i64::MAX), entry_json],
        )
        .map_err(|err| StoreError::Io(err.to_string()))?;

        let existing_json: Option<String> = tx
            .query_row(
                "SELECT data FROM execution_states WHERE trace_id = ?1",
                params![entry.trace_id.as_str()],
                |row| row.get(0),
            )
            .optional()
            .map_err(|err| StoreError::Io(err.to_string()))?;
        let existing: Option<ExecutionState> = existing_json
            .map(|json| serde_json::from_str(&json).map_err(|err| StoreError::Corrupt(err.to_string())))
            .transpose()?;

        let next_state = match existing {
            Some(mut state) => {
                state.apply(entry.to_state, entry.sequence_number, entry.entry_digest.clone())?;
                state
            }
            None => ExecutionState::genesis(
                entry.trace_id.clone(),
                plan_id.clone(),
                entry.to_state,
                entry.sequence_number,
                entry.entry_digest.clone(),
            ),
        };
        let state_json =
            serde_json::to_string(&next_state).map_err(|err| StoreError::Corrupt(err.to_string()))?;
        tx.execute(
            "INSERT INTO execution_states (trace_id, data) VALUES (?1, ?2) \
             ON CONFLICT(trace_id) DO UPDATE SET data = excluded.data",
            params![entry.trace_id.as_str(), state_json],
        )
        .map_err(|err| StoreError::Io(err.to_string()))?;

        tx.commit().map_err(|err| StoreError::Io(err.to_string()))?;
        Ok(())
    }

    fn list_log_entries(&self, trace_id: &TraceId, after_seq: u64) -> Result<Vec<LogEntry>, StoreError> {
        let connection = self.connection.lock().map_err(|_| self.lock_poisoned())?;
        let mut stmt = connection
            .prepare(
                "SELECT data FROM execution_logs WHERE trace_id = ?1 AND sequence_number > ?2 \
                 ORDER BY sequence_number ASC",
            )
            .map_err(|err| StoreError::Io(err.to_string()))?;
        let rows = stmt
            .query_map(
                params![trace_id.as_str(), i64::try_from(after_seq).unwrap_or(i64::MAX)],
                |row| row.get::<_, String>(0),
            )
            .map_err(|err| StoreError::Io(err.to_string()))?;
        rows.map(|row| {
            let json = row.map_err(|err| StoreError::Io(err.to_string()))?;
            serde_json::from_str(&json).map_err(|err| StoreError::Corrupt(err.to_string()))
        })
        .collect()
    }

    fn write_checkpoint(&self, checkpoint: &ExecutionCheckpoint) -> Result<(), StoreError> {
        let connection = self.connection.lock().map_err(|_| self.lock_poisoned())?;
        let json = serde_json::to_string(checkpoint).map_err(|err| StoreError::Corrupt(err.to_string()))?;
        connection
            .execute(
                "INSERT INTO checkpoints (trace_id, sequence_number, data) VALUES (?1, ?2, ?3)",
                params![
                    checkpoint.trace_id.as_str(),
                    i64::try_from(checkpoint.checkpoint_sequence_number).unwrap_or(i64::MAX),
                    json
                ],
            )
            .map_err(|err| StoreError::Io(err.to_string()))?;
        Ok(())
    }

    fn load_latest_checkpoint(&self, trace_id: &TraceId) -> Result<Option<ExecutionCheckpoint>, StoreError> {
        let connection = self.connection.lock().map_err(|_| self.lock_poisoned())?;
        let row: Option<String> = connection
            .query_row(
                "SELECT data FROM checkpoints WHERE trace_id = ?1 \
                 ORDER BY sequence_number DESC LIMIT 1",
                params![trace_id.as_str()],
                |row| row.get(0),
            )
            .optional()
            .map_err(|err| StoreError::Io(err.to_string()))?;
        row.map(|json| {
            serde_json::from_str(&json).map_err(|err| StoreError::Corrupt(err.to_string()))
        })
        .transpose()
    }

    fn put_session(&self, session: &SessionRecord) -> Result<(), StoreError> {
        let connection = self.connection.lock().map_err(|_| self.lock_poisoned())?;
        let json = serde_json::to_string(session).map_err(|err| StoreError::Corrupt(err.to_string()))?;
        let result = connection.execute(
            "INSERT INTO sessions (session_id, principal_id, capability_jti, expires_at, data) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                session.session_id.as_str(),
                session.principal_id.as_str(),
                session.capability_jti.as_str(),
                session.expires_at,
                json
            ],
        );
        match result {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(err, _)) if err.code == ErrorCode::ConstraintViolation => {
                Err(StoreError::DuplicateSession(format!(
                    "principal {} capability_jti {}",
                    session.principal_id, session.capability_jti
                )))
            }
            Err(err) => Err(StoreError::Io(err.to_string())),
        }
    }

    fn get_session(&self, session_id: &SessionId) -> Result<Option<SessionRecord>, StoreError> {
        let connection = self.connection.lock().map_err(|_| self.lock_poisoned())?;
        let row: Option<String> = connection
            .query_row(
                "SELECT data FROM sessions WHERE session_id = ?1",
                params![session_id.as_str()],
                |row| row.get(0),
            )
            .optional()
            .map_err(|err| StoreError::Io(err.to_string()))?;
        row.map(|json| {
            serde_json::from_str(&json).map_err(|err| StoreError::Corrupt(err.to_string()))
        })
        .transpose()
    }

    fn touch_session(&self, session_id: &SessionId, now: &str) -> Result<(), StoreError> {
        let connection = self.connection.lock().map_err(|_| self.lock_poisoned())?;
        let row: Option<String> = connection
            .query_row(
                "SELECT data FROM sessions WHERE session_id = ?1",
                params![session_id.as_str()],
                |row| row.get(0),
            )
            .optional()
            .map_err(|err| StoreError::Io(err.to_string()))?;
        let Some(json) = row else {
            return Ok(());
        };
        let mut session: SessionRecord =
            serde_json::from_str(&json).map_err(|err| StoreError::Corrupt(err.to_string()))?;
        session.last_seen_at = now.to_string();
        let updated =
            serde_json::to_string(&session).map_err(|err| StoreError::Corrupt(err.to_string()))?;
        connection
            .execute(
                "UPDATE sessions SET data = ?1 WHERE session_id = ?2",
                params![updated, session_id.as_str()],
            )
            .map_err(|err| StoreError::Io(err.to_string()))?;
        Ok(())
    }

    fn delete_expired_sessions(&self, now: &str) -> Result<u64, StoreError> {
        let connection = self.connection.lock().map_err(|_| self.lock_poisoned())?;
        let removed = connection
            .execute("DELETE FROM sessions WHERE expires_at < ?1", params![now])
            .map_err(|err| StoreError::Io(err.to_string()))?;
        Ok(u64::try_from(removed).unwrap_or(u64::MAX))
    }

    fn initialize(&self) -> Result<(), StoreError> {
        let mut connection = self.connection.lock().map_err(|_| self.lock_poisoned())?;
        initialize_schema(&mut connection).map_err(StoreError::from)
    }
}

// ============================================================================
// SECTION: Connection Setup
// ============================================================================

/// Ensures the parent directory for `path` exists.
fn ensure_parent_dir(path: &Path) -> Result<(), SqliteStoreError> {
    let Some(parent) = path.parent() else {
        return Ok(());
    };
    if parent.as_os_str().is_empty() {
        return Ok(());
    }
    std::fs::create_dir_all(parent).map_err(|err| SqliteStoreError::Io(err.to_string()))
}

/// Restricts a newly created database file to owner read/write, where the
/// filesystem supports POSIX permission bits. A no-op on platforms without
/// that concept.
#[cfg(unix)]
fn harden_file_permissions(path: &Path) -> Result<(), SqliteStoreError> {
    use std::os::unix::fs::PermissionsExt as _;
    let permissions = std::fs::Permissions::from_mode(0o600);
    std::fs::set_permissions(path, permissions).map_err(|err| SqliteStoreError::Io(err.to_string()))
}

/// No-op on non-Unix platforms, which lack POSIX permission bits.
#[cfg(not(unix))]
fn harden_file_permissions(_path: &Path) -> Result<(), SqliteStoreError> {
    Ok(())
}

/// Opens the SQLite connection, hardening a newly created file and
/// applying durability pragmas.
fn open_connection(config: &SqliteStoreConfig) -> Result<Connection, SqliteStoreError> {
    ensure_parent_dir(&config.path)?;
    let pre_existing = config.path.exists();

    let flags =
        OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
    let connection =
        Connection::open_with_flags(&config.path, flags).map_err(|err| SqliteStoreError::Db(err.to_string()))?;

    if !pre_existing {
        harden_file_permissions(&config.path)?;
    }

    apply_pragmas(&connection, config)?;
    Ok(connection)
}

/// Applies the durability pragmas mandated for the backing store: WAL
/// journaling, normal synchronous mode, and a bounded busy-wait.
fn apply_pragmas(connection: &Connection, config: &SqliteStoreConfig) -> Result<(), SqliteStoreError> {
    connection
        .execute_batch("PRAGMA journal_mode = WAL; PRAGMA synchronous = NORMAL;")
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .busy_timeout(std::time::Duration::from_millis(config.busy_timeout_ms))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    Ok(())
}

/// Creates the schema on first use and records [`SCHEMA_VERSION`]; on a
/// subsequent open, validates that the stored version still matches.
fn initialize_schema(connection: &mut Connection) -> Result<(), SqliteStoreError> {
    let tx = connection.transaction().map_err(|err| SqliteStoreError::Db(err.to_string()))?;

    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_versions (
            version TEXT PRIMARY KEY,
            applied_at TEXT NOT NULL
        );
        CREATE TABLE IF NOT EXISTS execution_logs (
            trace_id TEXT NOT NULL,
            sequence_number INTEGER NOT NULL,
            data TEXT NOT NULL,
            PRIMARY KEY (trace_id, sequence_number)
        );
        CREATE TABLE IF NOT EXISTS execution_states (
            trace_id TEXT PRIMARY KEY,
            data TEXT NOT NULL
        );
        CREATE TABLE IF NOT EXISTS checkpoints (
            trace_id TEXT NOT NULL,
            sequence_number INTEGER NOT NULL,
            data TEXT NOT NULL,
            PRIMARY KEY (trace_id, sequence_number)
        );
        CREATE TABLE IF NOT EXISTS sessions (
            session_id TEXT PRIMARY KEY,
            principal_id TEXT NOT NULL,
            capability_jti TEXT NOT NULL,
            expires_at TEXT NOT NULL,
            data TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_sessions_principal ON sessions(principal_id);
        CREATE INDEX IF NOT EXISTS idx_sessions_expires ON sessions(expires_at);
        CREATE UNIQUE INDEX IF NOT EXISTS uq_sessions_principal_jti
            ON sessions(principal_id, capability_jti);",
    )
    .map_err(|err| SqliteStoreError::Db(err.to_string()))?;

    let existing_version: Option<String> = tx
        .query_row("SELECT version FROM schema_versions LIMIT 1", params![], |row| row.get(0))
        .optional()
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;

    match existing_version {
        None => {
            tx.execute(
                "INSERT INTO schema_versions (version, applied_at) VALUES (?1, ?2)",
                params![SCHEMA_VERSION, SystemClock.now_iso8601()],
            )
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        }
        Some(version) if version == SCHEMA_VERSION => {}
        Some(other) => {
            return Err(SqliteStoreError::VersionMismatch(format!(
                "database was initialized at schema version {other}, this build expects {SCHEMA_VERSION}"
            )));
        }
    }

    tx.commit().map_err(|err| SqliteStoreError::Db(err.to_string()))
}

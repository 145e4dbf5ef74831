//! PRAGMA configuration applied to every SQLite connection.
//!
//! WAL mode, NORMAL sync, foreign_keys ON, configurable busy_timeout.
//! SQLite only enforces foreign keys on connections that turn them on.

use rusqlite::Connection;
use therapy_core::errors::StorageError;

/// Apply write-connection pragmas.
pub fn apply_pragmas(conn: &Connection, busy_timeout_ms: u64) -> Result<(), StorageError> {
    conn.execute_batch(&format!(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA foreign_keys = ON;
        PRAGMA busy_timeout = {busy_timeout_ms};
        PRAGMA temp_store = MEMORY;
        "
    ))
    .map_err(|e| StorageError::SqliteError {
        message: format!("failed to apply pragmas: {e}"),
    })
}

/// Apply read-only pragmas to a read connection.
pub fn apply_read_pragmas(conn: &Connection, busy_timeout_ms: u64) -> Result<(), StorageError> {
    conn.execute_batch(&format!(
        "
        PRAGMA query_only = ON;
        PRAGMA foreign_keys = ON;
        PRAGMA busy_timeout = {busy_timeout_ms};
        "
    ))
    .map_err(|e| StorageError::SqliteError {
        message: format!("failed to apply read pragmas: {e}"),
    })
}

/// Whether foreign-key enforcement is active on this connection.
pub fn foreign_keys_enabled(conn: &Connection) -> Result<bool, StorageError> {
    let on: i64 = conn.pragma_query_value(None, "foreign_keys", |row| row.get(0))?;
    Ok(on == 1)
}

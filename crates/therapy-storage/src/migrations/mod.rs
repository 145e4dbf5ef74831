//! Schema migrations using PRAGMA user_version.

pub mod v001_concept_tables;
pub mod v002_concept_foreign_keys;

use rusqlite::Connection;
use therapy_core::errors::StorageError;

use crate::connection::writer::with_savepoint;

type MigrationFn = fn(&Connection) -> Result<(), StorageError>;

const MIGRATIONS: &[(u32, &str, MigrationFn)] = &[
    (1, "concept_tables", v001_concept_tables::migrate),
    (2, "concept_foreign_keys", v002_concept_foreign_keys::migrate),
];

/// Highest version known to this build.
pub const LATEST_VERSION: u32 = 2;

/// Run all pending migrations.
///
/// Each version runs in its own savepoint together with the `user_version`
/// bump, so a failed version leaves the schema at the previous version.
pub fn run_migrations(conn: &Connection) -> Result<u32, StorageError> {
    let current = current_version(conn)?;

    for (version, name, migrate) in MIGRATIONS {
        if current >= *version {
            continue;
        }
        with_savepoint(conn, "schema_migration", |conn| {
            migrate(conn).map_err(|e| match e {
                e @ StorageError::MigrationFailed { .. } => e,
                other => StorageError::MigrationFailed {
                    version: *version,
                    message: other.to_string(),
                },
            })?;
            conn.pragma_update(None, "user_version", version)
                .map_err(|e| StorageError::MigrationFailed {
                    version: *version,
                    message: e.to_string(),
                })
        })?;
        tracing::info!(version = version, name = name, "applied migration");
    }

    current_version(conn)
}

/// Get the current schema version.
pub fn current_version(conn: &Connection) -> Result<u32, StorageError> {
    conn.pragma_query_value(None, "user_version", |row| row.get(0))
        .map_err(StorageError::from)
}

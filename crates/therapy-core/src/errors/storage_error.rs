//! Storage-layer errors for SQLite operations.

use rusqlite::ErrorCode;

use super::error_code::{self, TherapyErrorCode};

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("SQLite error: {message}")]
    SqliteError { message: String },

    #[error("migration failed at version {version}: {message}")]
    MigrationFailed { version: u32, message: String },

    #[error("foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    #[error("database is busy")]
    DbBusy,

    #[error("database corruption detected: {details}")]
    CorruptionDetected { details: String },

    #[error("invalid value in {table}.{column}: {value}")]
    InvalidValue {
        table: String,
        column: String,
        value: String,
    },
}

impl StorageError {
    /// Whether this is a referential-integrity failure reported by SQLite.
    pub fn is_foreign_key_violation(&self) -> bool {
        matches!(self, StorageError::ForeignKeyViolation { .. })
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(e: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(ref err, _) = e {
            if err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY {
                return StorageError::ForeignKeyViolation {
                    message: e.to_string(),
                };
            }
            match err.code {
                ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked => {
                    return StorageError::DbBusy;
                }
                ErrorCode::DatabaseCorrupt | ErrorCode::NotADatabase => {
                    return StorageError::CorruptionDetected {
                        details: e.to_string(),
                    };
                }
                _ => {}
            }
        }
        StorageError::SqliteError {
            message: e.to_string(),
        }
    }
}

impl TherapyErrorCode for StorageError {
    fn error_code(&self) -> &'static str {
        match self {
            StorageError::MigrationFailed { .. } => error_code::MIGRATION_FAILED,
            StorageError::ForeignKeyViolation { .. } => error_code::FOREIGN_KEY_VIOLATION,
            StorageError::DbBusy => error_code::DB_BUSY,
            StorageError::CorruptionDetected { .. } => error_code::DB_CORRUPT,
            StorageError::SqliteError { .. } | StorageError::InvalidValue { .. } => {
                error_code::STORAGE_ERROR
            }
        }
    }
}

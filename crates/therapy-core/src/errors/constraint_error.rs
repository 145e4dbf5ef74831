//! Foreign-key constraint errors.

use super::error_code::{self, TherapyErrorCode};
use super::StorageError;

/// Failures of a single add/drop constraint statement.
#[derive(Debug, thiserror::Error)]
pub enum ConstraintError {
    #[error("table {table} does not exist")]
    MissingTable { table: String },

    #[error("column {table}.{column} does not exist")]
    MissingColumn { table: String, column: String },

    #[error("constraint {name} for relation {table} already exists")]
    AlreadyExists { name: String, table: String },

    #[error("constraint {name} of relation {table} does not exist")]
    NotFound { name: String, table: String },

    #[error(
        "insert or update on table {table} violates foreign key constraint {name}: \
         {orphan_count} row(s) reference missing {column} values, e.g. {sample:?}"
    )]
    ReferentialViolation {
        name: String,
        table: String,
        column: String,
        orphan_count: u64,
        sample: Vec<String>,
    },

    #[error(
        "foreign key constraint {name} cannot be implemented: {table}.{column} is \
         {child_type} but {parent_table}.{parent_column} is {parent_type}"
    )]
    TypeMismatch {
        name: String,
        table: String,
        column: String,
        child_type: String,
        parent_table: String,
        parent_column: String,
        parent_type: String,
    },

    #[error("no unique constraint matching given keys for referenced table {table} ({column})")]
    ParentKeyNotUnique { table: String, column: String },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<rusqlite::Error> for ConstraintError {
    fn from(e: rusqlite::Error) -> Self {
        ConstraintError::Storage(StorageError::from(e))
    }
}

impl TherapyErrorCode for ConstraintError {
    fn error_code(&self) -> &'static str {
        match self {
            ConstraintError::MissingTable { .. } => error_code::MISSING_TABLE,
            ConstraintError::MissingColumn { .. } => error_code::MISSING_COLUMN,
            ConstraintError::AlreadyExists { .. } => error_code::CONSTRAINT_EXISTS,
            ConstraintError::NotFound { .. } => error_code::CONSTRAINT_NOT_FOUND,
            ConstraintError::ReferentialViolation { .. } => error_code::REFERENTIAL_VIOLATION,
            ConstraintError::TypeMismatch { .. } => error_code::TYPE_MISMATCH,
            ConstraintError::ParentKeyNotUnique { .. } => error_code::PARENT_KEY_NOT_UNIQUE,
            ConstraintError::Storage(e) => e.error_code(),
        }
    }
}

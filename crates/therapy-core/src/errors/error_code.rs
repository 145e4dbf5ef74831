//! TherapyErrorCode trait for stable, machine-readable error codes.

/// Every error enum implements this to expose a structured code string.
pub trait TherapyErrorCode {
    /// Returns the error code string (e.g., "CONSTRAINT_EXISTS").
    fn error_code(&self) -> &'static str;

    /// Returns the formatted error string: `[ERROR_CODE] message`.
    fn coded_string(&self) -> String
    where
        Self: std::fmt::Display,
    {
        format!("[{}] {}", self.error_code(), self)
    }
}

pub const STORAGE_ERROR: &str = "STORAGE_ERROR";
pub const MIGRATION_FAILED: &str = "MIGRATION_FAILED";
pub const FOREIGN_KEY_VIOLATION: &str = "FOREIGN_KEY_VIOLATION";
pub const DB_BUSY: &str = "DB_BUSY";
pub const DB_CORRUPT: &str = "DB_CORRUPT";
pub const MISSING_TABLE: &str = "MISSING_TABLE";
pub const MISSING_COLUMN: &str = "MISSING_COLUMN";
pub const CONSTRAINT_EXISTS: &str = "CONSTRAINT_EXISTS";
pub const CONSTRAINT_NOT_FOUND: &str = "CONSTRAINT_NOT_FOUND";
pub const REFERENTIAL_VIOLATION: &str = "REFERENTIAL_VIOLATION";
pub const TYPE_MISMATCH: &str = "TYPE_MISMATCH";
pub const PARENT_KEY_NOT_UNIQUE: &str = "PARENT_KEY_NOT_UNIQUE";
pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
pub const ETL_ERROR: &str = "ETL_ERROR";

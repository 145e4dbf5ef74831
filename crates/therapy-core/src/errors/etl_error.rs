//! Source loading errors.

use super::error_code::{self, TherapyErrorCode};
use super::StorageError;

#[derive(Debug, thiserror::Error)]
pub enum EtlError {
    #[error("source file not found: {path}")]
    FileNotFound { path: String },

    #[error("failed to read {path}: {message}")]
    Io { path: String, message: String },

    #[error("{source_name} parse error: {message}")]
    Parse { source_name: String, message: String },

    #[error("unknown source: {0}")]
    UnknownSource(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl EtlError {
    pub fn parse(source_name: impl Into<String>, message: impl std::fmt::Display) -> Self {
        EtlError::Parse {
            source_name: source_name.into(),
            message: message.to_string(),
        }
    }

    pub fn io(path: &std::path::Path, e: impl std::fmt::Display) -> Self {
        EtlError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        }
    }
}

impl TherapyErrorCode for EtlError {
    fn error_code(&self) -> &'static str {
        match self {
            EtlError::Storage(e) => e.error_code(),
            _ => error_code::ETL_ERROR,
        }
    }
}

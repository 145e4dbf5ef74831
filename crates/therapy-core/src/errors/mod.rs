//! Error handling for the therapy store.
//! One error enum per subsystem, `thiserror` only.

pub mod config_error;
pub mod constraint_error;
pub mod error_code;
pub mod etl_error;
pub mod storage_error;

pub use config_error::ConfigError;
pub use constraint_error::ConstraintError;
pub use error_code::TherapyErrorCode;
pub use etl_error::EtlError;
pub use storage_error::StorageError;

//! Shared types, errors, configuration and tracing for the therapy concept
//! store.

pub mod config;
pub mod errors;
pub mod tracing;
pub mod types;

pub use types::{ApprovalStatus, NamespacePrefix, SourceMeta, SourceName, TherapyRecord};

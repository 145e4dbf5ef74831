//! Domain types shared by storage, loaders and the CLI.

pub mod namespace;
pub mod record;
pub mod source;

pub use namespace::NamespacePrefix;
pub use record::{ApprovalStatus, TherapyRecord};
pub use source::{SourceMeta, SourceName};

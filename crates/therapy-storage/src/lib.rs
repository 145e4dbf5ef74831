//! SQLite persistence for therapy concepts.
//!
//! The parent table `therapy_concepts` and its six child tables are created
//! by the migrations; the child tables are then bound to the parent through
//! named `<table>_concept_id_fkey` foreign keys managed by [`constraints`].

pub mod connection;
pub mod constraints;
pub mod integrity;
pub mod migrations;
pub mod queries;

pub use connection::DatabaseManager;
pub use constraints::{ForeignKey, THERAPY_FOREIGN_KEYS};
pub use queries::ChildTable;

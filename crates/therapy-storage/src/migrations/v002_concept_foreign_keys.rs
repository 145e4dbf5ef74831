//! V002: bind every child table's concept_id to therapy_concepts.
//!
//! Constraints already attached by hand (`constraints apply` on a v1
//! database) are left in place.

use rusqlite::Connection;
use therapy_core::errors::{ConstraintError, StorageError};

use crate::constraints::{add_constraint, constraint_status, THERAPY_FOREIGN_KEYS};

pub fn migrate(conn: &Connection) -> Result<(), StorageError> {
    attach_missing(conn).map_err(|e| StorageError::MigrationFailed {
        version: 2,
        message: e.to_string(),
    })
}

fn attach_missing(conn: &Connection) -> Result<(), ConstraintError> {
    let status = constraint_status(conn, &THERAPY_FOREIGN_KEYS)?;
    for (fk, current) in THERAPY_FOREIGN_KEYS.iter().zip(status) {
        if current.present {
            tracing::debug!(constraint = %current.name, "foreign key already present");
            continue;
        }
        add_constraint(conn, fk)?;
    }
    Ok(())
}

//! Named foreign keys binding the child tables to `therapy_concepts`.
//!
//! Each [`ForeignKey`] renders to the canonical PostgreSQL statement
//!
//! ```text
//! ALTER TABLE <child> ADD CONSTRAINT <child>_concept_id_fkey
//!     FOREIGN KEY (concept_id) REFERENCES therapy_concepts (concept_id);
//! ```
//!
//! and can be attached to (or dropped from) an SQLite database. SQLite has
//! no `ALTER TABLE ... ADD CONSTRAINT`, so both directions rebuild the child
//! table with the constraint clause added or removed.
//!
//! Adding is unguarded: attaching a constraint that already
//! exists fails with [`ConstraintError::AlreadyExists`].

pub mod catalog;
pub mod clause;
pub mod rebuild;

use rusqlite::Connection;
use therapy_core::errors::ConstraintError;

use crate::connection::writer::with_savepoint;
use crate::integrity;

/// Orphan values quoted in a `ReferentialViolation` error.
const VIOLATION_SAMPLE: usize = 5;

/// A single-column foreign key from a child table to its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForeignKey {
    pub table: &'static str,
    pub column: &'static str,
    pub parent_table: &'static str,
    pub parent_column: &'static str,
}

impl ForeignKey {
    /// A `concept_id` reference to `therapy_concepts (concept_id)`.
    pub const fn concept_ref(table: &'static str) -> Self {
        Self {
            table,
            column: "concept_id",
            parent_table: "therapy_concepts",
            parent_column: "concept_id",
        }
    }

    /// Deterministic constraint name: `<table>_<column>_fkey`.
    pub fn name(&self) -> String {
        format!("{}_{}_fkey", self.table, self.column)
    }

    /// The table-constraint clause stored in the child's schema.
    pub fn clause(&self) -> String {
        format!(
            "CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {} ({})",
            self.name(),
            self.column,
            self.parent_table,
            self.parent_column
        )
    }

    pub fn add_ddl(&self) -> String {
        format!("ALTER TABLE {} ADD {};", self.table, self.clause())
    }

    pub fn drop_ddl(&self) -> String {
        format!("ALTER TABLE {} DROP CONSTRAINT {};", self.table, self.name())
    }
}

/// The six child-table constraints, in application order.
pub const THERAPY_FOREIGN_KEYS: [ForeignKey; 6] = [
    ForeignKey::concept_ref("therapy_aliases"),
    ForeignKey::concept_ref("therapy_associations"),
    ForeignKey::concept_ref("therapy_labels"),
    ForeignKey::concept_ref("therapy_trade_names"),
    ForeignKey::concept_ref("therapy_xrefs"),
    ForeignKey::concept_ref("therapy_rx_brand_ids"),
];

/// The constraint script as PostgreSQL DDL, one statement per line.
pub fn postgres_script(fks: &[ForeignKey]) -> String {
    fks.iter().map(|fk| fk.add_ddl() + "\n").collect()
}

/// The matching `DROP CONSTRAINT` script, in reverse order.
pub fn postgres_rollback_script(fks: &[ForeignKey]) -> String {
    fks.iter().rev().map(|fk| fk.drop_ddl() + "\n").collect()
}

/// Presence and enforcement of one constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintStatus {
    pub name: String,
    pub table: String,
    /// The named clause is part of the stored table definition.
    pub present: bool,
    /// SQLite reports a matching foreign key for the table.
    pub enforced: bool,
}

/// Attach `fk` to its child table.
///
/// Fails without touching the table if the table or column is missing, the
/// constraint already exists, the column types differ, the referenced column
/// is not a unique key, or any existing row is an orphan.
pub fn add_constraint(conn: &Connection, fk: &ForeignKey) -> Result<(), ConstraintError> {
    let name = fk.name();
    with_savepoint(conn, "add_foreign_key", |conn| {
        let table_sql = require_table(conn, fk.table)?;
        require_table(conn, fk.parent_table)?;

        if clause::find_constraint(&table_sql, &name).is_some() {
            return Err(ConstraintError::AlreadyExists {
                name,
                table: fk.table.to_string(),
            });
        }

        let child_type = require_column(conn, fk.table, fk.column)?;
        let parent_type = require_column(conn, fk.parent_table, fk.parent_column)?;
        if !catalog::types_compatible(&child_type, &parent_type) {
            return Err(ConstraintError::TypeMismatch {
                name,
                table: fk.table.to_string(),
                column: fk.column.to_string(),
                child_type,
                parent_table: fk.parent_table.to_string(),
                parent_column: fk.parent_column.to_string(),
                parent_type,
            });
        }

        if !catalog::is_unique_key(conn, fk.parent_table, fk.parent_column)? {
            return Err(ConstraintError::ParentKeyNotUnique {
                table: fk.parent_table.to_string(),
                column: fk.parent_column.to_string(),
            });
        }

        let orphans = integrity::find_orphans(conn, fk, VIOLATION_SAMPLE)?;
        if orphans.orphan_count > 0 {
            return Err(ConstraintError::ReferentialViolation {
                name,
                table: fk.table.to_string(),
                column: fk.column.to_string(),
                orphan_count: orphans.orphan_count,
                sample: orphans.sample,
            });
        }

        let new_sql = clause::with_constraint(&table_sql, &fk.clause());
        rebuild::rebuild_table(conn, fk.table, &new_sql)?;
        tracing::info!(constraint = %name, table = fk.table, "added foreign key");
        Ok(())
    })
}

/// Remove `fk` from its child table. Rows are kept as they are.
pub fn drop_constraint(conn: &Connection, fk: &ForeignKey) -> Result<(), ConstraintError> {
    let name = fk.name();
    with_savepoint(conn, "drop_foreign_key", |conn| {
        let table_sql = require_table(conn, fk.table)?;
        let new_sql = clause::without_constraint(&table_sql, &name).ok_or_else(|| {
            ConstraintError::NotFound {
                name: name.clone(),
                table: fk.table.to_string(),
            }
        })?;
        rebuild::rebuild_table(conn, fk.table, &new_sql)?;
        tracing::info!(constraint = %name, table = fk.table, "dropped foreign key");
        Ok(())
    })
}

/// Apply constraints in order, stopping at the first failure.
/// Constraints applied before the failure stay in place.
pub fn apply_constraints(conn: &Connection, fks: &[ForeignKey]) -> Result<usize, ConstraintError> {
    for (applied, fk) in fks.iter().enumerate() {
        if let Err(e) = add_constraint(conn, fk) {
            tracing::warn!(constraint = %fk.name(), applied, error = %e, "constraint application aborted");
            return Err(e);
        }
    }
    Ok(fks.len())
}

/// Drop constraints in reverse order, stopping at the first failure.
pub fn drop_constraints(conn: &Connection, fks: &[ForeignKey]) -> Result<usize, ConstraintError> {
    for (dropped, fk) in fks.iter().rev().enumerate() {
        if let Err(e) = drop_constraint(conn, fk) {
            tracing::warn!(constraint = %fk.name(), dropped, error = %e, "constraint removal aborted");
            return Err(e);
        }
    }
    Ok(fks.len())
}

/// Report presence and enforcement of each constraint.
pub fn constraint_status(
    conn: &Connection,
    fks: &[ForeignKey],
) -> Result<Vec<ConstraintStatus>, ConstraintError> {
    fks.iter()
        .map(|fk| {
            let name = fk.name();
            let present = match catalog::table_sql(conn, fk.table)? {
                Some(sql) => clause::find_constraint(&sql, &name).is_some(),
                None => false,
            };
            let enforced = catalog::foreign_keys(conn, fk.table)?.iter().any(|row| {
                row.parent_table.eq_ignore_ascii_case(fk.parent_table)
                    && row.from.eq_ignore_ascii_case(fk.column)
                    && row
                        .to
                        .as_deref()
                        .is_some_and(|to| to.eq_ignore_ascii_case(fk.parent_column))
            });
            Ok(ConstraintStatus {
                name,
                table: fk.table.to_string(),
                present,
                enforced,
            })
        })
        .collect()
}

fn require_table(conn: &Connection, table: &str) -> Result<String, ConstraintError> {
    catalog::table_sql(conn, table)?.ok_or_else(|| ConstraintError::MissingTable {
        table: table.to_string(),
    })
}

fn require_column(conn: &Connection, table: &str, column: &str) -> Result<String, ConstraintError> {
    catalog::column_type(conn, table, column)?.ok_or_else(|| ConstraintError::MissingColumn {
        table: table.to_string(),
        column: column.to_string(),
    })
}

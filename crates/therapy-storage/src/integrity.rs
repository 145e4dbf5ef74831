//! Referential and structural integrity checks.

use rusqlite::{params, Connection};
use therapy_core::errors::StorageError;

use crate::constraints::catalog::quote_ident;
use crate::constraints::ForeignKey;

/// Child rows whose key has no parent row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrphanReport {
    pub constraint: String,
    pub table: String,
    pub orphan_count: u64,
    /// Up to `sample_limit` distinct orphaned key values.
    pub sample: Vec<String>,
}

/// One violation reported by `PRAGMA foreign_key_check`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeyViolation {
    pub table: String,
    pub rowid: Option<i64>,
    pub parent_table: String,
    pub fk_index: i64,
}

/// Count child rows of `fk` that reference a missing parent key.
/// NULL keys are not orphans.
pub fn find_orphans(
    conn: &Connection,
    fk: &ForeignKey,
    sample_limit: usize,
) -> Result<OrphanReport, StorageError> {
    let predicate = format!(
        "FROM {child} c WHERE c.{col} IS NOT NULL AND NOT EXISTS \
         (SELECT 1 FROM {parent} p WHERE p.{pcol} = c.{col})",
        child = quote_ident(fk.table),
        col = quote_ident(fk.column),
        parent = quote_ident(fk.parent_table),
        pcol = quote_ident(fk.parent_column),
    );

    let orphan_count: i64 =
        conn.query_row(&format!("SELECT COUNT(*) {predicate}"), [], |row| row.get(0))?;

    let sample = if orphan_count > 0 && sample_limit > 0 {
        let mut stmt = conn.prepare(&format!(
            "SELECT DISTINCT CAST(c.{col} AS TEXT) {predicate} ORDER BY 1 LIMIT ?1",
            col = quote_ident(fk.column),
        ))?;
        let rows = stmt.query_map(params![sample_limit as i64], |row| row.get::<_, String>(0))?;
        rows.collect::<Result<Vec<_>, _>>()?
    } else {
        Vec::new()
    };

    Ok(OrphanReport {
        constraint: fk.name(),
        table: fk.table.to_string(),
        orphan_count: orphan_count as u64,
        sample,
    })
}

/// One orphan report per constraint, in order.
pub fn orphan_report(
    conn: &Connection,
    fks: &[ForeignKey],
    sample_limit: usize,
) -> Result<Vec<OrphanReport>, StorageError> {
    fks.iter()
        .map(|fk| find_orphans(conn, fk, sample_limit))
        .collect()
}

/// Violations of the foreign keys SQLite currently knows about.
pub fn foreign_key_check(conn: &Connection) -> Result<Vec<ForeignKeyViolation>, StorageError> {
    let mut stmt = conn.prepare("PRAGMA foreign_key_check")?;
    let rows = stmt.query_map([], |row| {
        Ok(ForeignKeyViolation {
            table: row.get(0)?,
            rowid: row.get(1)?,
            parent_table: row.get(2)?,
            fk_index: row.get(3)?,
        })
    })?;
    rows.collect::<Result<Vec<_>, _>>().map_err(StorageError::from)
}

/// Run `PRAGMA integrity_check`. Returns true if the database is healthy.
pub fn integrity_check(conn: &Connection) -> Result<bool, StorageError> {
    let result: String = conn.query_row("PRAGMA integrity_check", [], |row| row.get(0))?;
    if result != "ok" {
        tracing::error!(result = %result, "integrity check failed");
    }
    Ok(result == "ok")
}

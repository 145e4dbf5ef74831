//! Queries for the child tables.

use rusqlite::{params, Connection};
use therapy_core::errors::StorageError;

use super::ChildTable;

/// Insert one child row. Returns the row id.
/// Fails with `ForeignKeyViolation` when `concept_id` has no parent row.
pub fn insert_child(
    conn: &Connection,
    table: ChildTable,
    concept_id: &str,
    value: &str,
) -> Result<i64, StorageError> {
    let mut stmt = conn.prepare_cached(&format!(
        "INSERT INTO {} ({}, concept_id) VALUES (?1, ?2)",
        table.table(),
        table.value_column()
    ))?;
    stmt.execute(params![value, concept_id])?;
    Ok(conn.last_insert_rowid())
}

/// Values attached to `concept_id`, in insertion order.
pub fn children_of(
    conn: &Connection,
    table: ChildTable,
    concept_id: &str,
) -> Result<Vec<String>, StorageError> {
    let mut stmt = conn.prepare_cached(&format!(
        "SELECT {} FROM {} WHERE concept_id = ?1 ORDER BY id",
        table.value_column(),
        table.table()
    ))?;
    let rows = stmt.query_map(params![concept_id], |row| row.get(0))?;
    rows.collect::<Result<Vec<_>, _>>().map_err(StorageError::from)
}

/// Remove every row of `table` attached to `concept_id`.
pub fn delete_children(
    conn: &Connection,
    table: ChildTable,
    concept_id: &str,
) -> Result<usize, StorageError> {
    conn.execute(
        &format!("DELETE FROM {} WHERE concept_id = ?1", table.table()),
        params![concept_id],
    )
    .map_err(StorageError::from)
}

/// Remove the rows of every child table attached to `concept_id`.
pub fn delete_all_children(conn: &Connection, concept_id: &str) -> Result<usize, StorageError> {
    ChildTable::ALL
        .iter()
        .map(|table| delete_children(conn, *table, concept_id))
        .sum()
}

pub fn count_children(conn: &Connection, table: ChildTable) -> Result<i64, StorageError> {
    conn.query_row(&format!("SELECT COUNT(*) FROM {}", table.table()), [], |row| {
        row.get(0)
    })
    .map_err(StorageError::from)
}

//! Table rebuild: the SQLite way to change a table's constraints.
//!
//! 1. remember the table's indexes, triggers and AUTOINCREMENT high-water mark
//! 2. create `<table>__rebuild` from the new definition
//! 3. copy every row, keeping rowids
//! 4. drop the original and rename the copy into place
//! 5. recreate the indexes and triggers, restore the sequence
//!
//! The rename runs with `legacy_alter_table` on, so views and triggers of
//! other tables that mention the table are left as written instead of being
//! re-checked while the table is briefly missing.
//!
//! Callers run this inside a savepoint; a failure at any step rolls the
//! table back to its previous definition.

use rusqlite::{params, Connection, OptionalExtension};
use therapy_core::errors::StorageError;

use super::catalog::{index_sql, quote_ident, trigger_sql};
use super::clause::rename_table;

pub fn rebuild_table(conn: &Connection, table: &str, new_create_sql: &str) -> Result<(), StorageError> {
    let scratch = format!("{table}__rebuild");
    let indexes = index_sql(conn, table)?;
    let triggers = trigger_sql(conn, table)?;
    let sequence = autoincrement_seq(conn, table)?;

    conn.execute_batch(&rename_table(new_create_sql, &scratch))?;
    let copied = conn.execute(
        &format!(
            "INSERT INTO {} SELECT * FROM {}",
            quote_ident(&scratch),
            quote_ident(table)
        ),
        [],
    )?;
    with_legacy_alter_table(conn, |conn| {
        conn.execute_batch(&format!(
            "DROP TABLE {table_q}; ALTER TABLE {scratch_q} RENAME TO {table_q};",
            table_q = quote_ident(table),
            scratch_q = quote_ident(&scratch),
        ))
        .map_err(StorageError::from)
    })?;
    for sql in indexes.iter().chain(&triggers) {
        conn.execute_batch(sql)?;
    }
    if let Some(seq) = sequence {
        restore_seq(conn, table, &scratch, seq)?;
    }

    tracing::debug!(
        table,
        rows = copied,
        indexes = indexes.len(),
        triggers = triggers.len(),
        "rebuilt table"
    );
    Ok(())
}

/// `sqlite_sequence.seq` for `table`, if the database tracks one.
fn autoincrement_seq(conn: &Connection, table: &str) -> Result<Option<i64>, StorageError> {
    let tracked: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'sqlite_sequence')",
        [],
        |row| row.get(0),
    )?;
    if !tracked {
        return Ok(None);
    }
    conn.query_row(
        "SELECT seq FROM sqlite_sequence WHERE name = ?1",
        params![table],
        |row| row.get(0),
    )
    .optional()
    .map_err(StorageError::from)
}

/// Put the original high-water mark back under the table's name, replacing
/// the entry the copy created from its surviving rows.
fn restore_seq(conn: &Connection, table: &str, scratch: &str, seq: i64) -> Result<(), StorageError> {
    conn.execute(
        "DELETE FROM sqlite_sequence WHERE name IN (?1, ?2)",
        params![table, scratch],
    )?;
    conn.execute(
        "INSERT INTO sqlite_sequence (name, seq) VALUES (?1, ?2)",
        params![table, seq],
    )?;
    Ok(())
}

/// Run `f` with `PRAGMA legacy_alter_table = ON`, restoring the previous
/// setting afterwards.
fn with_legacy_alter_table<F, T>(conn: &Connection, f: F) -> Result<T, StorageError>
where
    F: FnOnce(&Connection) -> Result<T, StorageError>,
{
    let previous: bool = conn.pragma_query_value(None, "legacy_alter_table", |row| row.get(0))?;
    conn.pragma_update(None, "legacy_alter_table", true)?;
    let result = f(conn);
    if let Err(e) = conn.pragma_update(None, "legacy_alter_table", previous) {
        tracing::error!(error = %e, "failed to restore legacy_alter_table");
        if result.is_ok() {
            return Err(StorageError::from(e));
        }
    }
    result
}

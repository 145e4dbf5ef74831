//! Schema introspection through sqlite_master and table PRAGMAs.

use rusqlite::{params, Connection, OptionalExtension};
use therapy_core::errors::StorageError;

/// One row of `PRAGMA foreign_key_list`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeyRow {
    pub parent_table: String,
    pub from: String,
    pub to: Option<String>,
    pub on_update: String,
    pub on_delete: String,
}

/// Quote an identifier for interpolation into SQL.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// The stored `CREATE TABLE` statement, or None if the table is missing.
pub fn table_sql(conn: &Connection, table: &str) -> Result<Option<String>, StorageError> {
    conn.query_row(
        "SELECT sql FROM sqlite_master WHERE type = 'table' AND name = ?1 COLLATE NOCASE",
        params![table],
        |row| row.get(0),
    )
    .optional()
    .map_err(StorageError::from)
}

/// Explicitly created indexes on `table` (auto-indexes have no SQL).
pub fn index_sql(conn: &Connection, table: &str) -> Result<Vec<String>, StorageError> {
    let mut stmt = conn.prepare(
        "SELECT sql FROM sqlite_master
         WHERE type = 'index' AND tbl_name = ?1 COLLATE NOCASE AND sql IS NOT NULL
         ORDER BY name",
    )?;
    let rows = stmt.query_map(params![table], |row| row.get::<_, String>(0))?;
    rows.collect::<Result<Vec<_>, _>>().map_err(StorageError::from)
}

/// Triggers attached to `table`, in creation order. Dropping a table drops
/// these with it.
pub fn trigger_sql(conn: &Connection, table: &str) -> Result<Vec<String>, StorageError> {
    let mut stmt = conn.prepare(
        "SELECT sql FROM sqlite_master
         WHERE type = 'trigger' AND tbl_name = ?1 COLLATE NOCASE AND sql IS NOT NULL
         ORDER BY rowid",
    )?;
    let rows = stmt.query_map(params![table], |row| row.get::<_, String>(0))?;
    rows.collect::<Result<Vec<_>, _>>().map_err(StorageError::from)
}

/// Declared type of `table.column`, or None if the column is missing.
pub fn column_type(
    conn: &Connection,
    table: &str,
    column: &str,
) -> Result<Option<String>, StorageError> {
    Ok(table_columns(conn, table)?
        .into_iter()
        .find(|c| c.name.eq_ignore_ascii_case(column))
        .map(|c| c.decl_type))
}

#[derive(Debug, Clone)]
struct ColumnInfo {
    name: String,
    decl_type: String,
    pk: i64,
}

fn table_columns(conn: &Connection, table: &str) -> Result<Vec<ColumnInfo>, StorageError> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", quote_ident(table)))?;
    let rows = stmt.query_map([], |row| {
        Ok(ColumnInfo {
            name: row.get(1)?,
            decl_type: row.get(2)?,
            pk: row.get(5)?,
        })
    })?;
    rows.collect::<Result<Vec<_>, _>>().map_err(StorageError::from)
}

/// Whether `column` alone is the primary key of `table` or is covered by a
/// full (non-partial) single-column unique index.
pub fn is_unique_key(conn: &Connection, table: &str, column: &str) -> Result<bool, StorageError> {
    let columns = table_columns(conn, table)?;
    let pk_columns: Vec<&ColumnInfo> = columns.iter().filter(|c| c.pk > 0).collect();
    if pk_columns.len() == 1 && pk_columns[0].name.eq_ignore_ascii_case(column) {
        return Ok(true);
    }

    let mut stmt = conn.prepare(&format!("PRAGMA index_list({})", quote_ident(table)))?;
    let indexes = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, String>(1)?,
                row.get::<_, i64>(2)?,
                row.get::<_, i64>(4)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    for (index, unique, partial) in indexes {
        if unique == 0 || partial != 0 {
            continue;
        }
        let mut info = conn.prepare(&format!("PRAGMA index_info({})", quote_ident(&index)))?;
        let indexed: Vec<Option<String>> = info
            .query_map([], |row| row.get(2))?
            .collect::<Result<Vec<_>, _>>()?;
        if let [Some(only)] = indexed.as_slice() {
            if only.eq_ignore_ascii_case(column) {
                return Ok(true);
            }
        }
    }
    Ok(false)
}

/// Foreign keys SQLite knows for `table`.
pub fn foreign_keys(conn: &Connection, table: &str) -> Result<Vec<ForeignKeyRow>, StorageError> {
    let mut stmt = conn.prepare(&format!("PRAGMA foreign_key_list({})", quote_ident(table)))?;
    let rows = stmt.query_map([], |row| {
        Ok(ForeignKeyRow {
            parent_table: row.get(2)?,
            from: row.get(3)?,
            to: row.get(4)?,
            on_update: row.get(5)?,
            on_delete: row.get(6)?,
        })
    })?;
    rows.collect::<Result<Vec<_>, _>>().map_err(StorageError::from)
}

/// Declared types must agree, ignoring case and surrounding whitespace.
pub fn types_compatible(child_type: &str, parent_type: &str) -> bool {
    child_type.trim().eq_ignore_ascii_case(parent_type.trim())
}

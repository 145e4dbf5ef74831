//! Queries for the therapy_concepts table.

use rusqlite::{params, Connection, OptionalExtension, Row};
use therapy_core::errors::StorageError;
use therapy_core::{ApprovalStatus, SourceName, TherapyRecord};

use super::children::children_of;
use super::ChildTable;

/// Insert the parent row for `record`. Fails if the concept already exists.
pub fn insert_concept(conn: &Connection, record: &TherapyRecord) -> Result<(), StorageError> {
    conn.execute(
        "INSERT INTO therapy_concepts (concept_id, source, label, approval_status)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            record.concept_id,
            record.source.as_str(),
            record.label,
            record.approval_status.map(|s| s.as_str()),
        ],
    )?;
    Ok(())
}

/// Insert or update the parent row for `record`. Child rows are untouched.
pub fn upsert_concept(conn: &Connection, record: &TherapyRecord) -> Result<(), StorageError> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO therapy_concepts (concept_id, source, label, approval_status)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(concept_id) DO UPDATE SET
            source = excluded.source,
            label = excluded.label,
            approval_status = excluded.approval_status",
    )?;
    stmt.execute(params![
        record.concept_id,
        record.source.as_str(),
        record.label,
        record.approval_status.map(|s| s.as_str()),
    ])?;
    Ok(())
}

/// Load a concept and all of its child rows.
pub fn get_concept(conn: &Connection, concept_id: &str) -> Result<Option<TherapyRecord>, StorageError> {
    let parent = conn
        .query_row(
            "SELECT concept_id, source, label, approval_status
             FROM therapy_concepts WHERE concept_id = ?1",
            params![concept_id],
            read_parent,
        )
        .optional()?;

    let Some((concept_id, source, label, status)) = parent else {
        return Ok(None);
    };

    let mut record = TherapyRecord::new(concept_id, parse_source(&source)?);
    record.label = label;
    record.approval_status = status.as_deref().map(parse_status).transpose()?;
    record.aliases = children_of(conn, ChildTable::Aliases, &record.concept_id)?;
    record.trade_names = children_of(conn, ChildTable::TradeNames, &record.concept_id)?;
    record.xrefs = children_of(conn, ChildTable::Xrefs, &record.concept_id)?;
    record.associated_with = children_of(conn, ChildTable::Associations, &record.concept_id)?;
    record.rx_brand_ids = children_of(conn, ChildTable::RxBrandIds, &record.concept_id)?;
    Ok(Some(record))
}

/// Delete a concept row. Fails with `ForeignKeyViolation` while child rows
/// still reference it.
pub fn delete_concept(conn: &Connection, concept_id: &str) -> Result<usize, StorageError> {
    conn.execute(
        "DELETE FROM therapy_concepts WHERE concept_id = ?1",
        params![concept_id],
    )
    .map_err(StorageError::from)
}

pub fn concept_exists(conn: &Connection, concept_id: &str) -> Result<bool, StorageError> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM therapy_concepts WHERE concept_id = ?1)",
        params![concept_id],
        |row| row.get(0),
    )
    .map_err(StorageError::from)
}

pub fn count_concepts(conn: &Connection) -> Result<i64, StorageError> {
    conn.query_row("SELECT COUNT(*) FROM therapy_concepts", [], |row| row.get(0))
        .map_err(StorageError::from)
}

/// Concept ids, optionally restricted to one source, sorted.
pub fn concept_ids(conn: &Connection, source: Option<SourceName>) -> Result<Vec<String>, StorageError> {
    let mut stmt = conn.prepare_cached(
        "SELECT concept_id FROM therapy_concepts
         WHERE ?1 IS NULL OR source = ?1 ORDER BY concept_id",
    )?;
    let rows = stmt.query_map(params![source.map(|s| s.as_str())], |row| row.get(0))?;
    rows.collect::<Result<Vec<_>, _>>().map_err(StorageError::from)
}

type ParentRow = (String, String, Option<String>, Option<String>);

fn read_parent(row: &Row<'_>) -> rusqlite::Result<ParentRow> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
}

fn parse_source(value: &str) -> Result<SourceName, StorageError> {
    value.parse().map_err(|_| StorageError::InvalidValue {
        table: "therapy_concepts".to_string(),
        column: "source".to_string(),
        value: value.to_string(),
    })
}

fn parse_status(value: &str) -> Result<ApprovalStatus, StorageError> {
    value.parse().map_err(|_| StorageError::InvalidValue {
        table: "therapy_concepts".to_string(),
        column: "approval_status".to_string(),
        value: value.to_string(),
    })
}

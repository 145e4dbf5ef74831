//! Queries for therapy_sources and per-source bulk removal.

use rusqlite::{params, Connection, OptionalExtension};
use therapy_core::errors::StorageError;
use therapy_core::{SourceMeta, SourceName};

use super::children::delete_all_children;
use super::concepts::concept_ids;

pub fn upsert_source_meta(
    conn: &Connection,
    source: SourceName,
    meta: &SourceMeta,
) -> Result<(), StorageError> {
    conn.execute(
        "INSERT INTO therapy_sources (name, data_license, data_license_url, version,
                                      data_url, rdp_url, non_commercial, share_alike, attribution)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
         ON CONFLICT(name) DO UPDATE SET
            data_license = excluded.data_license,
            data_license_url = excluded.data_license_url,
            version = excluded.version,
            data_url = excluded.data_url,
            rdp_url = excluded.rdp_url,
            non_commercial = excluded.non_commercial,
            share_alike = excluded.share_alike,
            attribution = excluded.attribution",
        params![
            source.as_str(),
            meta.data_license,
            meta.data_license_url,
            meta.version,
            meta.data_url,
            meta.rdp_url,
            meta.non_commercial,
            meta.share_alike,
            meta.attribution,
        ],
    )?;
    Ok(())
}

pub fn get_source_meta(conn: &Connection, source: SourceName) -> Result<Option<SourceMeta>, StorageError> {
    conn.query_row(
        "SELECT data_license, data_license_url, version, data_url, rdp_url,
                non_commercial, share_alike, attribution
         FROM therapy_sources WHERE name = ?1",
        params![source.as_str()],
        |row| {
            Ok(SourceMeta {
                data_license: row.get(0)?,
                data_license_url: row.get(1)?,
                version: row.get(2)?,
                data_url: row.get(3)?,
                rdp_url: row.get(4)?,
                non_commercial: row.get(5)?,
                share_alike: row.get(6)?,
                attribution: row.get(7)?,
            })
        },
    )
    .optional()
    .map_err(StorageError::from)
}

/// Remove every concept of `source` together with its child rows.
/// Children go first so the foreign keys are never violated.
pub fn delete_source_concepts(conn: &Connection, source: SourceName) -> Result<usize, StorageError> {
    let ids = concept_ids(conn, Some(source))?;
    for concept_id in &ids {
        delete_all_children(conn, concept_id)?;
    }
    let removed = conn.execute(
        "DELETE FROM therapy_concepts WHERE source = ?1",
        params![source.as_str()],
    )?;
    tracing::info!(source = %source, removed, "removed source concepts");
    Ok(removed)
}

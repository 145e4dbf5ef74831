//! Writing normalized records: one parent row plus its child rows.

use rusqlite::Connection;
use therapy_core::errors::StorageError;
use therapy_core::TherapyRecord;

use super::children::{delete_all_children, insert_child};
use super::concepts::upsert_concept;
use super::ChildTable;
use crate::connection::writer::with_immediate_transaction;

/// Write `record` and its child rows. Any rows previously attached to the
/// concept are replaced. The caller owns the transaction.
pub fn load_record(conn: &Connection, record: &TherapyRecord) -> Result<(), StorageError> {
    upsert_concept(conn, record)?;
    delete_all_children(conn, &record.concept_id)?;

    let id = record.concept_id.as_str();
    if let Some(label) = &record.label {
        insert_child(conn, ChildTable::Labels, id, label)?;
    }
    for (table, values) in [
        (ChildTable::Aliases, &record.aliases),
        (ChildTable::TradeNames, &record.trade_names),
        (ChildTable::Xrefs, &record.xrefs),
        (ChildTable::Associations, &record.associated_with),
        (ChildTable::RxBrandIds, &record.rx_brand_ids),
    ] {
        for value in values {
            insert_child(conn, table, id, value)?;
        }
    }
    Ok(())
}

/// Write all records in a single BEGIN IMMEDIATE transaction.
pub fn load_records(conn: &Connection, records: &[TherapyRecord]) -> Result<usize, StorageError> {
    with_immediate_transaction(conn, |conn| {
        for record in records {
            load_record(conn, record)?;
        }
        Ok(records.len())
    })
}

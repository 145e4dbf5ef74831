//! Splitting identifiers into xrefs and associations.
//!
//! An identifier whose namespace is a normalizer source is an xref; any
//! other identifier, known namespace or not, is an association.

use therapy_core::errors::StorageError;
use therapy_core::{NamespacePrefix, SourceName};
use therapy_storage::connection::writer::with_immediate_transaction;
use therapy_storage::queries::children::{children_of, delete_children, insert_child};
use therapy_storage::queries::concepts::concept_ids;
use therapy_storage::ChildTable;

/// Split CURIEs into `(xrefs, associated_with)`, preserving order.
pub fn partition_identifiers<S: AsRef<str>>(identifiers: &[S]) -> (Vec<String>, Vec<String>) {
    let mut xrefs = Vec::new();
    let mut associated_with = Vec::new();
    for id in identifiers {
        let id = id.as_ref();
        if is_xref(id) {
            xrefs.push(id.to_string());
        } else {
            associated_with.push(id.to_string());
        }
    }
    (xrefs, associated_with)
}

pub fn is_xref(curie: &str) -> bool {
    NamespacePrefix::of_curie(curie).is_some_and(|p| p.is_normalizer_source())
}

/// Re-partition the stored identifiers of every non-ChEMBL concept.
/// Returns the number of concepts whose rows changed.
pub fn backfill_xrefs(conn: &rusqlite::Connection) -> Result<usize, StorageError> {
    with_immediate_transaction(conn, |conn| {
        let mut updated = 0;
        let mut ids = Vec::new();
        for source in SourceName::ALL.into_iter().filter(|s| *s != SourceName::Chembl) {
            ids.extend(concept_ids(conn, Some(source))?);
        }
        for concept_id in ids {
            let old_xrefs = children_of(conn, ChildTable::Xrefs, &concept_id)?;
            let old_assoc = children_of(conn, ChildTable::Associations, &concept_id)?;

            let mut identifiers: Vec<String> = Vec::new();
            for id in old_xrefs.iter().chain(old_assoc.iter()) {
                if *id != concept_id && !identifiers.contains(id) {
                    identifiers.push(id.clone());
                }
            }
            let (xrefs, associated_with) = partition_identifiers(&identifiers);
            if xrefs == old_xrefs && associated_with == old_assoc {
                continue;
            }

            delete_children(conn, ChildTable::Xrefs, &concept_id)?;
            delete_children(conn, ChildTable::Associations, &concept_id)?;
            for id in &xrefs {
                insert_child(conn, ChildTable::Xrefs, &concept_id, id)?;
            }
            for id in &associated_with {
                insert_child(conn, ChildTable::Associations, &concept_id, id)?;
            }
            updated += 1;
        }
        tracing::info!(updated, "backfilled xrefs");
        Ok(updated)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizer_namespaces_are_xrefs() {
        let (xrefs, assoc) = partition_identifiers(&[
            "chembl:CHEMBL11359",
            "mesh:D002945",
            "iuphar.ligand:5343",
            "made.up:1",
            "no_colon",
        ]);
        assert_eq!(xrefs, vec!["chembl:CHEMBL11359", "iuphar.ligand:5343"]);
        assert_eq!(assoc, vec!["mesh:D002945", "made.up:1", "no_colon"]);
    }
}

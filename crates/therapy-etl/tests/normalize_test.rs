//! Normalization and xref backfill tests.

use std::collections::HashSet;

use proptest::prelude::*;
use therapy_core::{SourceName, TherapyRecord};
use therapy_etl::normalize::{dedupe_case_insensitive, normalize};
use therapy_etl::xrefs::backfill_xrefs;
use therapy_storage::queries::children::{children_of, insert_child};
use therapy_storage::queries::concepts::insert_concept;
use therapy_storage::{ChildTable, DatabaseManager};

#[test]
fn dedupe_keeps_first_spelling() {
    let values = vec!["Platinol".into(), " platinol ".into(), "".into(), "CDDP".into()];
    assert_eq!(dedupe_case_insensitive(values), vec!["Platinol", "CDDP"]);
}

#[test]
fn normalize_cleans_every_list() {
    let mut record = TherapyRecord::new("rxcui:2555", SourceName::RxNorm).with_label(" cisplatin ");
    record.aliases = vec!["Cisplatin".into(), "CDDP".into(), "cddp".into()];
    record.trade_names = vec!["Platinol".into(), "PLATINOL".into()];
    record.xrefs = vec!["rxcui:2555".into(), "drugbank:DB00515".into(), "drugbank:DB00515".into()];
    record.rx_brand_ids = vec!["rxcui:202856".into(), "rxcui:202856".into()];

    normalize(&mut record, 20);
    assert_eq!(record.label.as_deref(), Some("cisplatin"));
    assert_eq!(record.aliases, vec!["CDDP"]);
    assert_eq!(record.trade_names, vec!["Platinol"]);
    assert_eq!(record.xrefs, vec!["drugbank:DB00515"]);
    assert_eq!(record.rx_brand_ids, vec!["rxcui:202856"]);
}

#[test]
fn list_at_the_limit_is_kept() {
    let mut record = TherapyRecord::new("chembl:CHEMBL1", SourceName::Chembl);
    record.trade_names = (0..20).map(|i| format!("Brand {i}")).collect();
    normalize(&mut record, 20);
    assert_eq!(record.trade_names.len(), 20);

    record.trade_names.push("One more".into());
    normalize(&mut record, 20);
    assert!(record.trade_names.is_empty());
}

#[test]
fn blank_label_becomes_none() {
    let mut record = TherapyRecord::new("chembl:CHEMBL1", SourceName::Chembl).with_label("   ");
    normalize(&mut record, 20);
    assert!(record.label.is_none());
}

proptest! {
    #[test]
    fn normalized_aliases_are_bounded_and_unique(
        aliases in proptest::collection::vec("[a-cA-C]{1,3}", 0..40),
        max_len in 1usize..25,
    ) {
        let mut record = TherapyRecord::new("wikidata:Q1", SourceName::Wikidata);
        record.aliases = aliases;
        normalize(&mut record, max_len);

        prop_assert!(record.aliases.len() <= max_len);
        let folded: HashSet<String> = record.aliases.iter().map(|a| a.to_lowercase()).collect();
        prop_assert_eq!(folded.len(), record.aliases.len());

        let once = record.clone();
        normalize(&mut record, max_len);
        prop_assert_eq!(record, once);
    }
}

#[test]
fn backfill_moves_misfiled_identifiers() {
    let db = DatabaseManager::open_in_memory().unwrap();
    db.with_writer(|conn| {
        insert_concept(conn, &TherapyRecord::new("wikidata:Q412415", SourceName::Wikidata))?;
        insert_child(conn, ChildTable::Xrefs, "wikidata:Q412415", "mesh:D002945")?;
        insert_child(conn, ChildTable::Xrefs, "wikidata:Q412415", "wikidata:Q412415")?;
        insert_child(conn, ChildTable::Associations, "wikidata:Q412415", "chembl:CHEMBL11359")?;

        insert_concept(conn, &TherapyRecord::new("chembl:CHEMBL25", SourceName::Chembl))?;
        insert_child(conn, ChildTable::Xrefs, "chembl:CHEMBL25", "mesh:D001241")?;
        Ok::<_, therapy_core::errors::StorageError>(())
    })
    .unwrap();

    let updated = db.with_writer(backfill_xrefs).unwrap();
    assert_eq!(updated, 1);

    let (xrefs, assoc) = db
        .with_reader(|conn| {
            Ok::<_, therapy_core::errors::StorageError>((
                children_of(conn, ChildTable::Xrefs, "wikidata:Q412415")?,
                children_of(conn, ChildTable::Associations, "wikidata:Q412415")?,
            ))
        })
        .unwrap();
    assert_eq!(xrefs, vec!["chembl:CHEMBL11359"]);
    assert_eq!(assoc, vec!["mesh:D002945"]);

    // ChEMBL concepts are left alone.
    let chembl = db
        .with_reader(|conn| children_of(conn, ChildTable::Xrefs, "chembl:CHEMBL25"))
        .unwrap();
    assert_eq!(chembl, vec!["mesh:D001241"]);

    assert_eq!(db.with_writer(backfill_xrefs).unwrap(), 0);
}

//! Tests for source names, namespaces and records.

use therapy_core::types::record::push_unique;
use therapy_core::{ApprovalStatus, NamespacePrefix, SourceName, TherapyRecord};

#[test]
fn source_names_parse_case_insensitively() {
    assert_eq!("chembl".parse::<SourceName>().unwrap(), SourceName::Chembl);
    assert_eq!("RXNORM".parse::<SourceName>().unwrap(), SourceName::RxNorm);
    assert!("hemonc".parse::<SourceName>().is_err());
}

#[test]
fn concept_ids_use_source_namespace() {
    assert_eq!(SourceName::RxNorm.concept_id("2555"), "rxcui:2555");
    assert_eq!(SourceName::DrugBank.concept_id("DB00515"), "drugbank:DB00515");
}

#[test]
fn curie_prefix_classification() {
    assert_eq!(
        NamespacePrefix::of_curie("chembl:CHEMBL11359"),
        Some(NamespacePrefix::Chembl)
    );
    assert!(NamespacePrefix::Chembl.is_normalizer_source());
    assert!(!NamespacePrefix::PubChemCompound.is_normalizer_source());
    assert_eq!(NamespacePrefix::of_curie("unknown:1"), None);
    assert_eq!(NamespacePrefix::of_curie("no-colon"), None);
}

#[test]
fn approval_status_string_roundtrip() {
    for status in [
        ApprovalStatus::Approved,
        ApprovalStatus::Investigational,
        ApprovalStatus::Withdrawn,
        ApprovalStatus::RxnormPrescribable,
    ] {
        assert_eq!(status.as_str().parse::<ApprovalStatus>().unwrap(), status);
    }
}

#[test]
fn record_serializes_without_empty_lists() {
    let record = TherapyRecord::new("rxcui:2555", SourceName::RxNorm).with_label("cisplatin");
    let json = serde_json::to_value(&record).unwrap();
    assert_eq!(json["source"], "RxNorm");
    assert!(json.get("aliases").is_none());
}

#[test]
fn push_unique_skips_duplicates() {
    let mut list = Vec::new();
    push_unique(&mut list, "a");
    push_unique(&mut list, "a");
    push_unique(&mut list, "A");
    assert_eq!(list, vec!["a".to_string(), "A".to_string()]);
}

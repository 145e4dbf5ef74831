//! Wikidata: reads a SPARQL result dump (`wikidata_<version>.json`).
//!
//! The dump is a JSON array of flat rows, one per combination of optional
//! values, so one item usually spans several rows.

use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use therapy_core::errors::EtlError;
use therapy_core::types::record::push_unique;
use therapy_core::{NamespacePrefix, SourceMeta, SourceName, TherapyRecord};

use super::version_from_path;
use crate::xrefs::partition_identifiers;
use crate::Source;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WikidataRow {
    /// Entity URI, e.g. `http://www.wikidata.org/entity/Q412415`.
    item: String,
    item_label: Option<String>,
    alias: Option<String>,
    cas_registry: Option<String>,
    pubchem_compound: Option<String>,
    pubchem_substance: Option<String>,
    chembl: Option<String>,
    rxnorm: Option<String>,
    drugbank: Option<String>,
}

impl WikidataRow {
    fn identifiers(&self) -> Vec<String> {
        let fields = [
            (NamespacePrefix::ChemIdPlus, &self.cas_registry),
            (NamespacePrefix::PubChemCompound, &self.pubchem_compound),
            (NamespacePrefix::PubChemSubstance, &self.pubchem_substance),
            (NamespacePrefix::Chembl, &self.chembl),
            (NamespacePrefix::RxNorm, &self.rxnorm),
            (NamespacePrefix::DrugBank, &self.drugbank),
        ];
        fields
            .into_iter()
            .filter_map(|(prefix, value)| {
                let value = value.as_deref()?.trim();
                if value.is_empty() {
                    return None;
                }
                Some(match prefix {
                    // Wikidata stores DrugBank ids without their `DB` prefix.
                    NamespacePrefix::DrugBank if !value.starts_with("DB") => {
                        prefix.curie(&format!("DB{value}"))
                    }
                    _ => prefix.curie(value),
                })
            })
            .collect()
    }
}

pub struct Wikidata {
    path: PathBuf,
    version: String,
}

impl Wikidata {
    pub fn new(path: &Path) -> Result<Self, EtlError> {
        Ok(Self {
            path: path.to_path_buf(),
            version: version_from_path(SourceName::Wikidata, path)?,
        })
    }
}

fn build_records(rows: Vec<WikidataRow>) -> Vec<TherapyRecord> {
    let mut records: Vec<(TherapyRecord, Vec<String>)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for row in rows {
        let Some(local_id) = row.item.rsplit('/').next().filter(|id| !id.is_empty()) else {
            continue;
        };
        let concept_id = SourceName::Wikidata.concept_id(local_id);
        let idx = *index.entry(concept_id.clone()).or_insert_with(|| {
            records.push((TherapyRecord::new(concept_id, SourceName::Wikidata), Vec::new()));
            records.len() - 1
        });

        let (record, identifiers) = &mut records[idx];
        if record.label.is_none() {
            record.label = row.item_label.clone();
        }
        if let Some(alias) = &row.alias {
            push_unique(&mut record.aliases, alias);
        }
        for id in row.identifiers() {
            push_unique(identifiers, &id);
        }
    }

    records
        .into_iter()
        .map(|(mut record, identifiers)| {
            let (xrefs, associated_with) = partition_identifiers(&identifiers);
            record.xrefs = xrefs;
            record.associated_with = associated_with;
            record
        })
        .collect()
}

impl Source for Wikidata {
    fn name(&self) -> SourceName {
        SourceName::Wikidata
    }

    fn version(&self) -> &str {
        &self.version
    }

    fn meta(&self) -> SourceMeta {
        SourceMeta {
            data_license: "CC0 1.0".to_string(),
            data_license_url: "https://creativecommons.org/publicdomain/zero/1.0/".to_string(),
            version: self.version.clone(),
            data_url: None,
            rdp_url: None,
            non_commercial: false,
            share_alike: false,
            attribution: false,
        }
    }

    fn transform(&mut self) -> Result<Vec<TherapyRecord>, EtlError> {
        let file = File::open(&self.path).map_err(|e| EtlError::io(&self.path, e))?;
        let rows: Vec<WikidataRow> = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| EtlError::parse(SourceName::Wikidata.as_str(), e))?;
        let records = build_records(rows);
        tracing::info!(records = records.len(), version = %self.version, "read Wikidata dump");
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_of_one_item_merge() {
        let rows: Vec<WikidataRow> = serde_json::from_str(
            r#"[
                {"item": "http://www.wikidata.org/entity/Q412415", "itemLabel": "cisplatin",
                 "alias": "CDDP", "casRegistry": "15663-27-1", "drugbank": "00515"},
                {"item": "http://www.wikidata.org/entity/Q412415", "itemLabel": "cisplatin",
                 "alias": "Platinol", "pubchemCompound": "5702198"}
            ]"#,
        )
        .unwrap();
        let records = build_records(rows);
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.concept_id, "wikidata:Q412415");
        assert_eq!(r.aliases, vec!["CDDP", "Platinol"]);
        assert_eq!(r.xrefs, vec!["chemidplus:15663-27-1", "drugbank:DB00515"]);
        assert_eq!(r.associated_with, vec!["pubchem.compound:5702198"]);
    }
}

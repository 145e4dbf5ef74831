//! DrugBank: streams the full XML release (`drugbank_<version>.xml`).
//!
//! Only direct children of each top-level `<drug>` are read; the same
//! element names recur inside interactions, targets and the like.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use therapy_core::errors::EtlError;
use therapy_core::types::record::push_unique;
use therapy_core::{ApprovalStatus, NamespacePrefix, SourceMeta, SourceName, TherapyRecord};

use super::version_from_path;
use crate::xrefs::partition_identifiers;
use crate::Source;

/// Depth of a top-level `<drug>` element (`drugbank/drug`).
const DRUG_DEPTH: usize = 2;

pub struct DrugBank {
    path: PathBuf,
    version: String,
}

impl DrugBank {
    pub fn new(path: &Path) -> Result<Self, EtlError> {
        Ok(Self {
            path: path.to_path_buf(),
            version: version_from_path(SourceName::DrugBank, path)?,
        })
    }
}

/// Namespace for an `<external-identifier>` resource name.
fn resource_namespace(resource: &str) -> Option<NamespacePrefix> {
    match resource {
        "ChEBI" => Some(NamespacePrefix::Chebi),
        "ChEMBL" => Some(NamespacePrefix::Chembl),
        "PubChem Compound" => Some(NamespacePrefix::PubChemCompound),
        "PubChem Substance" => Some(NamespacePrefix::PubChemSubstance),
        "KEGG Compound" => Some(NamespacePrefix::KeggCompound),
        "KEGG Drug" => Some(NamespacePrefix::KeggDrug),
        "ChemSpider" => Some(NamespacePrefix::ChemSpider),
        "BindingDB" => Some(NamespacePrefix::BindingDb),
        "PharmGKB" => Some(NamespacePrefix::PharmGkb),
        "ZINC" => Some(NamespacePrefix::Zinc),
        "RxCUI" => Some(NamespacePrefix::RxNorm),
        "PDB" => Some(NamespacePrefix::Pdb),
        "Therapeutic Targets Database" => Some(NamespacePrefix::TherapeuticTargetsDb),
        "IUPHAR" => Some(NamespacePrefix::Iuphar),
        "Guide to Pharmacology" => Some(NamespacePrefix::GuideToPharmacology),
        _ => None,
    }
}

#[derive(Default)]
struct Product {
    name: Option<String>,
    generic: bool,
    approved: bool,
    over_the_counter: bool,
}

#[derive(Default)]
struct ExternalId {
    resource: Option<String>,
    identifier: Option<String>,
}

/// Fields of the `<drug>` being read.
#[derive(Default)]
struct DrugEntry {
    concept_id: Option<String>,
    label: Option<String>,
    aliases: Vec<String>,
    trade_names: Vec<String>,
    identifiers: Vec<String>,
    groups: Vec<String>,
    product: Product,
    external: ExternalId,
}

impl DrugEntry {
    fn into_record(self) -> Option<TherapyRecord> {
        let concept_id = self.concept_id?;
        let mut record = TherapyRecord::new(concept_id, SourceName::DrugBank);
        record.label = self.label;
        record.approval_status = group_status(&self.groups);
        record.aliases = self.aliases;
        record.trade_names = self.trade_names;
        let (xrefs, associated_with) = partition_identifiers(&self.identifiers);
        record.xrefs = xrefs;
        record.associated_with = associated_with;
        Some(record)
    }

    /// Apply the text of a closed element, identified by its path below `<drug>`.
    fn on_text(&mut self, path: &[String], text: String, attrs: &ElementAttrs) {
        let path: Vec<&str> = path.iter().map(String::as_str).collect();
        match path.as_slice() {
            ["drugbank-id"] => {
                if attrs.primary {
                    self.concept_id = Some(SourceName::DrugBank.concept_id(&text));
                } else {
                    push_unique(&mut self.aliases, &text);
                }
            }
            ["name"] => self.label = Some(text),
            ["cas-number"] => {
                self.identifiers.push(NamespacePrefix::ChemIdPlus.curie(&text));
            }
            ["groups", "group"] => self.groups.push(text),
            ["synonyms", "synonym"] => {
                if attrs.language.as_deref() == Some("english") {
                    push_unique(&mut self.aliases, &text);
                }
            }
            ["international-brands", "international-brand", "name"] => {
                push_unique(&mut self.aliases, &text);
            }
            ["products", "product", "name"] => self.product.name = Some(text),
            ["products", "product", "generic"] => self.product.generic = text == "true",
            ["products", "product", "approved"] => self.product.approved = text == "true",
            ["products", "product", "over-the-counter"] => {
                self.product.over_the_counter = text == "true";
            }
            ["external-identifiers", "external-identifier", "resource"] => {
                self.external.resource = Some(text);
            }
            ["external-identifiers", "external-identifier", "identifier"] => {
                self.external.identifier = Some(text);
            }
            _ => {}
        }
    }

    /// Close a container element.
    fn on_close(&mut self, path: &[String]) {
        let path: Vec<&str> = path.iter().map(String::as_str).collect();
        match path.as_slice() {
            ["products", "product"] => {
                let product = std::mem::take(&mut self.product);
                if product.generic || product.approved || product.over_the_counter {
                    if let Some(name) = product.name {
                        push_unique(&mut self.trade_names, &name);
                    }
                }
            }
            ["external-identifiers", "external-identifier"] => {
                let external = std::mem::take(&mut self.external);
                if let (Some(resource), Some(identifier)) = (external.resource, external.identifier) {
                    match resource_namespace(&resource) {
                        Some(prefix) => self.identifiers.push(prefix.curie(&identifier)),
                        None => tracing::trace!(resource = %resource, "unmapped DrugBank resource"),
                    }
                }
            }
            _ => {}
        }
    }
}

/// Withdrawn beats approved beats investigational.
fn group_status(groups: &[String]) -> Option<ApprovalStatus> {
    let has = |g: &str| groups.iter().any(|group| group == g);
    if has("withdrawn") {
        Some(ApprovalStatus::Withdrawn)
    } else if has("approved") {
        Some(ApprovalStatus::Approved)
    } else if has("investigational") {
        Some(ApprovalStatus::Investigational)
    } else {
        None
    }
}

#[derive(Default)]
struct ElementAttrs {
    primary: bool,
    language: Option<String>,
}

fn read_attrs(e: &BytesStart<'_>) -> Result<ElementAttrs, String> {
    let mut attrs = ElementAttrs::default();
    for attr in e.attributes() {
        let attr = attr.map_err(|err| err.to_string())?;
        let value = attr.unescape_value().map_err(|err| err.to_string())?;
        match attr.key.local_name().as_ref() {
            b"primary" => attrs.primary = value == "true",
            b"language" => attrs.language = Some(value.into_owned()),
            _ => {}
        }
    }
    Ok(attrs)
}

fn local_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
}

/// Stream drugs out of `reader`.
fn read_drugs<R: std::io::BufRead>(reader: R) -> Result<Vec<TherapyRecord>, String> {
    let mut reader = Reader::from_reader(reader);
    reader.config_mut().trim_text(true);

    let mut records = Vec::new();
    let mut stack: Vec<String> = Vec::new();
    let mut drug: Option<DrugEntry> = None;
    let mut attrs = ElementAttrs::default();
    let mut text = String::new();
    let mut buf = Vec::new();

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|e| format!("at byte {}: {e}", reader.buffer_position()))?;
        match event {
            Event::Start(e) => {
                stack.push(local_name(&e));
                text.clear();
                if stack.len() == DRUG_DEPTH && stack[1] == "drug" {
                    drug = Some(DrugEntry::default());
                } else if stack.len() > DRUG_DEPTH {
                    attrs = read_attrs(&e)?;
                }
            }
            Event::Empty(e) => {
                // Self-closing: no text, but containers still close.
                stack.push(local_name(&e));
                if let Some(entry) = drug.as_mut().filter(|_| stack.len() > DRUG_DEPTH) {
                    entry.on_close(&stack[DRUG_DEPTH..]);
                }
                stack.pop();
            }
            Event::Text(t) => {
                let unescaped = t.unescape().map_err(|e| e.to_string())?;
                text.push_str(&unescaped);
            }
            Event::CData(t) => text.push_str(&String::from_utf8_lossy(&t)),
            Event::End(_) => {
                if stack.len() == DRUG_DEPTH {
                    if let Some(record) = drug.take().and_then(DrugEntry::into_record) {
                        records.push(record);
                    }
                } else if let Some(entry) = drug.as_mut().filter(|_| stack.len() > DRUG_DEPTH) {
                    let path = &stack[DRUG_DEPTH..];
                    let value = std::mem::take(&mut text);
                    if value.is_empty() {
                        entry.on_close(path);
                    } else {
                        entry.on_text(path, value, &attrs);
                    }
                }
                text.clear();
                stack.pop();
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(records)
}

impl Source for DrugBank {
    fn name(&self) -> SourceName {
        SourceName::DrugBank
    }

    fn version(&self) -> &str {
        &self.version
    }

    fn meta(&self) -> SourceMeta {
        SourceMeta {
            data_license: "CC BY-NC 4.0".to_string(),
            data_license_url: "https://creativecommons.org/licenses/by-nc/4.0/legalcode".to_string(),
            version: self.version.clone(),
            data_url: Some(format!(
                "https://go.drugbank.com/releases/{}/downloads/all-full-database",
                self.version.replace('.', "-")
            )),
            rdp_url: Some("http://reusabledata.org/drugbank.html".to_string()),
            non_commercial: true,
            share_alike: false,
            attribution: true,
        }
    }

    fn transform(&mut self) -> Result<Vec<TherapyRecord>, EtlError> {
        let file = File::open(&self.path).map_err(|e| EtlError::io(&self.path, e))?;
        let records = read_drugs(BufReader::new(file))
            .map_err(|message| EtlError::parse(SourceName::DrugBank.as_str(), message))?;
        tracing::info!(records = records.len(), version = %self.version, "read DrugBank release");
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<drugbank xmlns="http://www.drugbank.ca" version="5.1">
  <drug type="small molecule">
    <drugbank-id primary="true">DB00515</drugbank-id>
    <drugbank-id>APRD00359</drugbank-id>
    <name>Cisplatin</name>
    <cas-number>15663-27-1</cas-number>
    <groups><group>approved</group></groups>
    <synonyms>
      <synonym language="english" coder="">CDDP</synonym>
      <synonym language="spanish" coder="">Cisplatino</synonym>
    </synonyms>
    <products>
      <product><name>Platinol</name><generic>false</generic><over-the-counter>false</over-the-counter><approved>true</approved></product>
      <product><name>Unapproved</name><generic>false</generic><over-the-counter>false</over-the-counter><approved>false</approved></product>
    </products>
    <international-brands>
      <international-brand><name>Abiplatin</name><company/></international-brand>
    </international-brands>
    <drug-interactions>
      <drug-interaction><drugbank-id>DB00001</drugbank-id><name>Lepirudin</name></drug-interaction>
    </drug-interactions>
    <external-identifiers>
      <external-identifier><resource>ChEBI</resource><identifier>27899</identifier></external-identifier>
      <external-identifier><resource>ChEMBL</resource><identifier>CHEMBL11359</identifier></external-identifier>
      <external-identifier><resource>Wikipedia</resource><identifier>Cisplatin</identifier></external-identifier>
    </external-identifiers>
  </drug>
</drugbank>"#;

    #[test]
    fn reads_direct_children_only() {
        let records = read_drugs(SAMPLE.as_bytes()).unwrap();
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.concept_id, "drugbank:DB00515");
        assert_eq!(r.label.as_deref(), Some("Cisplatin"));
        assert_eq!(r.approval_status, Some(ApprovalStatus::Approved));
        assert_eq!(r.aliases, vec!["APRD00359", "CDDP", "Abiplatin"]);
        assert_eq!(r.trade_names, vec!["Platinol"]);
        assert_eq!(r.xrefs, vec!["chemidplus:15663-27-1", "chembl:CHEMBL11359"]);
        assert_eq!(r.associated_with, vec!["chebi:27899"]);
    }

    #[test]
    fn withdrawn_group_wins() {
        let groups = vec!["approved".to_string(), "withdrawn".to_string()];
        assert_eq!(group_status(&groups), Some(ApprovalStatus::Withdrawn));
        assert_eq!(group_status(&[]), None);
    }
}

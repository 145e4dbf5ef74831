//! RxNorm: reads `RXNCONSO.RRF` saved as `rxnorm_<version>.RRF`.
//!
//! Rows are pipe-delimited. Columns used: 0 RXCUI, 11 SAB, 12 TTY, 13 CODE,
//! 14 STR, 17 CVF. Only concepts that end up with an RxNorm ingredient label
//! (IN or PIN) are emitted.

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use therapy_core::errors::EtlError;
use therapy_core::types::record::push_unique;
use therapy_core::{ApprovalStatus, NamespacePrefix, SourceMeta, SourceName, TherapyRecord};

use super::version_from_path;
use crate::Source;

/// Sources with UMLS restriction level 0 or 1.
const ALLOWED_SOURCES: [&str; 10] = [
    "ATC", "CVX", "DRUGBANK", "MMSL", "MSH", "MTHCMSFRF", "MTHSPL", "RXNORM", "USP", "VANDF",
];

/// Term types read as aliases.
const ALIAS_TYPES: [&str; 10] = ["SYN", "SY", "TMSY", "PM", "GN", "PT", "PEP", "CD", "ET", "RXN_PT"];

/// Term types read as trade names.
const TRADE_NAME_TYPES: [&str; 3] = ["BD", "BN", "SBD"];

/// CVF flag marking the prescribable subset.
const PRESCRIBABLE_CVF: &str = "4096";

const MIN_COLUMNS: usize = 18;

/// Strength expressions inside SBDC terms, e.g. `10 MG/ML`.
static STRENGTH: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(\d*)(\d*\.)?\d+ (MG|UNT|ML)?(/(ML|HR|MG))?").ok());

struct Row<'a> {
    rxcui: &'a str,
    sab: &'a str,
    tty: &'a str,
    code: &'a str,
    term: &'a str,
    cvf: &'a str,
}

impl<'a> Row<'a> {
    fn parse(line: &'a str) -> Option<Self> {
        let cols: Vec<&str> = line.split('|').collect();
        if cols.len() < MIN_COLUMNS {
            return None;
        }
        Some(Self {
            rxcui: cols[0],
            sab: cols[11],
            tty: cols[12],
            code: cols[13],
            term: cols[14],
            cvf: cols[17],
        })
    }
}

pub struct RxNorm {
    path: PathBuf,
    version: String,
}

/// A concept under construction.
struct Draft {
    record: TherapyRecord,
    /// MeSH descriptor code, used to find precise ingredients.
    mesh_code: Option<String>,
}

#[derive(Default)]
struct Lookups {
    /// lower-cased ingredient -> brand names, from SBDC rows.
    ingredient_brands: HashMap<String, Vec<String>>,
    /// MeSH code -> precise ingredient names, from MSH PEP rows.
    precise_ingredients: HashMap<String, Vec<String>>,
    /// lower-cased ingredient -> brand names, from SBDF rows.
    form_brands: HashMap<String, Vec<String>>,
    /// brand name -> RxNorm BN concept id.
    brand_concepts: HashMap<String, String>,
    unknown_sources: HashSet<String>,
}

impl RxNorm {
    pub fn new(path: &Path) -> Result<Self, EtlError> {
        Ok(Self {
            path: path.to_path_buf(),
            version: version_from_path(SourceName::RxNorm, path)?,
        })
    }

    /// `rxnorm_drug_forms_<version>.yaml` next to the RRF file.
    pub fn drug_forms_path(&self) -> PathBuf {
        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        dir.join(format!("rxnorm_drug_forms_{}.yaml", self.version))
    }

    /// Drug form names (RXNORM DF rows), read from the YAML cache or
    /// collected from the RRF file and cached.
    pub fn drug_forms(&self) -> Result<Vec<String>, EtlError> {
        let cache = self.drug_forms_path();
        if cache.is_file() {
            let file = File::open(&cache).map_err(|e| EtlError::io(&cache, e))?;
            return serde_yaml::from_reader(file)
                .map_err(|e| EtlError::parse(SourceName::RxNorm.as_str(), format!("{}: {e}", cache.display())));
        }

        let mut forms: Vec<String> = Vec::new();
        self.for_each_row(|row| {
            if row.tty == "DF" && row.sab == "RXNORM" {
                push_unique(&mut forms, row.term);
            }
        })?;

        let file = File::create(&cache).map_err(|e| EtlError::io(&cache, e))?;
        serde_yaml::to_writer(file, &forms).map_err(|e| EtlError::io(&cache, e))?;
        tracing::debug!(path = %cache.display(), forms = forms.len(), "cached RxNorm drug forms");
        Ok(forms)
    }

    fn for_each_row<F>(&self, mut f: F) -> Result<(), EtlError>
    where
        F: FnMut(Row<'_>),
    {
        let file = File::open(&self.path).map_err(|e| EtlError::io(&self.path, e))?;
        for line in BufReader::new(file).lines() {
            let line = line.map_err(|e| EtlError::io(&self.path, e))?;
            if let Some(row) = Row::parse(&line) {
                f(row);
            }
        }
        Ok(())
    }
}

impl Source for RxNorm {
    fn name(&self) -> SourceName {
        SourceName::RxNorm
    }

    fn version(&self) -> &str {
        &self.version
    }

    fn meta(&self) -> SourceMeta {
        SourceMeta {
            data_license: "UMLS Metathesaurus".to_string(),
            data_license_url:
                "https://www.nlm.nih.gov/research/umls/rxnorm/docs/termsofservice.html".to_string(),
            version: self.version.clone(),
            data_url: Some(
                "https://www.nlm.nih.gov/research/umls/rxnorm/docs/rxnormfiles.html".to_string(),
            ),
            rdp_url: None,
            non_commercial: false,
            share_alike: false,
            attribution: true,
        }
    }

    fn transform(&mut self) -> Result<Vec<TherapyRecord>, EtlError> {
        let drug_forms = self.drug_forms()?;
        let mut drafts: Vec<Draft> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut lookups = Lookups::default();

        self.for_each_row(|row| {
            if !ALLOWED_SOURCES.contains(&row.sab) {
                return;
            }
            let concept_id = SourceName::RxNorm.concept_id(row.rxcui);
            if row.sab == "RXNORM" && row.tty == "BN" {
                lookups
                    .brand_concepts
                    .insert(row.term.to_string(), concept_id.clone());
            }
            if row.sab == "RXNORM" && row.tty == "SBDC" {
                add_component_brands(row.term, &mut lookups.ingredient_brands);
                return;
            }

            let idx = *index.entry(concept_id.clone()).or_insert_with(|| {
                drafts.push(Draft {
                    record: TherapyRecord::new(concept_id, SourceName::RxNorm),
                    mesh_code: None,
                });
                drafts.len() - 1
            });
            let draft = &mut drafts[idx];
            add_term(draft, &row, &drug_forms, &mut lookups);
            add_identifier(&mut draft.record, &row, &mut lookups.unknown_sources);
        })?;

        let records: Vec<TherapyRecord> = drafts
            .into_iter()
            .filter(|draft| draft.record.label.is_some())
            .map(|mut draft| {
                add_trade_names(&mut draft, &lookups);
                add_brand_ids(&mut draft.record, &lookups.brand_concepts);
                draft.record
            })
            .collect();
        tracing::info!(records = records.len(), version = %self.version, "read RxNorm release");
        Ok(records)
    }
}

/// Label, status, aliases, trade names and the SBDF/MSH lookups.
fn add_term(draft: &mut Draft, row: &Row<'_>, drug_forms: &[String], lookups: &mut Lookups) {
    let record = &mut draft.record;
    if (row.tty == "IN" || row.tty == "PIN") && row.sab == "RXNORM" {
        record.label = Some(row.term.to_string());
        if row.cvf == PRESCRIBABLE_CVF {
            record.approval_status = Some(ApprovalStatus::RxnormPrescribable);
        }
    } else if ALIAS_TYPES.contains(&row.tty) {
        push_unique(&mut record.aliases, row.term);
    } else if TRADE_NAME_TYPES.contains(&row.tty) {
        push_unique(&mut record.trade_names, row.term);
    }

    match row.sab {
        "RXNORM" if row.tty == "SBDF" => {
            let brand = bracketed_brand(row.term);
            let ingredient_form = row.term.replace(&format!("[{brand}]"), "");
            if let Some(form) = drug_forms.iter().find(|df| ingredient_form.contains(df.as_str())) {
                let ingredient = ingredient_form.replace(form.as_str(), "").trim().to_lowercase();
                push_unique(lookups.form_brands.entry(ingredient).or_default(), brand);
            }
        }
        "MSH" if row.tty == "MH" => draft.mesh_code = Some(row.code.to_string()),
        "MSH" if row.tty == "PEP" => {
            push_unique(
                lookups.precise_ingredients.entry(row.code.to_string()).or_default(),
                row.term,
            );
        }
        _ => {}
    }
}

/// Source code of the row as an xref or association.
fn add_identifier(record: &mut TherapyRecord, row: &Row<'_>, unknown: &mut HashSet<String>) {
    if row.sab.is_empty() || row.code == "NOCODE" {
        return;
    }
    let Some(prefix) = source_namespace(row.sab) else {
        if unknown.insert(row.sab.to_string()) {
            tracing::info!(sab = row.sab, "no namespace for RxNorm source, skipping its codes");
        }
        return;
    };
    let curie = prefix.curie(row.code);
    if prefix.is_normalizer_source() {
        if curie != record.concept_id {
            push_unique(&mut record.xrefs, &curie);
        }
    } else {
        push_unique(&mut record.associated_with, &curie);
    }
}

fn source_namespace(sab: &str) -> Option<NamespacePrefix> {
    match sab.to_ascii_uppercase().as_str() {
        "ATC" => Some(NamespacePrefix::Atc),
        "CVX" => Some(NamespacePrefix::Cvx),
        "DRUGBANK" => Some(NamespacePrefix::DrugBank),
        "MMSL" => Some(NamespacePrefix::Mmsl),
        "MSH" => Some(NamespacePrefix::Mesh),
        "MTHSPL" => Some(NamespacePrefix::Unii),
        "RXNORM" => Some(NamespacePrefix::RxNorm),
        "USP" => Some(NamespacePrefix::Usp),
        "VANDF" => Some(NamespacePrefix::Vandf),
        _ => None,
    }
}

/// Text between the last `[` and the following `]`.
fn bracketed_brand(term: &str) -> &str {
    let tail = term.rsplit('[').next().unwrap_or(term);
    tail.split(']').next().unwrap_or(tail)
}

/// SBDC: `ingredient(s) strength [Brand]`. Each ingredient gets the brand.
fn add_component_brands(term: &str, ingredient_brands: &mut HashMap<String, Vec<String>>) {
    let brand = bracketed_brand(term);
    let without_strength = match STRENGTH.as_ref() {
        Some(re) => re.replace_all(term, "").into_owned(),
        None => term.to_string(),
    };
    let ingredients = without_strength.replace(&format!("[{brand}]"), "");
    for ingredient in ingredients.split('/') {
        let ingredient = ingredient.trim().to_lowercase();
        if !ingredient.is_empty() {
            push_unique(ingredient_brands.entry(ingredient).or_default(), brand);
        }
    }
}

/// Brands of the label, of its precise ingredients and of its SBDF forms.
fn add_trade_names(draft: &mut Draft, lookups: &Lookups) {
    let Some(label) = draft.record.label.as_deref().map(str::to_lowercase) else {
        return;
    };
    let mut names = vec![label.clone()];
    if let Some(precise) = draft
        .mesh_code
        .as_ref()
        .and_then(|code| lookups.precise_ingredients.get(code))
    {
        names.extend(precise.iter().map(|p| p.to_lowercase()));
    }

    let record = &mut draft.record;
    for name in &names {
        for brand in lookups.ingredient_brands.get(name).into_iter().flatten() {
            push_unique(&mut record.trade_names, brand);
        }
    }
    for brand in lookups.form_brands.get(&label).into_iter().flatten() {
        push_unique(&mut record.trade_names, brand);
    }
}

/// BN concepts whose name is one of the record's trade names.
fn add_brand_ids(record: &mut TherapyRecord, brand_concepts: &HashMap<String, String>) {
    let ids: Vec<String> = record
        .trade_names
        .iter()
        .filter_map(|tn| brand_concepts.get(tn).cloned())
        .collect();
    for id in ids {
        push_unique(&mut record.rx_brand_ids, &id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brand_is_last_bracketed_text() {
        assert_eq!(bracketed_brand("cisplatin 1 MG/ML [Platinol]"), "Platinol");
        assert_eq!(bracketed_brand("no brand"), "no brand");
    }

    #[test]
    fn component_brands_split_ingredients_and_drop_strength() {
        let mut map = HashMap::new();
        add_component_brands(
            "amlodipine 5 MG / benazepril hydrochloride 10 MG [Lotrel]",
            &mut map,
        );
        assert_eq!(map.get("amlodipine"), Some(&vec!["Lotrel".to_string()]));
        assert_eq!(
            map.get("benazepril hydrochloride"),
            Some(&vec!["Lotrel".to_string()])
        );
    }

    #[test]
    fn mthspl_codes_are_unii() {
        assert_eq!(source_namespace("MTHSPL"), Some(NamespacePrefix::Unii));
        assert_eq!(source_namespace("MTHCMSFRF"), None);
    }
}

//! CURIE namespace prefixes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Known identifier namespaces.
///
/// Prefixes of normalizer sources (the ones a therapy normalizer builds
/// concepts from) mark an identifier as an xref. Every other namespace marks
/// it as an association.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NamespacePrefix {
    Chembl,
    ChemIdPlus,
    DrugBank,
    DrugsAtFda,
    GuideToPharmacology,
    HemOnc,
    Ncit,
    RxNorm,
    Wikidata,
    Atc,
    BindingDb,
    Chebi,
    ChemSpider,
    Cvx,
    Iuphar,
    KeggCompound,
    KeggDrug,
    Mmsl,
    Mesh,
    Pdb,
    PharmGkb,
    PubChemCompound,
    PubChemSubstance,
    TherapeuticTargetsDb,
    Unii,
    Usp,
    Vandf,
    Zinc,
}

impl NamespacePrefix {
    pub const ALL: [NamespacePrefix; 28] = [
        NamespacePrefix::Chembl,
        NamespacePrefix::ChemIdPlus,
        NamespacePrefix::DrugBank,
        NamespacePrefix::DrugsAtFda,
        NamespacePrefix::GuideToPharmacology,
        NamespacePrefix::HemOnc,
        NamespacePrefix::Ncit,
        NamespacePrefix::RxNorm,
        NamespacePrefix::Wikidata,
        NamespacePrefix::Atc,
        NamespacePrefix::BindingDb,
        NamespacePrefix::Chebi,
        NamespacePrefix::ChemSpider,
        NamespacePrefix::Cvx,
        NamespacePrefix::Iuphar,
        NamespacePrefix::KeggCompound,
        NamespacePrefix::KeggDrug,
        NamespacePrefix::Mmsl,
        NamespacePrefix::Mesh,
        NamespacePrefix::Pdb,
        NamespacePrefix::PharmGkb,
        NamespacePrefix::PubChemCompound,
        NamespacePrefix::PubChemSubstance,
        NamespacePrefix::TherapeuticTargetsDb,
        NamespacePrefix::Unii,
        NamespacePrefix::Usp,
        NamespacePrefix::Vandf,
        NamespacePrefix::Zinc,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NamespacePrefix::Chembl => "chembl",
            NamespacePrefix::ChemIdPlus => "chemidplus",
            NamespacePrefix::DrugBank => "drugbank",
            NamespacePrefix::DrugsAtFda => "drugsatfda",
            NamespacePrefix::GuideToPharmacology => "iuphar.ligand",
            NamespacePrefix::HemOnc => "hemonc",
            NamespacePrefix::Ncit => "ncit",
            NamespacePrefix::RxNorm => "rxcui",
            NamespacePrefix::Wikidata => "wikidata",
            NamespacePrefix::Atc => "atc",
            NamespacePrefix::BindingDb => "bindingdb",
            NamespacePrefix::Chebi => "chebi",
            NamespacePrefix::ChemSpider => "chemspider",
            NamespacePrefix::Cvx => "cvx",
            NamespacePrefix::Iuphar => "iuphar",
            NamespacePrefix::KeggCompound => "kegg.compound",
            NamespacePrefix::KeggDrug => "kegg.drug",
            NamespacePrefix::Mmsl => "mmsl",
            NamespacePrefix::Mesh => "mesh",
            NamespacePrefix::Pdb => "pdb",
            NamespacePrefix::PharmGkb => "pharmgkb.drug",
            NamespacePrefix::PubChemCompound => "pubchem.compound",
            NamespacePrefix::PubChemSubstance => "pubchem.substance",
            NamespacePrefix::TherapeuticTargetsDb => "ttd",
            NamespacePrefix::Unii => "unii",
            NamespacePrefix::Usp => "usp",
            NamespacePrefix::Vandf => "vandf",
            NamespacePrefix::Zinc => "zinc",
        }
    }

    /// Whether identifiers in this namespace point at normalizer concepts.
    pub fn is_normalizer_source(&self) -> bool {
        matches!(
            self,
            NamespacePrefix::Chembl
                | NamespacePrefix::ChemIdPlus
                | NamespacePrefix::DrugBank
                | NamespacePrefix::DrugsAtFda
                | NamespacePrefix::GuideToPharmacology
                | NamespacePrefix::HemOnc
                | NamespacePrefix::Ncit
                | NamespacePrefix::RxNorm
                | NamespacePrefix::Wikidata
        )
    }

    /// Look up a prefix string, case-insensitively.
    pub fn from_prefix(prefix: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(prefix))
    }

    /// Prefix of a CURIE (`prefix:local_id`), if it is a known namespace.
    pub fn of_curie(curie: &str) -> Option<Self> {
        curie.split_once(':').and_then(|(prefix, _)| Self::from_prefix(prefix))
    }

    /// Build a CURIE in this namespace.
    pub fn curie(&self, local_id: &str) -> String {
        format!("{}:{}", self.as_str(), local_id)
    }
}

impl fmt::Display for NamespacePrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

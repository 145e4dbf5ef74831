//! Source names and per-source metadata.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::NamespacePrefix;

/// Sources whose releases are loaded into the concept tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceName {
    #[serde(rename = "ChEMBL")]
    Chembl,
    #[serde(rename = "RxNorm")]
    RxNorm,
    #[serde(rename = "DrugBank")]
    DrugBank,
    #[serde(rename = "Wikidata")]
    Wikidata,
}

impl SourceName {
    pub const ALL: [SourceName; 4] = [
        SourceName::Chembl,
        SourceName::RxNorm,
        SourceName::DrugBank,
        SourceName::Wikidata,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceName::Chembl => "ChEMBL",
            SourceName::RxNorm => "RxNorm",
            SourceName::DrugBank => "DrugBank",
            SourceName::Wikidata => "Wikidata",
        }
    }

    /// Namespace used for this source's concept ids.
    pub fn prefix(&self) -> NamespacePrefix {
        match self {
            SourceName::Chembl => NamespacePrefix::Chembl,
            SourceName::RxNorm => NamespacePrefix::RxNorm,
            SourceName::DrugBank => NamespacePrefix::DrugBank,
            SourceName::Wikidata => NamespacePrefix::Wikidata,
        }
    }

    /// Build a concept id (`prefix:local_id`) in this source's namespace.
    pub fn concept_id(&self, local_id: &str) -> String {
        format!("{}:{}", self.prefix().as_str(), local_id)
    }
}

impl fmt::Display for SourceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SourceName::ALL
            .into_iter()
            .find(|src| src.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown source: {s}"))
    }
}

/// Licensing and provenance metadata recorded for each loaded source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceMeta {
    pub data_license: String,
    pub data_license_url: String,
    pub version: String,
    pub data_url: Option<String>,
    pub rdp_url: Option<String>,
    pub non_commercial: bool,
    pub share_alike: bool,
    pub attribution: bool,
}

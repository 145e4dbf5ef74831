//! The normalized therapy record written to the concept tables.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::SourceName;

/// Regulatory approval status of a therapy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    Approved,
    Investigational,
    Withdrawn,
    RxnormPrescribable,
}

impl ApprovalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalStatus::Approved => "approved",
            ApprovalStatus::Investigational => "investigational",
            ApprovalStatus::Withdrawn => "withdrawn",
            ApprovalStatus::RxnormPrescribable => "rxnorm_prescribable",
        }
    }
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApprovalStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "approved" => Ok(ApprovalStatus::Approved),
            "investigational" => Ok(ApprovalStatus::Investigational),
            "withdrawn" => Ok(ApprovalStatus::Withdrawn),
            "rxnorm_prescribable" => Ok(ApprovalStatus::RxnormPrescribable),
            other => Err(format!("unknown approval status: {other}")),
        }
    }
}

/// A therapy concept plus every child row that hangs off its `concept_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TherapyRecord {
    pub concept_id: String,
    pub source: SourceName,
    pub label: Option<String>,
    pub approval_status: Option<ApprovalStatus>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub trade_names: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub xrefs: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub associated_with: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rx_brand_ids: Vec<String>,
}

impl TherapyRecord {
    pub fn new(concept_id: impl Into<String>, source: SourceName) -> Self {
        Self {
            concept_id: concept_id.into(),
            source,
            label: None,
            approval_status: None,
            aliases: Vec::new(),
            trade_names: Vec::new(),
            xrefs: Vec::new(),
            associated_with: Vec::new(),
            rx_brand_ids: Vec::new(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// Append `term` to `list` unless an identical value is already present.
pub fn push_unique(list: &mut Vec<String>, term: &str) {
    if !list.iter().any(|t| t == term) {
        list.push(term.to_string());
    }
}

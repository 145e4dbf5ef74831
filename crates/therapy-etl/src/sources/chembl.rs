//! ChEMBL: reads the SQLite release (`chembl_<version>.db`).

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use rusqlite::{Connection, OpenFlags};
use therapy_core::errors::EtlError;
use therapy_core::types::record::push_unique;
use therapy_core::{ApprovalStatus, SourceMeta, SourceName, TherapyRecord};

use super::version_from_path;
use crate::Source;

pub struct Chembl {
    path: PathBuf,
    version: String,
}

impl Chembl {
    pub fn new(path: &Path) -> Result<Self, EtlError> {
        Ok(Self {
            path: path.to_path_buf(),
            version: version_from_path(SourceName::Chembl, path)?,
        })
    }

    fn read(&self, conn: &Connection) -> rusqlite::Result<Vec<TherapyRecord>> {
        let mut records = Vec::new();
        let mut by_molregno: HashMap<i64, usize> = HashMap::new();

        let mut stmt = conn.prepare(
            "SELECT molregno, chembl_id, pref_name, max_phase, withdrawn_flag
             FROM molecule_dictionary ORDER BY molregno",
        )?;
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            let molregno: i64 = row.get(0)?;
            let chembl_id: String = row.get(1)?;
            let mut record = TherapyRecord::new(SourceName::Chembl.concept_id(&chembl_id), SourceName::Chembl);
            record.label = row.get(2)?;
            record.approval_status = approval_status(row.get(3)?, row.get(4)?);
            by_molregno.insert(molregno, records.len());
            records.push(record);
        }

        let mut stmt = conn.prepare("SELECT molregno, synonyms FROM molecule_synonyms ORDER BY rowid")?;
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            let molregno: i64 = row.get(0)?;
            let synonym: Option<String> = row.get(1)?;
            if let (Some(&idx), Some(synonym)) = (by_molregno.get(&molregno), synonym) {
                push_unique(&mut records[idx].aliases, &synonym);
            }
        }

        let mut stmt = conn.prepare(
            "SELECT f.molregno, p.trade_name
             FROM formulations f JOIN products p ON f.product_id = p.product_id
             ORDER BY f.rowid",
        )?;
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            let molregno: i64 = row.get(0)?;
            let trade_name: Option<String> = row.get(1)?;
            if let (Some(&idx), Some(trade_name)) = (by_molregno.get(&molregno), trade_name) {
                push_unique(&mut records[idx].trade_names, &trade_name);
            }
        }

        Ok(records)
    }
}

/// Withdrawn wins; phase 4 is approved; phase 0 has no status; any other
/// phase, including an unknown one, is investigational.
fn approval_status(max_phase: Option<f64>, withdrawn: Option<i64>) -> Option<ApprovalStatus> {
    if withdrawn.unwrap_or(0) != 0 {
        return Some(ApprovalStatus::Withdrawn);
    }
    match max_phase {
        Some(phase) if phase == 4.0 => Some(ApprovalStatus::Approved),
        Some(phase) if phase == 0.0 => None,
        _ => Some(ApprovalStatus::Investigational),
    }
}

impl Source for Chembl {
    fn name(&self) -> SourceName {
        SourceName::Chembl
    }

    fn version(&self) -> &str {
        &self.version
    }

    fn meta(&self) -> SourceMeta {
        SourceMeta {
            data_license: "CC BY-SA 3.0".to_string(),
            data_license_url: "https://creativecommons.org/licenses/by-sa/3.0/".to_string(),
            version: self.version.clone(),
            data_url: Some("https://www.ebi.ac.uk/chembl/".to_string()),
            rdp_url: Some("http://reusabledata.org/chembl.html".to_string()),
            non_commercial: false,
            share_alike: true,
            attribution: true,
        }
    }

    fn transform(&mut self) -> Result<Vec<TherapyRecord>, EtlError> {
        let conn = Connection::open_with_flags(&self.path, OpenFlags::SQLITE_OPEN_READ_ONLY)
            .map_err(|e| EtlError::io(&self.path, e))?;
        let records = self
            .read(&conn)
            .map_err(|e| EtlError::parse(SourceName::Chembl.as_str(), e))?;
        tracing::info!(records = records.len(), version = %self.version, "read ChEMBL release");
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_from_phase_and_withdrawn_flag() {
        assert_eq!(approval_status(Some(4.0), Some(1)), Some(ApprovalStatus::Withdrawn));
        assert_eq!(approval_status(Some(4.0), Some(0)), Some(ApprovalStatus::Approved));
        assert_eq!(approval_status(Some(0.0), None), None);
        assert_eq!(approval_status(Some(2.0), None), Some(ApprovalStatus::Investigational));
        assert_eq!(approval_status(None, None), Some(ApprovalStatus::Investigational));
    }
}

//! Per-source release readers.
//!
//! Release files follow the `<source>_<version>.<ext>` naming used in the
//! data directory, e.g. `rxnorm_20240101.RRF` or `drugbank_5.1.10.xml`.

pub mod chembl;
pub mod drugbank;
pub mod rxnorm;
pub mod wikidata;

use std::path::{Path, PathBuf};

use therapy_core::errors::EtlError;
use therapy_core::SourceName;

use crate::Source;

pub use chembl::Chembl;
pub use drugbank::DrugBank;
pub use rxnorm::RxNorm;
pub use wikidata::Wikidata;

/// Open the reader for `name` over the release at `path`.
pub fn open_source(name: SourceName, path: &Path) -> Result<Box<dyn Source>, EtlError> {
    if !path.is_file() {
        return Err(EtlError::FileNotFound {
            path: path.display().to_string(),
        });
    }
    let source: Box<dyn Source> = match name {
        SourceName::Chembl => Box::new(Chembl::new(path)?),
        SourceName::RxNorm => Box::new(RxNorm::new(path)?),
        SourceName::DrugBank => Box::new(DrugBank::new(path)?),
        SourceName::Wikidata => Box::new(Wikidata::new(path)?),
    };
    Ok(source)
}

/// File name prefix and extension of a source's release files.
pub fn release_pattern(name: SourceName) -> (&'static str, &'static str) {
    match name {
        SourceName::Chembl => ("chembl_", "db"),
        SourceName::RxNorm => ("rxnorm_", "RRF"),
        SourceName::DrugBank => ("drugbank_", "xml"),
        SourceName::Wikidata => ("wikidata_", "json"),
    }
}

/// The newest release of `name` under `<data_dir>/<source>/`.
/// Releases sort by file name, so the last one wins.
pub fn latest_release(data_dir: &Path, name: SourceName) -> Result<PathBuf, EtlError> {
    let dir = data_dir.join(name.as_str().to_lowercase());
    let (prefix, ext) = release_pattern(name);
    let entries = std::fs::read_dir(&dir).map_err(|_| EtlError::FileNotFound {
        path: dir.display().to_string(),
    })?;

    let mut releases: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
            let matches_ext = path.extension().and_then(|e| e.to_str()) == Some(ext);
            file_name.starts_with(prefix) && matches_ext
        })
        .collect();
    releases.sort();
    releases.pop().ok_or_else(|| EtlError::FileNotFound {
        path: dir.join(format!("{prefix}*.{ext}")).display().to_string(),
    })
}

/// Version part of a release file name: `rxnorm_20240101.RRF` -> `20240101`.
pub fn version_from_path(name: SourceName, path: &Path) -> Result<String, EtlError> {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    match stem.split_once('_') {
        Some((_, version)) if !version.is_empty() => Ok(version.to_string()),
        _ => Err(EtlError::parse(
            name.as_str(),
            format!("cannot read a version from file name {}", path.display()),
        )),
    }
}

//! Source loaders for the therapy concept store.
//!
//! Each [`Source`] turns one release file into [`TherapyRecord`]s. Loading
//! normalizes the records, replaces every concept previously loaded from the
//! same source and records the release metadata, all in one transaction.

pub mod normalize;
pub mod sources;
pub mod xrefs;

use therapy_core::config::EtlConfig;
use therapy_core::errors::EtlError;
use therapy_core::{SourceMeta, SourceName, TherapyRecord};
use therapy_storage::connection::writer::with_immediate_transaction;
use therapy_storage::queries::load::load_record;
use therapy_storage::queries::sources::{delete_source_concepts, upsert_source_meta};
use therapy_storage::DatabaseManager;

pub use sources::open_source;

/// One source release that can be transformed into therapy records.
pub trait Source {
    fn name(&self) -> SourceName;

    /// Release version, usually taken from the file name.
    fn version(&self) -> &str;

    fn meta(&self) -> SourceMeta;

    /// Read the release and build one record per concept.
    fn transform(&mut self) -> Result<Vec<TherapyRecord>, EtlError>;
}

/// Counts reported after a source load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadSummary {
    pub source: SourceName,
    pub version: String,
    pub replaced: usize,
    pub loaded: usize,
}

/// Transform `source`, normalize the records and write them.
pub fn load_source(
    db: &DatabaseManager,
    source: &mut dyn Source,
    config: &EtlConfig,
) -> Result<LoadSummary, EtlError> {
    let name = source.name();
    tracing::info!(source = %name, version = source.version(), "transforming source");

    let mut records = source.transform()?;
    let max_list_len = config.effective_max_list_len();
    for record in &mut records {
        normalize::normalize(record, max_list_len);
    }

    let meta = source.meta();
    let (replaced, loaded) = db.with_writer(|conn| {
        with_immediate_transaction(conn, |conn| {
            let replaced = delete_source_concepts(conn, name)?;
            for record in &records {
                load_record(conn, record)?;
            }
            upsert_source_meta(conn, name, &meta)?;
            Ok::<_, EtlError>((replaced, records.len()))
        })
    })?;
    db.checkpoint()?;

    tracing::info!(source = %name, replaced, loaded, "loaded source");
    Ok(LoadSummary {
        source: name,
        version: source.version().to_string(),
        replaced,
        loaded,
    })
}

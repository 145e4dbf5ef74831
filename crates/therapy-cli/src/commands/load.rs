//! `therapy load <source> [path]`

use std::path::Path;

use anyhow::Context;
use serde_json::json;
use therapy_core::config::TherapyConfig;
use therapy_core::errors::EtlError;
use therapy_core::SourceName;
use therapy_etl::sources::{latest_release, open_source};
use therapy_etl::load_source;

use super::open_db;

pub fn run(
    config: &TherapyConfig,
    source: &str,
    path: Option<&Path>,
    as_json: bool,
) -> anyhow::Result<()> {
    let name: SourceName = source
        .parse()
        .map_err(|_| EtlError::UnknownSource(source.to_string()))?;
    let release = match path {
        Some(path) => path.to_path_buf(),
        None => latest_release(&config.etl.effective_data_dir(), name)?,
    };

    let db = open_db(config)?;
    let mut reader = open_source(name, &release)?;
    let summary = load_source(&db, reader.as_mut(), &config.etl)
        .with_context(|| format!("loading {} from {}", name, release.display()))?;

    if as_json {
        println!(
            "{}",
            json!({
                "source": summary.source,
                "version": summary.version,
                "replaced": summary.replaced,
                "loaded": summary.loaded,
            })
        );
    } else {
        println!(
            "{} {}: loaded {} concepts (replaced {})",
            summary.source, summary.version, summary.loaded, summary.replaced
        );
    }
    Ok(())
}

//! Subcommand implementations. Each prints to stdout and returns errors to
//! `main` for reporting.

pub mod check;
pub mod constraints;
pub mod load;
pub mod lookup;

use serde_json::json;
use therapy_core::config::TherapyConfig;
use therapy_storage::migrations::{current_version, LATEST_VERSION};
use therapy_storage::DatabaseManager;

/// Open the configured database, running pending migrations.
pub fn open_db(config: &TherapyConfig) -> anyhow::Result<DatabaseManager> {
    Ok(DatabaseManager::open_with_config(&config.storage)?)
}

/// Open the configured database as it is.
pub fn open_db_unmigrated(config: &TherapyConfig) -> anyhow::Result<DatabaseManager> {
    Ok(DatabaseManager::open_unmigrated(&config.storage)?)
}

pub fn migrate(config: &TherapyConfig, as_json: bool) -> anyhow::Result<()> {
    let db = open_db(config)?;
    let version = db.with_reader(current_version)?;
    if as_json {
        println!("{}", json!({ "version": version, "latest": LATEST_VERSION }));
    } else {
        println!("schema at version {version}");
    }
    Ok(())
}

pub fn backfill_xrefs(config: &TherapyConfig, as_json: bool) -> anyhow::Result<()> {
    let db = open_db(config)?;
    let updated = db.with_writer(therapy_etl::xrefs::backfill_xrefs)?;
    if as_json {
        println!("{}", json!({ "updated": updated }));
    } else {
        println!("updated identifiers of {updated} concepts");
    }
    Ok(())
}

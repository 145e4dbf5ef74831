//! `therapy`: schema, constraint and source administration for the therapy
//! concept store.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use therapy_core::config::{CliOverrides, TherapyConfig};
use therapy_core::errors::{ConfigError, ConstraintError, EtlError, StorageError, TherapyErrorCode};

#[derive(Parser, Debug)]
#[command(name = "therapy")]
#[command(version, about = "Therapy concept store administration")]
pub struct Args {
    /// Database file (overrides config and THERAPY_DB_PATH)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Project config file [default: ./therapy.toml]
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding source releases
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Print machine-readable JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create or upgrade the schema
    Migrate,
    /// Manage the concept_id foreign keys
    #[command(subcommand)]
    Constraints(ConstraintsCommand),
    /// Report orphan rows and run SQLite integrity checks
    Check,
    /// Load a source release
    Load {
        /// chembl, rxnorm, drugbank or wikidata
        source: String,
        /// Release file [default: newest release in the data directory]
        path: Option<PathBuf>,
    },
    /// Re-split stored identifiers into xrefs and associations
    BackfillXrefs,
    /// Find concepts by id, label, trade name, alias or identifier
    Lookup { term: String },
}

#[derive(Subcommand, Debug)]
pub enum ConstraintsCommand {
    /// Print the constraint DDL as PostgreSQL statements
    Sql {
        /// Print the DROP CONSTRAINT script instead
        #[arg(long)]
        rollback: bool,
    },
    /// Attach the foreign keys to the child tables
    Apply,
    /// Remove the foreign keys from the child tables
    Drop,
    /// Show which foreign keys are present and enforced
    Status,
}

fn main() {
    therapy_core::tracing::init_tracing();
    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("Error: {}", describe(&e));
        std::process::exit(1);
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    let config = load_config(&args)?;
    tracing::debug!(db = %config.storage.effective_db_path().display(), "configuration loaded");

    match &args.command {
        Command::Migrate => commands::migrate(&config, args.json),
        Command::Constraints(cmd) => commands::constraints::run(&config, cmd, args.json),
        Command::Check => commands::check::run(&config, args.json),
        Command::Load { source, path } => {
            commands::load::run(&config, source, path.as_deref(), args.json)
        }
        Command::BackfillXrefs => commands::backfill_xrefs(&config, args.json),
        Command::Lookup { term } => commands::lookup::run(&config, term, args.json),
    }
}

fn load_config(args: &Args) -> Result<TherapyConfig, ConfigError> {
    let overrides = CliOverrides {
        db_path: args.db.as_ref().map(|p| p.display().to_string()),
        data_dir: args.data_dir.as_ref().map(|p| p.display().to_string()),
    };
    let project_file = args
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from("therapy.toml"));
    if args.config.is_some() && !project_file.exists() {
        return Err(ConfigError::FileNotFound {
            path: project_file.display().to_string(),
        });
    }
    TherapyConfig::load_from(&project_file, Some(&overrides))
}

/// Coded rendering for the workspace's own errors, plain chain otherwise.
fn describe(err: &anyhow::Error) -> String {
    if let Some(e) = err.downcast_ref::<ConstraintError>() {
        e.coded_string()
    } else if let Some(e) = err.downcast_ref::<StorageError>() {
        e.coded_string()
    } else if let Some(e) = err.downcast_ref::<EtlError>() {
        e.coded_string()
    } else if let Some(e) = err.downcast_ref::<ConfigError>() {
        e.coded_string()
    } else {
        format!("{err:#}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_constraint_commands() {
        let args = Args::try_parse_from(["therapy", "constraints", "sql", "--rollback"]).unwrap();
        assert!(matches!(
            args.command,
            Command::Constraints(ConstraintsCommand::Sql { rollback: true })
        ));
    }

    #[test]
    fn global_options_follow_the_subcommand() {
        let args =
            Args::try_parse_from(["therapy", "lookup", "cisplatin", "--db", "x.db", "--json"])
                .unwrap();
        assert_eq!(args.db, Some(PathBuf::from("x.db")));
        assert!(args.json);
        assert!(matches!(args.command, Command::Lookup { ref term } if term == "cisplatin"));
    }

    #[test]
    fn load_path_is_optional() {
        let args = Args::try_parse_from(["therapy", "load", "rxnorm"]).unwrap();
        assert!(matches!(args.command, Command::Load { path: None, .. }));
    }

    #[test]
    fn unknown_subcommand_is_rejected() {
        assert!(Args::try_parse_from(["therapy", "vacuum"]).is_err());
    }
}

//! `therapy check`: orphan rows per constraint plus SQLite's own checks.

use serde_json::json;
use therapy_core::config::TherapyConfig;
use therapy_core::errors::StorageError;
use therapy_storage::integrity::{foreign_key_check, integrity_check, orphan_report};
use therapy_storage::THERAPY_FOREIGN_KEYS;

use super::open_db_unmigrated;

pub fn run(config: &TherapyConfig, as_json: bool) -> anyhow::Result<()> {
    let db = open_db_unmigrated(config)?;
    let sample_limit = config.storage.effective_orphan_sample_limit();

    let (orphans, violations, healthy) = db.with_reader(|conn| {
        Ok::<_, StorageError>((
            orphan_report(conn, &THERAPY_FOREIGN_KEYS, sample_limit)?,
            foreign_key_check(conn)?,
            integrity_check(conn)?,
        ))
    })?;

    let orphan_total: u64 = orphans.iter().map(|r| r.orphan_count).sum();
    if as_json {
        let reports: Vec<_> = orphans
            .iter()
            .map(|r| {
                json!({
                    "constraint": r.constraint,
                    "table": r.table,
                    "orphan_count": r.orphan_count,
                    "sample": r.sample,
                })
            })
            .collect();
        println!(
            "{}",
            json!({
                "orphans": reports,
                "foreign_key_violations": violations.len(),
                "integrity_ok": healthy,
            })
        );
    } else {
        for r in &orphans {
            if r.orphan_count == 0 {
                println!("{:<42} ok", r.constraint);
            } else {
                println!(
                    "{:<42} {} orphan rows (e.g. {})",
                    r.constraint,
                    r.orphan_count,
                    r.sample.join(", ")
                );
            }
        }
        for v in &violations {
            println!(
                "foreign_key_check: {} row {} -> {}",
                v.table,
                v.rowid.map_or_else(|| "?".to_string(), |id| id.to_string()),
                v.parent_table
            );
        }
        println!("integrity_check: {}", if healthy { "ok" } else { "FAILED" });
    }

    if orphan_total > 0 || !violations.is_empty() || !healthy {
        anyhow::bail!(
            "{orphan_total} orphan rows, {} foreign key violations, integrity {}",
            violations.len(),
            if healthy { "ok" } else { "failed" }
        );
    }
    Ok(())
}

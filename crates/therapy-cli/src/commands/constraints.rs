//! `therapy constraints ...`

use serde_json::json;
use therapy_core::config::TherapyConfig;
use therapy_storage::constraints::{
    apply_constraints, constraint_status, drop_constraints, postgres_rollback_script,
    postgres_script, THERAPY_FOREIGN_KEYS,
};

use super::open_db_unmigrated;
use crate::ConstraintsCommand;

pub fn run(config: &TherapyConfig, cmd: &ConstraintsCommand, as_json: bool) -> anyhow::Result<()> {
    match cmd {
        ConstraintsCommand::Sql { rollback } => {
            let script = if *rollback {
                postgres_rollback_script(&THERAPY_FOREIGN_KEYS)
            } else {
                postgres_script(&THERAPY_FOREIGN_KEYS)
            };
            print!("{script}");
            Ok(())
        }
        ConstraintsCommand::Apply => {
            let db = open_db_unmigrated(config)?;
            let applied = db.with_writer(|conn| apply_constraints(conn, &THERAPY_FOREIGN_KEYS))?;
            report_count("applied", applied, as_json);
            Ok(())
        }
        ConstraintsCommand::Drop => {
            let db = open_db_unmigrated(config)?;
            let dropped = db.with_writer(|conn| drop_constraints(conn, &THERAPY_FOREIGN_KEYS))?;
            report_count("dropped", dropped, as_json);
            Ok(())
        }
        ConstraintsCommand::Status => {
            let db = open_db_unmigrated(config)?;
            let status = db.with_reader(|conn| constraint_status(conn, &THERAPY_FOREIGN_KEYS))?;
            if as_json {
                let rows: Vec<_> = status
                    .iter()
                    .map(|s| {
                        json!({
                            "name": s.name,
                            "table": s.table,
                            "present": s.present,
                            "enforced": s.enforced,
                        })
                    })
                    .collect();
                println!("{}", serde_json::Value::Array(rows));
            } else {
                for s in &status {
                    println!(
                        "{:<42} {:<8} {}",
                        s.name,
                        if s.present { "present" } else { "absent" },
                        if s.enforced { "enforced" } else { "-" }
                    );
                }
            }
            Ok(())
        }
    }
}

fn report_count(action: &str, count: usize, as_json: bool) {
    if as_json {
        println!("{}", json!({ "action": action, "count": count }));
    } else {
        println!("{action} {count} foreign keys");
    }
}

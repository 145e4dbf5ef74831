//! Migration and connection tests.

use rusqlite::Connection;
use therapy_core::config::StorageConfig;
use therapy_core::{SourceName, TherapyRecord};
use therapy_storage::connection::pragmas::{apply_pragmas, foreign_keys_enabled};
use therapy_storage::constraints::{constraint_status, THERAPY_FOREIGN_KEYS};
use therapy_storage::migrations::{current_version, run_migrations, v001_concept_tables, LATEST_VERSION};
use therapy_storage::queries::concepts::{concept_exists, count_concepts};
use therapy_storage::queries::load::load_records;
use therapy_storage::DatabaseManager;

#[test]
fn fresh_database_migrates_to_latest() {
    let conn = Connection::open_in_memory().unwrap();
    apply_pragmas(&conn, 5000).unwrap();
    assert_eq!(current_version(&conn).unwrap(), 0);
    assert_eq!(run_migrations(&conn).unwrap(), LATEST_VERSION);

    let status = constraint_status(&conn, &THERAPY_FOREIGN_KEYS).unwrap();
    assert!(status.iter().all(|s| s.present && s.enforced));
}

#[test]
fn migrations_are_idempotent() {
    let conn = Connection::open_in_memory().unwrap();
    apply_pragmas(&conn, 5000).unwrap();
    run_migrations(&conn).unwrap();
    assert_eq!(run_migrations(&conn).unwrap(), LATEST_VERSION);
}

#[test]
fn v2_fails_on_orphaned_rows_and_stays_at_v1() {
    let conn = Connection::open_in_memory().unwrap();
    apply_pragmas(&conn, 5000).unwrap();
    v001_concept_tables::migrate(&conn).unwrap();
    conn.pragma_update(None, "user_version", 1).unwrap();
    conn.execute_batch(
        "INSERT INTO therapy_aliases (alias, concept_id) VALUES ('x', 'missing')",
    )
    .unwrap();

    let err = run_migrations(&conn).unwrap_err();
    assert!(err.to_string().contains("version 2"), "{err}");
    assert_eq!(current_version(&conn).unwrap(), 1);
    let status = constraint_status(&conn, &THERAPY_FOREIGN_KEYS).unwrap();
    assert!(status.iter().all(|s| !s.present));
}

#[test]
fn file_database_persists_and_reads_through_pool() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("therapy.db");

    {
        let db = DatabaseManager::open(&path).unwrap();
        assert_eq!(db.path(), Some(path.as_path()));
        db.with_writer(|conn| {
            load_records(conn, &[TherapyRecord::new("rxcui:2555", SourceName::RxNorm)])
        })
        .unwrap();
        db.checkpoint().unwrap();

        let seen = db
            .with_reader(|conn| concept_exists(conn, "rxcui:2555"))
            .unwrap();
        assert!(seen);
        let fk_on = db.with_reader(foreign_keys_enabled).unwrap();
        assert!(fk_on);
    }

    let reopened = DatabaseManager::open(&path).unwrap();
    let count = reopened.with_reader(count_concepts).unwrap();
    assert_eq!(count, 1);
}

#[test]
fn open_with_config_respects_settings() {
    let dir = tempfile::tempdir().unwrap();
    let config = StorageConfig {
        db_path: Some(dir.path().join("custom.db").display().to_string()),
        read_pool_size: Some(2),
        busy_timeout_ms: Some(250),
        ..Default::default()
    };
    let db = DatabaseManager::open_with_config(&config).unwrap();
    let timeout: i64 = db
        .with_writer(|conn| {
            conn.pragma_query_value(None, "busy_timeout", |row| row.get(0))
                .map_err(therapy_core::errors::StorageError::from)
        })
        .unwrap();
    assert_eq!(timeout, 250);
    assert!(dir.path().join("custom.db").exists());
}

#[test]
fn readers_cannot_write() {
    let dir = tempfile::tempdir().unwrap();
    let db = DatabaseManager::open(&dir.path().join("ro.db")).unwrap();
    let result = db.with_reader(|conn| {
        conn.execute(
            "INSERT INTO therapy_concepts (concept_id, source) VALUES ('a', 'ChEMBL')",
            [],
        )
        .map_err(therapy_core::errors::StorageError::from)
    });
    assert!(result.is_err());
}

#[test]
fn in_memory_manager_enforces_foreign_keys() {
    let db = DatabaseManager::open_in_memory().unwrap();
    assert!(db.path().is_none());
    let result = db.with_writer(|conn| {
        therapy_storage::queries::children::insert_child(
            conn,
            therapy_storage::ChildTable::Aliases,
            "nobody",
            "x",
        )
    });
    assert!(result.unwrap_err().is_foreign_key_violation());
}

#[test]
fn unmigrated_open_allows_inspecting_a_blocked_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("blocked.db");
    {
        let conn = Connection::open(&path).unwrap();
        v001_concept_tables::migrate(&conn).unwrap();
        conn.pragma_update(None, "user_version", 1).unwrap();
        conn.execute_batch("INSERT INTO therapy_xrefs (xref, concept_id) VALUES ('x', 'gone')")
            .unwrap();
    }

    assert!(DatabaseManager::open(&path).is_err());

    let config = StorageConfig {
        db_path: Some(path.display().to_string()),
        ..Default::default()
    };
    let db = DatabaseManager::open_unmigrated(&config).unwrap();
    let version = db.with_reader(current_version).unwrap();
    assert_eq!(version, 1);
}

#[test]
fn v2_keeps_constraints_applied_by_hand() {
    let conn = Connection::open_in_memory().unwrap();
    apply_pragmas(&conn, 5000).unwrap();
    v001_concept_tables::migrate(&conn).unwrap();
    conn.pragma_update(None, "user_version", 1).unwrap();
    therapy_storage::constraints::add_constraint(&conn, &THERAPY_FOREIGN_KEYS[0]).unwrap();

    assert_eq!(run_migrations(&conn).unwrap(), LATEST_VERSION);
    let status = constraint_status(&conn, &THERAPY_FOREIGN_KEYS).unwrap();
    assert!(status.iter().all(|s| s.present));
}

//! Tests for error codes and SQLite error classification.

use std::collections::HashSet;

use rusqlite::Connection;
use therapy_core::errors::*;

#[test]
fn every_error_has_a_code() {
    let errors: Vec<Box<dyn Fn() -> String>> = vec![
        Box::new(|| StorageError::DbBusy.coded_string()),
        Box::new(|| {
            ConstraintError::AlreadyExists {
                name: "t_concept_id_fkey".into(),
                table: "t".into(),
            }
            .coded_string()
        }),
        Box::new(|| {
            ConfigError::FileNotFound {
                path: "/tmp/x".into(),
            }
            .coded_string()
        }),
        Box::new(|| EtlError::UnknownSource("nope".into()).coded_string()),
    ];
    for render in errors {
        let s = render();
        assert!(s.starts_with('['), "{s}");
    }
}

#[test]
fn constraint_codes_are_distinct() {
    let codes: HashSet<&str> = [
        ConstraintError::MissingTable { table: "t".into() }.error_code(),
        ConstraintError::MissingColumn {
            table: "t".into(),
            column: "c".into(),
        }
        .error_code(),
        ConstraintError::AlreadyExists {
            name: "n".into(),
            table: "t".into(),
        }
        .error_code(),
        ConstraintError::ReferentialViolation {
            name: "n".into(),
            table: "t".into(),
            column: "c".into(),
            orphan_count: 1,
            sample: vec!["99".into()],
        }
        .error_code(),
        ConstraintError::ParentKeyNotUnique {
            table: "t".into(),
            column: "c".into(),
        }
        .error_code(),
    ]
    .into_iter()
    .collect();
    assert_eq!(codes.len(), 5);
}

#[test]
fn sqlite_foreign_key_failure_is_classified() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "PRAGMA foreign_keys = ON;
         CREATE TABLE parent (id TEXT PRIMARY KEY);
         CREATE TABLE child (id TEXT REFERENCES parent (id));",
    )
    .unwrap();
    let err = conn
        .execute("INSERT INTO child (id) VALUES ('missing')", [])
        .unwrap_err();
    let storage = StorageError::from(err);
    assert!(storage.is_foreign_key_violation(), "{storage:?}");
    assert_eq!(storage.error_code(), "FOREIGN_KEY_VIOLATION");
}

#[test]
fn other_sqlite_failures_stay_generic() {
    let conn = Connection::open_in_memory().unwrap();
    let err = conn.execute("SELECT * FROM nowhere", []).unwrap_err();
    assert!(matches!(
        StorageError::from(err),
        StorageError::SqliteError { .. }
    ));
}

#[test]
fn storage_error_wraps_into_constraint_and_etl() {
    let c: ConstraintError = StorageError::DbBusy.into();
    assert_eq!(c.error_code(), "DB_BUSY");
    let e: EtlError = StorageError::DbBusy.into();
    assert_eq!(e.error_code(), "DB_BUSY");
}

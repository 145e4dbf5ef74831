//! Tests for layered configuration.

use std::sync::Mutex;

use therapy_core::config::{CliOverrides, TherapyConfig};
use therapy_core::errors::ConfigError;

/// Serializes tests that modify environment variables.
static ENV_MUTEX: Mutex<()> = Mutex::new(());

fn clear_env() {
    for key in [
        "THERAPY_DB_PATH",
        "THERAPY_DATA_DIR",
        "THERAPY_BUSY_TIMEOUT_MS",
        "THERAPY_MAX_LIST_LEN",
    ] {
        std::env::remove_var(key);
    }
}

/// Point HOME at an empty directory so no real user config leaks in.
fn isolated_home() -> tempfile::TempDir {
    let home = tempfile::TempDir::new().unwrap();
    std::env::set_var("HOME", home.path());
    home
}

#[test]
fn defaults_when_no_files() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let _home = isolated_home();
    let dir = tempfile::TempDir::new().unwrap();

    let config = TherapyConfig::load(dir.path(), None).unwrap();
    assert_eq!(config.storage.effective_db_path().to_str(), Some("therapy.db"));
    assert_eq!(config.storage.effective_read_pool_size(), 4);
    assert_eq!(config.storage.effective_busy_timeout_ms(), 5000);
    assert_eq!(config.etl.effective_max_list_len(), 20);
}

#[test]
fn cli_beats_env_beats_project_beats_user() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let home = isolated_home();
    std::fs::create_dir_all(home.path().join(".therapy")).unwrap();
    std::fs::write(
        home.path().join(".therapy").join("config.toml"),
        "[storage]\nbusy_timeout_ms = 100\nread_pool_size = 2\n",
    )
    .unwrap();

    let dir = tempfile::TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("therapy.toml"),
        "[storage]\nbusy_timeout_ms = 200\ndb_path = \"project.db\"\n\n[etl]\nmax_list_len = 10\n",
    )
    .unwrap();
    std::env::set_var("THERAPY_MAX_LIST_LEN", "15");
    std::env::set_var("THERAPY_DB_PATH", "env.db");

    let cli = CliOverrides {
        db_path: Some("cli.db".into()),
        ..Default::default()
    };
    let config = TherapyConfig::load(dir.path(), Some(&cli)).unwrap();

    assert_eq!(config.storage.db_path.as_deref(), Some("cli.db"));
    assert_eq!(config.etl.max_list_len, Some(15));
    assert_eq!(config.storage.busy_timeout_ms, Some(200));
    assert_eq!(config.storage.read_pool_size, Some(2));

    clear_env();
}

#[test]
fn invalid_toml_is_parse_error() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let _home = isolated_home();
    let dir = tempfile::TempDir::new().unwrap();
    std::fs::write(dir.path().join("therapy.toml"), "not = [valid").unwrap();

    match TherapyConfig::load(dir.path(), None) {
        Err(ConfigError::ParseError { .. }) => {}
        other => panic!("expected ParseError, got {other:?}"),
    }
}

#[test]
fn out_of_range_values_fail_validation() {
    let config = TherapyConfig::from_toml("[storage]\nread_pool_size = 0\n").unwrap();
    assert!(matches!(
        TherapyConfig::validate(&config),
        Err(ConfigError::ValidationFailed { ref field, .. }) if field == "storage.read_pool_size"
    ));

    let config = TherapyConfig::from_toml("[etl]\nmax_list_len = 0\n").unwrap();
    assert!(TherapyConfig::validate(&config).is_err());
}

#[test]
fn unknown_keys_are_ignored() {
    let config = TherapyConfig::from_toml("[storage]\nfuture_knob = true\n").unwrap();
    assert!(config.storage.db_path.is_none());
}

#[test]
fn toml_roundtrip_keeps_values() {
    let config = TherapyConfig::from_toml("[etl]\ndata_dir = \"/srv/therapy\"\n").unwrap();
    let text = config.to_toml().unwrap();
    let back = TherapyConfig::from_toml(&text).unwrap();
    assert_eq!(back.etl.data_dir.as_deref(), Some("/srv/therapy"));
}

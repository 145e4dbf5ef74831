//! Top-level configuration with layered resolution.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{EtlConfig, StorageConfig};
use crate::errors::ConfigError;

/// Top-level configuration aggregating all sub-configs.
///
/// Resolution order (highest priority first):
/// 1. CLI flags (applied via `apply_cli_overrides`)
/// 2. Environment variables (`THERAPY_*`)
/// 3. Project config (`therapy.toml` in the project root)
/// 4. User config (`~/.therapy/config.toml`)
/// 5. Compiled defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TherapyConfig {
    pub storage: StorageConfig,
    pub etl: EtlConfig,
}

/// CLI override arguments that can be applied to a config.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub db_path: Option<String>,
    pub data_dir: Option<String>,
}

impl TherapyConfig {
    /// Load configuration for the project rooted at `root`.
    pub fn load(root: &Path, cli_overrides: Option<&CliOverrides>) -> Result<Self, ConfigError> {
        Self::load_from(&root.join("therapy.toml"), cli_overrides)
    }

    /// Load configuration using an explicit project config file.
    /// A missing project file is not an error.
    pub fn load_from(
        project_config_path: &Path,
        cli_overrides: Option<&CliOverrides>,
    ) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(user_config_path) = Self::user_config_path() {
            if user_config_path.exists() {
                match Self::merge_toml_file(&mut config, &user_config_path) {
                    Ok(()) => {}
                    Err(e @ ConfigError::ParseError { .. }) => return Err(e),
                    Err(e) => {
                        tracing::warn!(error = %e, "ignoring unreadable user config");
                    }
                }
            }
        }

        if project_config_path.exists() {
            Self::merge_toml_file(&mut config, project_config_path)?;
        }

        Self::apply_env_overrides(&mut config);

        if let Some(cli) = cli_overrides {
            Self::apply_cli_overrides(&mut config, cli);
        }

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a TOML string (for testing).
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })
    }

    pub fn validate(config: &TherapyConfig) -> Result<(), ConfigError> {
        if let Some(size) = config.storage.read_pool_size {
            if !(1..=8).contains(&size) {
                return Err(ConfigError::ValidationFailed {
                    field: "storage.read_pool_size".to_string(),
                    message: "must be between 1 and 8".to_string(),
                });
            }
        }
        if let Some(max) = config.etl.max_list_len {
            if max == 0 {
                return Err(ConfigError::ValidationFailed {
                    field: "etl.max_list_len".to_string(),
                    message: "must be greater than 0".to_string(),
                });
            }
        }
        if let Some(ref path) = config.storage.db_path {
            if path.trim().is_empty() {
                return Err(ConfigError::ValidationFailed {
                    field: "storage.db_path".to_string(),
                    message: "must not be empty".to_string(),
                });
            }
        }
        Ok(())
    }

    fn user_config_path() -> Option<PathBuf> {
        std::env::var_os("HOME")
            .or_else(|| std::env::var_os("USERPROFILE"))
            .map(|home| PathBuf::from(home).join(".therapy").join("config.toml"))
    }

    /// Merge a TOML file into the existing config.
    /// Unknown keys are ignored.
    fn merge_toml_file(config: &mut TherapyConfig, path: &Path) -> Result<(), ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;
        let file_config: TherapyConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        Self::merge(config, &file_config);
        Ok(())
    }

    /// Values set in `other` win over `base`.
    fn merge(base: &mut TherapyConfig, other: &TherapyConfig) {
        if other.storage.db_path.is_some() {
            base.storage.db_path = other.storage.db_path.clone();
        }
        if other.storage.read_pool_size.is_some() {
            base.storage.read_pool_size = other.storage.read_pool_size;
        }
        if other.storage.busy_timeout_ms.is_some() {
            base.storage.busy_timeout_ms = other.storage.busy_timeout_ms;
        }
        if other.storage.orphan_sample_limit.is_some() {
            base.storage.orphan_sample_limit = other.storage.orphan_sample_limit;
        }
        if other.etl.data_dir.is_some() {
            base.etl.data_dir = other.etl.data_dir.clone();
        }
        if other.etl.max_list_len.is_some() {
            base.etl.max_list_len = other.etl.max_list_len;
        }
    }

    fn apply_env_overrides(config: &mut TherapyConfig) {
        if let Ok(val) = std::env::var("THERAPY_DB_PATH") {
            config.storage.db_path = Some(val);
        }
        if let Ok(val) = std::env::var("THERAPY_DATA_DIR") {
            config.etl.data_dir = Some(val);
        }
        if let Ok(val) = std::env::var("THERAPY_BUSY_TIMEOUT_MS") {
            if let Ok(v) = val.parse::<u64>() {
                config.storage.busy_timeout_ms = Some(v);
            }
        }
        if let Ok(val) = std::env::var("THERAPY_MAX_LIST_LEN") {
            if let Ok(v) = val.parse::<usize>() {
                config.etl.max_list_len = Some(v);
            }
        }
    }

    fn apply_cli_overrides(config: &mut TherapyConfig, cli: &CliOverrides) {
        if let Some(ref v) = cli.db_path {
            config.storage.db_path = Some(v.clone());
        }
        if let Some(ref v) = cli.data_dir {
            config.etl.data_dir = Some(v.clone());
        }
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError {
            path: "<serialization>".to_string(),
            message: e.to_string(),
        })
    }
}

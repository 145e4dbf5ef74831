//! Source loading configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EtlConfig {
    /// Directory holding per-source release files. Default: `data`.
    pub data_dir: Option<String>,
    /// Alias and trade-name lists longer than this are dropped. Default: 20.
    pub max_list_len: Option<usize>,
}

impl EtlConfig {
    pub fn effective_data_dir(&self) -> PathBuf {
        PathBuf::from(self.data_dir.as_deref().unwrap_or("data"))
    }

    pub fn effective_max_list_len(&self) -> usize {
        self.max_list_len.unwrap_or(20)
    }
}

//! Storage configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StorageConfig {
    /// Database file. Default: `therapy.db` in the working directory.
    pub db_path: Option<String>,
    /// Read connections in the pool. Default: 4.
    pub read_pool_size: Option<usize>,
    /// How long a writer waits on a locked database. Default: 5000 ms.
    pub busy_timeout_ms: Option<u64>,
    /// Orphan values listed per constraint in integrity reports. Default: 5.
    pub orphan_sample_limit: Option<usize>,
}

impl StorageConfig {
    pub fn effective_db_path(&self) -> PathBuf {
        PathBuf::from(self.db_path.as_deref().unwrap_or("therapy.db"))
    }

    pub fn effective_read_pool_size(&self) -> usize {
        self.read_pool_size.unwrap_or(4)
    }

    pub fn effective_busy_timeout_ms(&self) -> u64 {
        self.busy_timeout_ms.unwrap_or(5000)
    }

    pub fn effective_orphan_sample_limit(&self) -> usize {
        self.orphan_sample_limit.unwrap_or(5)
    }
}

//! Configuration for the therapy store.
//! TOML-based, layered: CLI > env > project > user > defaults.

pub mod etl_config;
pub mod storage_config;
pub mod therapy_config;

pub use etl_config::EtlConfig;
pub use storage_config::StorageConfig;
pub use therapy_config::{CliOverrides, TherapyConfig};

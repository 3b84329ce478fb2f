//! Optional TOML file configuration.
//!
//! Every value here can also be given on the command line; explicit CLI
//! arguments win over the file, the file wins over built-in defaults.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    pub port: Option<u16>,
    pub logging_level: Option<String>,
    pub frontend_dir_path: Option<String>,

    pub storage: Option<StorageConfig>,
}

/// Image storage connection settings. The url and api key may instead come
/// from the SB_URL / SB_KEY environment variables.
#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct StorageConfig {
    pub url: Option<String>,
    pub api_key: Option<String>,
    pub bucket: Option<String>,
    pub timeout_sec: Option<u64>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}

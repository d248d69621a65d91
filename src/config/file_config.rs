use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// Settings read from the optional `--config` TOML file. Every field
/// present here wins over its CLI counterpart.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    pub db_dir: Option<String>,
    pub port: Option<u16>,
    pub logging_level: Option<String>,
    pub frontend_dir_path: Option<String>,
    pub share_base_url: Option<String>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}

mod file_config;

pub use file_config::FileConfig;

use crate::server::RequestsLoggingLevel;
use anyhow::{bail, Result};
use clap::ValueEnum;
use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 3001;
pub const DEFAULT_SHARE_BASE_URL: &str = "undervaluedmusic.com";

/// CLI arguments that can be overridden by the TOML config.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub db_dir: Option<PathBuf>,
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub frontend_dir_path: Option<String>,
    pub share_base_url: String,
}

impl Default for CliConfig {
    fn default() -> Self {
        CliConfig {
            db_dir: None,
            port: DEFAULT_PORT,
            logging_level: RequestsLoggingLevel::default(),
            frontend_dir_path: None,
            share_base_url: DEFAULT_SHARE_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_dir: PathBuf,
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub frontend_dir_path: Option<String>,
    pub share_base_url: String,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let db_dir = file
            .db_dir
            .map(PathBuf::from)
            .or_else(|| cli.db_dir.clone())
            .ok_or_else(|| {
                anyhow::anyhow!("db_dir must be specified via --db-dir or in config file")
            })?;

        if !db_dir.exists() {
            bail!("Database directory does not exist: {:?}", db_dir);
        }
        if !db_dir.is_dir() {
            bail!("db_dir is not a directory: {:?}", db_dir);
        }

        let logging_level = match file.logging_level {
            Some(s) => match parse_logging_level(&s) {
                Some(level) => level,
                None => bail!("Invalid logging_level in config file: {}", s),
            },
            None => cli.logging_level.clone(),
        };

        Ok(Self {
            db_dir,
            port: file.port.unwrap_or(cli.port),
            logging_level,
            frontend_dir_path: file
                .frontend_dir_path
                .or_else(|| cli.frontend_dir_path.clone()),
            share_base_url: file
                .share_base_url
                .unwrap_or_else(|| cli.share_base_url.clone()),
        })
    }

    pub fn music_db_path(&self) -> PathBuf {
        self.db_dir.join("music.db")
    }
}

fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}

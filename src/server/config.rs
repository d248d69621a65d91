use super::RequestsLoggingLevel;
use crate::config::{AppConfig, DEFAULT_PORT, DEFAULT_SHARE_BASE_URL};

#[derive(Clone)]
pub struct ServerConfig {
    pub requests_logging_level: RequestsLoggingLevel,
    pub port: u16,
    pub frontend_dir_path: Option<String>,
    /// Host and optional path prefix used in share links, without scheme.
    pub share_base_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            requests_logging_level: RequestsLoggingLevel::Path,
            port: DEFAULT_PORT,
            frontend_dir_path: None,
            share_base_url: DEFAULT_SHARE_BASE_URL.to_string(),
        }
    }
}

impl From<&AppConfig> for ServerConfig {
    fn from(config: &AppConfig) -> Self {
        ServerConfig {
            requests_logging_level: config.logging_level.clone(),
            port: config.port,
            frontend_dir_path: config.frontend_dir_path.clone(),
            share_base_url: config.share_base_url.clone(),
        }
    }
}

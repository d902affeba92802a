//! Application configuration.
//!
//! Precedence, lowest first: built-in defaults, the TOML file, the
//! environment, command-line flags (applied by `main`).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use wattrent_core::DEFAULT_USER_ID;
use wattrent_core::db::BackendConfig;

/// Overrides `api_base_url`.
pub const API_URL_ENV: &str = "WATTRENT_API_URL";

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080/api/v1";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// `http` or `memory`.
    pub backend: String,
    pub api_base_url: String,
    pub user_id: String,
    /// SQLite file for the local cache; in-memory when unset.
    pub local_db: Option<PathBuf>,
    pub log_level: Option<String>,
    pub log_file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend: "http".to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            user_id: DEFAULT_USER_ID.to_string(),
            local_db: None,
            log_level: None,
            log_file: None,
        }
    }
}

impl AppConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    /// Reads `path` if given, otherwise starts from defaults. The
    /// environment is applied on top either way.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })?;
                let config = Self::from_toml_str(&raw).map_err(|source| ConfigError::Parse {
                    path: path.to_path_buf(),
                    source,
                })?;
                debug!(path = %path.display(), "config file loaded");
                config
            }
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn apply_env(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) {
        if let Some(url) = lookup(API_URL_ENV).filter(|url| !url.trim().is_empty()) {
            debug!(url = %url, "API base URL taken from environment");
            self.api_base_url = url.trim().to_string();
        }
    }

    pub fn backend_config(&self) -> BackendConfig {
        BackendConfig {
            backend: self.backend.clone(),
            connection: self.api_base_url.clone(),
        }
    }
}

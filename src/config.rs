//! Application configuration: optional YAML file plus environment overrides.

use std::fs::File;
use std::io::BufReader;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::Level;

use crate::data::DEFAULT_STORE_PATH;

pub const DEFAULT_CONFIG_PATH: &str = "weighin.yaml";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

pub const CONFIG_ENV: &str = "WEIGHIN_CONFIG";
pub const BIND_ENV: &str = "WEIGHIN_BIND";
pub const STORE_ENV: &str = "WEIGHIN_STORE";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {path}: {source}")]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        #[source]
        source: serde_yaml::Error,
        path: PathBuf,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Threads for batch recalculation; 0 uses every core.
    #[serde(default)]
    pub workers: usize,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct StoreConfig {
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl LoggingConfig {
    pub fn level(&self) -> Option<Level> {
        self.level.trim().parse().ok()
    }
}

fn default_bind_addr() -> String {
    DEFAULT_BIND_ADDR.to_string()
}

fn default_store_path() -> PathBuf {
    PathBuf::from(DEFAULT_STORE_PATH)
}

fn default_log_level() -> String {
    "info".to_string()
}

impl AppConfig {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| ConfigError::Read {
            source,
            path: path.to_path_buf(),
        })?;
        let config: AppConfig =
            serde_yaml::from_reader(BufReader::new(file)).map_err(|source| ConfigError::Parse {
                source,
                path: path.to_path_buf(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// `$WEIGHIN_CONFIG` if set (must exist), else `weighin.yaml` when present, else
    /// defaults. `WEIGHIN_BIND` and `WEIGHIN_STORE` override the result.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_path(PathBuf::from(path))?,
            None if Path::new(DEFAULT_CONFIG_PATH).is_file() => {
                Self::from_path(DEFAULT_CONFIG_PATH)?
            }
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(bind_addr) = lookup(BIND_ENV).filter(|v| !v.trim().is_empty()) {
            self.server.bind_addr = bind_addr.trim().to_string();
        }
        if let Some(store) = lookup(STORE_ENV).filter(|v| !v.trim().is_empty()) {
            self.store.path = PathBuf::from(store.trim());
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.bind_addr.parse::<SocketAddr>().is_err() {
            return Err(ConfigError::Invalid(format!(
                "server.bind_addr '{}' is not a socket address",
                self.server.bind_addr
            )));
        }
        if self.store.path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("store.path must not be empty".to_string()));
        }
        if self.logging.level().is_none() {
            return Err(ConfigError::Invalid(format!(
                "logging.level '{}' is not one of trace, debug, info, warn, error",
                self.logging.level
            )));
        }
        Ok(())
    }
}

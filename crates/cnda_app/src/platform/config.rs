//! Application configuration, read from a RON file.
//!
//! Lookup order: the path in `CNDA_CONFIG`, then `./cnda.ron`. A missing
//! default file yields the built-in defaults; a missing explicit file is an
//! error. `CNDA_BASE_URL` overrides `base_url` after the file is read.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use cnda_engine::{ClientSettings, EngineSettings};
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const CONFIG_ENV: &str = "CNDA_CONFIG";
pub const BASE_URL_ENV: &str = "CNDA_BASE_URL";
const DEFAULT_CONFIG_FILE: &str = "./cnda.ron";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot parse config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: ron::error::SpannedError,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Destination for log output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LogDestination {
    #[default]
    File,
    Terminal,
    Both,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_url: String,
    pub poll_interval_secs: u64,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    /// Stop the status poller once every subject is terminal.
    pub stop_polling_on_completion: bool,
    pub log_destination: LogDestination,
    pub log_level: String,
    pub log_file: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/".to_string(),
            poll_interval_secs: 10,
            connect_timeout_secs: 10,
            request_timeout_secs: 30,
            stop_polling_on_completion: false,
            log_destination: LogDestination::File,
            log_level: "info".to_string(),
            log_file: PathBuf::from("./cnda.log"),
        }
    }
}

impl AppConfig {
    /// Loads the config using the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        let explicit = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
        let base_url = std::env::var(BASE_URL_ENV).ok();
        Self::load_from(explicit.as_deref(), base_url)
    }

    pub fn load_from(
        explicit: Option<&Path>,
        base_url_override: Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config = match explicit {
            Some(path) => Self::read_file(path)?,
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    Self::read_file(path)?
                } else {
                    Self::default()
                }
            }
        };

        if let Some(base_url) = base_url_override.filter(|url| !url.trim().is_empty()) {
            config.base_url = base_url;
        }
        config.validate()?;
        Ok(config)
    }

    fn read_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        ron::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("base_url is empty".into()));
        }
        if self.poll_interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "poll_interval_secs must be at least 1".into(),
            ));
        }
        if self.request_timeout_secs == 0 || self.connect_timeout_secs == 0 {
            return Err(ConfigError::Invalid("timeouts must be at least 1s".into()));
        }
        self.level_filter()?;
        Ok(())
    }

    pub fn level_filter(&self) -> Result<LevelFilter, ConfigError> {
        self.log_level
            .parse()
            .map_err(|_| ConfigError::Invalid(format!("unknown log_level {:?}", self.log_level)))
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            client: ClientSettings {
                base_url: self.base_url.clone(),
                connect_timeout: Duration::from_secs(self.connect_timeout_secs),
                request_timeout: Duration::from_secs(self.request_timeout_secs),
            },
            poll_interval: Duration::from_secs(self.poll_interval_secs),
        }
    }
}

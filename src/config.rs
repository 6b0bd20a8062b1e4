//! On-disk settings for the padstate binary.
//!
//! Every key is optional; a missing file or key falls back to the defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info, Level};

use crate::controller::PollerSettings;

const CONFIG_DIR: &str = "padstate";
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config value: {0}")]
    Invalid(String),
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Driver station port of the controller to sample
    pub port: u32,
    /// Length of one control cycle
    pub cycle_interval_ms: u64,
    /// One of trace, debug, info, warn, error
    pub log_level: String,
    /// Stop polling once nothing reads the snapshots any more
    pub fail_without_receivers: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 0,
            cycle_interval_ms: 20,
            log_level: "info".to_string(),
            fail_without_receivers: false,
        }
    }
}

impl Config {
    /// `<config dir>/padstate/config.toml`, if the platform has a config dir
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut path| {
            path.push(CONFIG_DIR);
            path.push(CONFIG_FILE);
            path
        })
    }

    /// Loads `path`, or the defaults when it does not exist
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            info!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Loaded config from {}", path.display());
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.cycle_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "cycle_interval_ms must be greater than 0".to_string(),
            ));
        }
        self.level()?;
        Ok(())
    }

    pub fn level(&self) -> Result<Level, ConfigError> {
        Level::from_str(&self.log_level)
            .map_err(|_| ConfigError::Invalid(format!("unknown log level '{}'", self.log_level)))
    }

    pub fn poller_settings(&self) -> PollerSettings {
        PollerSettings {
            port: self.port,
            cycle_interval_ms: self.cycle_interval_ms,
            fail_without_receivers: self.fail_without_receivers,
        }
    }
}

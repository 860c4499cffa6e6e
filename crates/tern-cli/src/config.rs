//! Loading `tern.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tern_engine::EngineConfig;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse the configuration file as valid TOML.
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Everything `tern.toml` may contain.
///
/// ```toml
/// [engine.search]
/// tt_bits = 22
///
/// [engine.eval]
/// mobility = true
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct TernConfig {
    #[serde(default)]
    pub engine: EngineConfig,
}

impl TernConfig {
    /// Loads [`Self::config_path()`] if it exists, otherwise the defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads an explicitly named file. A missing file is an error here.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    pub fn config_path() -> PathBuf {
        PathBuf::from("tern.toml")
    }
}

//! Configuration loading
//!
//! A `stacksift.json` at the project root carries two switches: whether
//! stack-trace processing runs at all (a cost control, not a correctness
//! feature) and whether rendered output is also logged to file. A missing
//! file means defaults; [`Config::init`] additionally writes the default
//! file out, mirroring first-run behavior.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Base name of the config file (`<root>/stacksift.json`)
pub const CONFIG_NAME: &str = "stacksift";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid config file: {0}")]
    ParseError(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StackTraceConfig {
    pub enabled: bool,
}

impl Default for StackTraceConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub enabled: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub stacktrace: StackTraceConfig,
    pub log: LogConfig,
}

impl Config {
    fn path_in(root: &Path) -> std::path::PathBuf {
        root.join(format!("{CONFIG_NAME}.json"))
    }

    /// Read the config file under `root`; a missing file yields defaults
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        let path = Self::path_in(root);
        if !path.is_file() {
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Like [`Config::load`], but writes the default file when none exists
    pub fn init(root: &Path) -> Result<Self, ConfigError> {
        let path = Self::path_in(root);
        if path.is_file() {
            return Self::load(root);
        }
        let config = Self::default();
        fs::write(&path, serde_json::to_string_pretty(&config)?)?;
        Ok(config)
    }

    /// Defaults, with a warning when an existing file failed to parse
    pub fn load_or_default(root: &Path) -> Self {
        Config::load(root).unwrap_or_else(|err| {
            tracing::warn!(error = %err, "failed to load config, using defaults");
            Self::default()
        })
    }
}

//! Configuration for the `fincast` CLI.
//!
//! Settings live in `.fincast.yml`, discovered by walking up from the
//! current directory or given explicitly with `--config`. All fields use
//! `serde` defaults so a partially-specified file deserializes correctly.

use std::env;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Config file name searched for during discovery.
pub const CONFIG_FILE: &str = ".fincast.yml";

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// The configuration file contained invalid YAML.
    #[error("failed to parse config file: {0}")]
    ParseError(#[from] serde_yaml::Error),
}

/// A specialized `Result` type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// The fincast configuration, corresponding to `.fincast.yml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FincastConfig {
    /// Cap on generated scenarios per evaluation.
    #[serde(default = "default_max_scenarios", rename = "max-scenarios")]
    pub max_scenarios: usize,

    /// Decimal places used for table output.
    #[serde(default = "default_precision")]
    pub precision: u8,
}

impl Default for FincastConfig {
    fn default() -> Self {
        Self {
            max_scenarios: default_max_scenarios(),
            precision: default_precision(),
        }
    }
}

fn default_max_scenarios() -> usize {
    1000
}

fn default_precision() -> u8 {
    2
}

/// Load configuration from an explicit path, or discover `.fincast.yml` by
/// walking up from the current directory.
///
/// No discoverable file yields the default config. An explicit path that
/// cannot be read is an error.
pub fn load_config(explicit: Option<&Path>) -> Result<FincastConfig> {
    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => match find_config_file() {
            Some(p) => p,
            None => return Ok(FincastConfig::default()),
        },
    };

    let content = std::fs::read_to_string(&path)?;

    // An empty file is valid and yields default config.
    if content.trim().is_empty() {
        return Ok(FincastConfig::default());
    }

    let config: FincastConfig = serde_yaml::from_str(&content)?;
    Ok(config)
}

/// Discover `.fincast.yml` by walking up from the current directory.
///
/// Returns `None` if no config file is found.
pub fn find_config_file() -> Option<PathBuf> {
    let mut dir = env::current_dir().ok()?;
    loop {
        let candidate = dir.join(CONFIG_FILE);
        if candidate.is_file() {
            return Some(candidate);
        }
        if !dir.pop() {
            break;
        }
    }
    None
}

//! CLI configuration file
//!
//! Read from `~/.config/meshctl/cli.toml`. Every field is optional in the
//! file; command-line flags take precedence over what is stored here.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Mesh control plane API address
    pub default_server: String,
    pub default_output: String,
    pub kubeconfig: Option<PathBuf>,
    pub context: Option<String>,
    /// Directory for rotated log files; no file logging when unset
    pub log_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_server: "127.0.0.1:2381".to_string(),
            default_output: "table".to_string(),
            kubeconfig: None,
            context: None,
            log_dir: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load from `path`, falling back to defaults when it does not exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("parse config file {}", path.display()))?;

        Ok(config)
    }

    fn config_path() -> Result<PathBuf> {
        let home = std::env::var("HOME").context("HOME is not set")?;
        Ok(PathBuf::from(home).join(".config/meshctl/cli.toml"))
    }
}

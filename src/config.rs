//! Configuration management for Memgate
//!
//! Loads settings from TOML file at ~/.memgate/config.toml, with environment
//! variable overrides for the credential and default user id.

use crate::error::{MemgateError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// User id applied when neither the caller nor the config supplies one.
pub const DEFAULT_USER_ID: &str = "default_user";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Mem0 API connection settings
    #[serde(default)]
    pub mem0: Mem0Config,

    /// Logging configuration
    #[serde(default)]
    pub log: LogConfig,
}

/// Mem0 API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mem0Config {
    /// API key for the hosted Mem0 service.
    /// Overridden by the MEM0_API_KEY environment variable; required at
    /// client construction after both sources are merged.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Base URL of the Mem0 API (default: https://api.mem0.ai)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Default user id applied when a tool call carries no userId.
    /// Overridden by the MEM0_DEFAULT_USER_ID environment variable.
    #[serde(default)]
    pub default_user_id: Option<String>,
}

fn default_base_url() -> String {
    "https://api.mem0.ai".to_string()
}

impl Default for Mem0Config {
    fn default() -> Self {
        Mem0Config {
            api_key: None,
            base_url: default_base_url(),
            default_user_id: None,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogConfig {
    /// Optional log file for a secondary structured sink.
    /// Diagnostics always go to stderr; this sink is best-effort and any
    /// failure to open it is ignored.
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let mut config: Config = toml::from_str(&content)?;
        config.apply_env();
        Ok(config)
    }

    /// Defaults merged with environment overrides, for when no file exists
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env();
        config
    }

    /// Apply environment variable overrides on top of file values
    fn apply_env(&mut self) {
        if let Ok(key) = std::env::var("MEM0_API_KEY") {
            if !key.is_empty() {
                self.mem0.api_key = Some(key);
            }
        }
        if let Ok(user) = std::env::var("MEM0_DEFAULT_USER_ID") {
            if !user.is_empty() {
                self.mem0.default_user_id = Some(user);
            }
        }
    }

    /// Write a commented default config file, creating parent directories
    pub fn create_default(path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = r#"# Memgate configuration

[mem0]
# API key for the hosted Mem0 service. The MEM0_API_KEY environment
# variable takes precedence over this value.
# api_key = "m0-..."

# base_url = "https://api.mem0.ai"

# User id applied when a tool call carries no userId.
# default_user_id = "alice"

[log]
# Optional secondary log file. Diagnostics always go to stderr.
# file = "~/.memgate/memgate.log"
"#;

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate settings that must hold before the server starts
    pub fn validate(&self) -> Result<()> {
        if self.mem0.base_url.is_empty() {
            return Err(MemgateError::Config("mem0.base_url is empty".to_string()));
        }
        Ok(())
    }
}

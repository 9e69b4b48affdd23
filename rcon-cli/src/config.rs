//! CLI configuration.
//!
//! Configuration is loaded in the following order (later overrides earlier):
//! 1. Default values
//! 2. YAML config file (if specified via RCON_CONFIG or --config)
//! 3. Environment variables
//! 4. Command-line flags (applied by the caller)

use rcon_client::{ConnectionConfig, RconAddr};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default server address.
pub const DEFAULT_ADDRESS: &str = "rcon://127.0.0.1:25575";

/// CLI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server address (`rcon://host:port`, `host:port` or `host`).
    pub address: String,
    /// RCON password.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Connection timeout in seconds.
    pub connect_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS.to_string(),
            password: None,
            connect_timeout_secs: 10,
        }
    }
}

impl Config {
    /// Loads configuration from an optional file, then applies environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Loads configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(path.to_path_buf(), e))?;
        let config: Config = serde_yaml::from_str(&content)
            .map_err(|e| ConfigError::ParseError(path.to_path_buf(), e.to_string()))?;
        Ok(config)
    }

    /// Applies `RCON_*` overrides read through `var`.
    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(address) = var("RCON_ADDRESS") {
            self.address = address;
        }

        if let Some(password) = var("RCON_PASSWORD") {
            self.password = Some(password);
        }

        if let Some(timeout) = var("RCON_CONNECT_TIMEOUT") {
            if let Ok(secs) = timeout.parse() {
                self.connect_timeout_secs = secs;
            }
        }
    }

    /// Returns connect timeout as Duration.
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Validates the configuration and builds the client's connection config.
    pub fn connection_config(&self) -> Result<ConnectionConfig, ConfigError> {
        let addr: RconAddr = self
            .address
            .parse()
            .map_err(|e| ConfigError::ValidationError(format!("{}", e)))?;

        let password = self.password.clone().ok_or_else(|| {
            ConfigError::ValidationError(
                "no password configured (use --password, RCON_PASSWORD or the config file)"
                    .to_string(),
            )
        })?;

        Ok(ConnectionConfig::new(addr, password).with_connect_timeout(self.connect_timeout()))
    }
}

/// Configuration error.
#[derive(Debug)]
pub enum ConfigError {
    IoError(PathBuf, std::io::Error),
    ParseError(PathBuf, String),
    ValidationError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(path, e) => {
                write!(f, "failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::ParseError(path, e) => {
                write!(f, "failed to parse config file '{}': {}", path.display(), e)
            }
            ConfigError::ValidationError(msg) => {
                write!(f, "configuration validation failed: {}", msg)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use thiserror::Error;

use crate::store::id::{DEFAULT_ID_START, IdStrategy};

/// Environment variable holding the admin portal password
pub const ADMIN_PASSWORD_ENV: &str = "ADMIN_PASSWORD";

/// Startup configuration errors, all reported before the listener binds
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to read config file '{path}': {source}")]
  Read {
    path: String,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to parse config file '{path}': {source}")]
  Parse {
    path: String,
    #[source]
    source: toml::de::Error,
  },

  #[error("required env var ADMIN_PASSWORD not set")]
  MissingAdminPassword,

  #[error("invalid server address '{addr}'")]
  InvalidAddr { addr: String },
}

/// Log configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LogConfig {
  /// Log file path, if not set, logs will be printed to stdout
  pub file: Option<String>,
  /// Log level, default is "info"
  #[serde(default = "default_log_level")]
  pub level: String,
}

fn default_log_level() -> String {
  "info".to_string()
}

impl Default for LogConfig {
  fn default() -> Self {
    Self {
      file: None,
      level: default_log_level(),
    }
  }
}

/// Identifier generation
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct IdConfig {
  #[serde(default)]
  pub strategy: IdStrategy,
  /// First id of the counter strategy
  #[serde(default = "default_id_start")]
  pub start: u64,
}

fn default_id_start() -> u64 {
  DEFAULT_ID_START
}

impl Default for IdConfig {
  fn default() -> Self {
    Self {
      strategy: IdStrategy::default(),
      start: default_id_start(),
    }
  }
}

/// Service configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
  /// HTTP listening address
  #[serde(default = "default_server_addr")]
  pub server_addr: String,

  /// Admin portal password. Never written back out.
  #[serde(default, skip_serializing)]
  pub admin_password: Option<String>,

  #[serde(default)]
  pub ids: IdConfig,

  /// Log configuration
  #[serde(default)]
  pub log: LogConfig,
}

fn default_server_addr() -> String {
  "0.0.0.0:8080".to_string()
}

impl Default for Config {
  fn default() -> Self {
    Self {
      server_addr: default_server_addr(),
      admin_password: None,
      ids: IdConfig::default(),
      log: LogConfig::default(),
    }
  }
}

impl Config {
  /// Load configuration from TOML file
  pub fn from_file(path: &str) -> Result<Self, ConfigError> {
    let config_str = fs::read_to_string(path).map_err(|source| ConfigError::Read {
      path: path.to_string(),
      source,
    })?;

    toml::from_str(&config_str).map_err(|source| ConfigError::Parse {
      path: path.to_string(),
      source,
    })
  }

  /// Overlay values taken from the environment through `lookup`
  pub fn apply_env<F>(&mut self, lookup: F)
  where
    F: Fn(&str) -> Option<String>,
  {
    if let Some(password) = lookup(ADMIN_PASSWORD_ENV) {
      self.admin_password = Some(password);
    }
  }

  /// Overlay values from the process environment
  pub fn with_process_env(mut self) -> Self {
    self.apply_env(|key| std::env::var(key).ok());
    self
  }

  /// Check everything the server needs before it binds
  pub fn validate(&self) -> Result<(), ConfigError> {
    self.admin_password()?;
    self.socket_addr()?;
    Ok(())
  }

  pub fn admin_password(&self) -> Result<&str, ConfigError> {
    match self.admin_password.as_deref() {
      Some(password) if !password.is_empty() => Ok(password),
      _ => Err(ConfigError::MissingAdminPassword),
    }
  }

  pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
    self
      .server_addr
      .parse()
      .map_err(|_| ConfigError::InvalidAddr {
        addr: self.server_addr.clone(),
      })
  }
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon configuration: a TOML file with every section optional.

use std::path::{Path, PathBuf};
use std::time::Duration;

use ov_engine::PoolConfig;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read {path}: {source}")]
    Read { path: PathBuf, source: std::io::Error },

    #[error("parse {path}: {source}")]
    Parse { path: PathBuf, source: toml::de::Error },

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct Config {
    pub daemon: DaemonSection,
    pub pool: PoolSection,
    pub events: EventsSection,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct DaemonSection {
    /// IPC socket; defaults to `<state_dir>/overseerd.sock`.
    pub socket_path: Option<PathBuf>,
    /// Address of the WebSocket subscriber endpoint.
    pub ws_listen: String,
    /// Log directory; stdout only when unset.
    pub log_dir: Option<PathBuf>,
    pub log_level: String,
}

impl Default for DaemonSection {
    fn default() -> Self {
        Self {
            socket_path: None,
            ws_listen: "127.0.0.1:7070".to_string(),
            log_dir: None,
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct PoolSection {
    pub capacity: usize,
    pub probe_interval_secs: u64,
    pub dial_timeout_secs: u64,
    pub command_timeout_secs: u64,
}

impl Default for PoolSection {
    fn default() -> Self {
        Self {
            capacity: 16,
            probe_interval_secs: 30,
            dial_timeout_secs: 30,
            command_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct EventsSection {
    pub heartbeat_secs: u64,
    pub read_deadline_secs: u64,
    pub write_timeout_secs: u64,
}

impl Default for EventsSection {
    fn default() -> Self {
        Self { heartbeat_secs: 30, read_deadline_secs: 60, write_timeout_secs: 5 }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        let config: Config = toml::from_str(&text)
            .map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults when the file does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.pool.capacity == 0 {
            return Err(ConfigError::Invalid("pool.capacity must be at least 1".to_string()));
        }
        if self.pool.probe_interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "pool.probe_interval_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn pool_config(&self) -> PoolConfig {
        PoolConfig {
            capacity: self.pool.capacity,
            probe_interval: Duration::from_secs(self.pool.probe_interval_secs),
            dial_timeout: Duration::from_secs(self.pool.dial_timeout_secs),
            command_timeout: Duration::from_secs(self.pool.command_timeout_secs),
        }
    }

    pub fn heartbeat(&self) -> Duration {
        Duration::from_secs(self.events.heartbeat_secs)
    }

    pub fn read_deadline(&self) -> Duration {
        Duration::from_secs(self.events.read_deadline_secs)
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_secs(self.events.write_timeout_secs)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

//! Configuration for opening a log

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::logging::{FileLog, Logger, NullLog, DEFAULT_RETENTION};

/// Log configuration, usually read from a TOML file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogConfig {
    /// Write a log at all (default: true)
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Directory for log files; searched for when unset
    #[serde(default)]
    pub directory: Option<PathBuf>,

    /// Log name without extension; the executable name when unset
    #[serde(default)]
    pub name: Option<String>,

    /// Files kept per log, current one included (default: 10, between 2 and 1000)
    #[serde(default = "default_retention")]
    pub retention: usize,

    /// Seconds to wait for other processes to finish starting their logs
    /// (default: 300). Values too large for a deadline wait without bound.
    #[serde(default = "default_lock_timeout_secs")]
    pub lock_timeout_secs: u64,
}

fn default_enabled() -> bool {
    true
}

fn default_retention() -> usize {
    DEFAULT_RETENTION
}

fn default_lock_timeout_secs() -> u64 {
    300 // 5 minutes
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            directory: None,
            name: None,
            retention: default_retention(),
            lock_timeout_secs: default_lock_timeout_secs(),
        }
    }
}

impl LogConfig {
    /// Load configuration from `path`, or return the default if the file does not exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            Self::parse(&content)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse config file")
    }

    /// Save configuration to `path`
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content).context("Failed to write config file")?;
        Ok(())
    }

    pub fn lock_timeout(&self) -> Duration {
        Duration::from_secs(self.lock_timeout_secs)
    }

    /// Rotate and open the configured log
    pub fn open(&self) -> Result<Logger> {
        if !self.enabled {
            return Ok(Logger::Null(NullLog));
        }

        let mut opener = FileLog::builder()
            .retention(self.retention)
            .lock_timeout(self.lock_timeout());
        if let Some(directory) = &self.directory {
            opener = opener.directory(directory);
        }
        if let Some(name) = &self.name {
            opener = opener.name(name);
        }

        let log = opener.open().context("Failed to open log")?;
        Ok(Logger::File(log))
    }
}

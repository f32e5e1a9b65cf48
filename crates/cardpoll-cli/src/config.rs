//! Configuration loading and validation

use anyhow::Result;
use cardpoll_core::constants::{DEFAULT_CHANNEL_CAPACITY, DEFAULT_POLL_INTERVAL_MS};
use cardpoll_hardware::PollSchedule;
use cardpoll_hardware::types::{BusPins, ReaderPins, validate_pin_map};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub bus: BusPins,
    #[serde(default = "ReaderPins::reader1")]
    pub reader1: ReaderPins,
    #[serde(default = "ReaderPins::reader2")]
    pub reader2: ReaderPins,
    #[serde(default)]
    pub poll: PollConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bus: BusPins::default(),
            reader1: ReaderPins::reader1(),
            reader2: ReaderPins::reader2(),
            poll: PollConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollConfig {
    /// Delay after each pass over both readers, in milliseconds
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    /// Events buffered between the poll loop and the consumer
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            channel_capacity: default_channel_capacity(),
        }
    }
}

fn default_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

fn default_channel_capacity() -> usize {
    DEFAULT_CHANNEL_CAPACITY
}

impl Config {
    /// Reject settings the poller cannot run with.
    pub fn validate(&self) -> cardpoll_core::Result<()> {
        if self.poll.interval_ms == 0 {
            return Err(cardpoll_core::Error::Config(
                "poll.interval_ms must be greater than zero".to_string(),
            ));
        }
        if self.poll.channel_capacity == 0 {
            return Err(cardpoll_core::Error::Config(
                "poll.channel_capacity must be greater than zero".to_string(),
            ));
        }

        validate_pin_map(&self.bus, &[self.reader1, self.reader2])
            .map_err(|e| cardpoll_core::Error::Config(e.to_string()))
    }

    pub fn schedule(&self) -> PollSchedule {
        PollSchedule::from_millis(self.poll.interval_ms)
    }
}

/// Load configuration from file, falling back to defaults when it is absent
pub fn load_config(path: &Path) -> Result<Config> {
    if path.exists() {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    } else {
        info!(
            path = %path.display(),
            "Configuration file not found, using defaults"
        );
        Ok(Config::default())
    }
}

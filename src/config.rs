// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Dispatcher thread configuration.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
    #[error("Invalid thread name {0:?}: must not contain NUL bytes")]
    InvalidThreadName(String),
}

/// Settings for the background thread that serves async observers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatcherConfig {
    /// Name given to the dispatcher thread.
    pub thread_name: String,
    /// Ask the OS to schedule the dispatcher thread below normal priority.
    pub low_priority: bool,
    /// Nice value applied when `low_priority` is set (Linux only, 0-19).
    pub nice_level: i32,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            thread_name: "paramsync-dispatcher".to_string(),
            low_priority: true,
            nice_level: 10,
        }
    }
}

impl DispatcherConfig {
    /// Load config from TOML string.
    pub fn from_toml(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the settings can be handed to the OS.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.thread_name.contains('\0') {
            return Err(ConfigError::InvalidThreadName(self.thread_name.clone()));
        }
        Ok(())
    }

    /// Serialize to TOML string.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Load config from a file, falling back to defaults if it does not exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            debug!("No dispatcher config at {:?}, using defaults", path);
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Write config to a file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    /// Builder: set thread name.
    pub fn with_thread_name(mut self, name: &str) -> Self {
        self.thread_name = name.to_string();
        self
    }

    /// Builder: enable or disable the low priority request.
    pub fn with_low_priority(mut self, low_priority: bool) -> Self {
        self.low_priority = low_priority;
        self
    }
}

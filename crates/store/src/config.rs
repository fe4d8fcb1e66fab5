// VDB - Source-level Debugger Front-end
// Copyright (C) 2024 Zhuo Zhang and Wuqi Zhang
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Configuration system for VDB
//!
//! User preferences live in `~/.vdb.toml`:
//!
//! ```toml
//! [breakpoints]
//! first_id = 11000
//!
//! [engine]
//! replay_on_link = true
//!
//! [logging]
//! file_logging = false
//! ```

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use vdb_common::types::BreakpointIdGenerator;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Breakpoint registry settings
    pub breakpoints: BreakpointConfig,
    /// Engine connection settings
    pub engine: EngineConfig,
    /// Logging settings
    pub logging: LoggingConfig,
}

/// Breakpoint registry configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BreakpointConfig {
    /// Id given to the first breakpoint of a session
    pub first_id: u64,
}

/// Engine connection configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Send every live breakpoint to a newly linked engine
    pub replay_on_link: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Also write logs to a file under the temp directory
    pub file_logging: bool,
}

impl Default for BreakpointConfig {
    fn default() -> Self {
        Self { first_id: BreakpointIdGenerator::DEFAULT_FIRST_ID }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { replay_on_link: true }
    }
}

impl Config {
    /// Get the config file path (~/.vdb.toml)
    pub fn config_path() -> Result<PathBuf> {
        let home =
            dirs::home_dir().ok_or_else(|| eyre::eyre!("Unable to determine home directory"))?;
        Ok(home.join(".vdb.toml"))
    }

    /// Load configuration from the default path, creating it if it doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            info!("Config file not found, creating default at {:?}", config_path);
            let default_config = Self::default();
            default_config.save()?;
            return Ok(default_config);
        }

        Self::load_from_path(config_path)
    }

    /// Load configuration from an explicit file
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path:?}"))?;

        let config: Self =
            toml::from_str(&content).with_context(|| "Failed to parse config file as TOML")?;

        debug!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Save configuration to the default path
    pub fn save(&self) -> Result<()> {
        self.save_to_path(Self::config_path()?)
    }

    /// Save configuration to an explicit file
    pub fn save_to_path(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content =
            toml::to_string_pretty(self).with_context(|| "Failed to serialize config to TOML")?;

        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {path:?}"))?;

        debug!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Id generator honouring [`BreakpointConfig::first_id`]
    pub fn id_generator(&self) -> BreakpointIdGenerator {
        BreakpointIdGenerator::starting_at(self.breakpoints.first_id)
    }
}

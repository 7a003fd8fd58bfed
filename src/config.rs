//! Configuration management for Keystate Tracker
//!
//! Configuration is read from a platform-specific TOML file; a missing file
//! means defaults.
//!
//! ## Config File Locations
//!
//! | Platform | Path |
//! |----------|------|
//! | Linux | `~/.config/keystate-tracker/config.toml` |
//!
//! ## Example
//!
//! ```no_run
//! use keystate_tracker::Config;
//!
//! let config = Config::load().unwrap_or_default();
//! println!("exit key: {}", config.monitor.exit_key);
//! ```

use crate::keyboard::keymap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error type for configuration operations
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to determine config directory
    #[error("Could not determine config directory")]
    NoConfigDir,
    /// IO error reading or writing config file
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    /// Failed to parse config file
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Failed to serialize config
    #[error("Serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    /// Parsed but semantically wrong
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Returns the path to the config file.
///
/// - Linux: `~/.config/keystate-tracker/config.toml`
pub fn config_path() -> Result<PathBuf, ConfigError> {
    let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
    Ok(config_dir.join("keystate-tracker").join("config.toml"))
}

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    /// Device discovery settings
    #[serde(default)]
    pub devices: DeviceConfig,
    /// Key monitor settings
    #[serde(default)]
    pub monitor: MonitorConfig,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Device discovery configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DeviceConfig {
    /// Directory holding `event*` device nodes
    pub input_dir: PathBuf,
    /// Keywords used when none are given on the command line
    pub default_keywords: Vec<String>,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("/dev/input"),
            default_keywords: Vec::new(),
        }
    }
}

/// Key monitor configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MonitorConfig {
    /// Print auto-repeat transitions
    pub show_repeat: bool,
    /// Long-pressing this key ends the monitor
    pub exit_key: String,
    /// Repeat count the exit key has to exceed
    pub exit_hold_count: u32,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            show_repeat: false,
            exit_key: "KEY_S".to_string(),
            exit_hold_count: 10,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default level filter when `RUST_LOG` is unset
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the default config file.
    ///
    /// Returns the default configuration if the file doesn't exist.
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load() -> Result<Self, ConfigError> {
        let path = config_path()?;

        if !path.exists() {
            return Ok(Self::default());
        }

        Self::load_from(&path)
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a specific path, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                fs::create_dir_all(dir)?;
            }
        }
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Check values serde cannot check
    pub fn validate(&self) -> Result<(), ConfigError> {
        if keymap::code_for_name(&self.monitor.exit_key).is_none() {
            return Err(ConfigError::Invalid(format!(
                "unknown exit_key {:?}",
                self.monitor.exit_key
            )));
        }
        if self.monitor.exit_hold_count == 0 {
            return Err(ConfigError::Invalid(
                "exit_hold_count must be at least 1".to_string(),
            ));
        }
        if self.logging.level.parse::<log::LevelFilter>().is_err() {
            return Err(ConfigError::Invalid(format!(
                "unknown log level {:?}",
                self.logging.level
            )));
        }
        Ok(())
    }
}

//! Configuration file handling.
//!
//! This module provides loading and saving of auditgate configuration
//! from a TOML file.
//!
//! # Configuration Location
//!
//! The first of these that exists is used:
//! - the path given with `--config`
//! - `auditgate.toml` in the working directory
//! - the user config file:
//!   - Linux: `~/.config/auditgate/config.toml`
//!   - macOS: `~/Library/Application Support/auditgate/config.toml`
//!   - Windows: `%APPDATA%\auditgate\config.toml`
//!
//! # Example Configuration
//!
//! ```toml
//! allowlist_path = ".audit-allowlist.json"
//! expiring_threshold_days = 30
//! default_format = "table"
//! npm_command = "npm"
//! audit_args = ["--omit=dev"]
//! ```

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::expiry::DEFAULT_EXPIRING_THRESHOLD_DAYS;

/// Name of the project-local config file.
pub const LOCAL_CONFIG_FILE: &str = "auditgate.toml";

/// Application configuration.
///
/// # Example
///
/// ```no_run
/// use auditgate::Config;
///
/// let config = Config::load().unwrap();
///
/// println!("Allowlist: {}", config.allowlist_path);
/// println!("Expiring window: {} days", config.expiring_threshold_days);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Allowlist file used when `--allowlist` is not given.
    ///
    /// A missing file at this path means "no allowlist".
    /// Default: ".audit-allowlist.json"
    pub allowlist_path: String,

    /// Allowed entries expiring within this many days are flagged.
    ///
    /// Default: 30
    pub expiring_threshold_days: i64,

    /// Default output format when no `--format` flag is provided.
    ///
    /// Valid values: "table", "json"
    /// Default: "table"
    pub default_format: String,

    /// Package manager executable used to produce the audit report.
    ///
    /// Default: "npm"
    pub npm_command: String,

    /// Extra arguments appended to `<npm_command> audit --json`.
    pub audit_args: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            allowlist_path: ".audit-allowlist.json".to_string(),
            expiring_threshold_days: DEFAULT_EXPIRING_THRESHOLD_DAYS,
            default_format: "table".to_string(),
            npm_command: "npm".to_string(),
            audit_args: Vec::new(),
        }
    }
}

impl Config {
    /// Loads configuration from the first config file found.
    ///
    /// If no config file exists, returns default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be read, parsed,
    /// or holds invalid values.
    pub fn load() -> Result<Self> {
        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            return Self::load_from(&local);
        }

        let path = Self::config_path();
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Loads configuration from a specific file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.expiring_threshold_days < 0 {
            bail!(
                "expiring_threshold_days must be zero or greater, got {}",
                self.expiring_threshold_days
            );
        }
        if self.npm_command.trim().is_empty() {
            bail!("npm_command must not be empty");
        }
        Ok(())
    }

    /// Saves the configuration to the user config file.
    ///
    /// Creates the parent directory if it doesn't exist.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    /// Saves the configuration to a specific file.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Returns the path to the user configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("auditgate")
            .join("config.toml")
    }

    /// Generates a string containing the default configuration.
    pub fn generate_default_config() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

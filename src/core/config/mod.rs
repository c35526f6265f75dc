//! core::config
//!
//! Settings file loading.
//!
//! # Overview
//!
//! Everything about repositories and users comes from git configuration (see
//! `context`). This file only holds tool policy: the API scheme and the
//! browser command.
//!
//! # Locations
//!
//! Searched in order:
//! 1. `$HUB_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/hub/config.toml`
//! 3. `~/.hub/config.toml`
//!
//! A missing file means defaults. A file that exists but does not parse is an
//! error.
//!
//! # Example
//!
//! ```no_run
//! use hubwork::core::config::SettingsFile;
//!
//! let loaded = SettingsFile::load(None).unwrap();
//! println!("API scheme: {}", loaded.settings.api.scheme.as_str());
//! ```

pub mod schema;

pub use schema::{ApiScheme, ApiSettings, BrowserSettings, Settings};

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from settings loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Loaded settings and where they came from.
#[derive(Debug, Clone, Default)]
pub struct SettingsFile {
    /// The settings (defaults when no file exists)
    pub settings: Settings,
    /// Path of the file that was read
    pub path: Option<PathBuf>,
}

impl SettingsFile {
    /// Load settings from the standard locations.
    ///
    /// `explicit` is the value of `$HUB_CONFIG`, if any. An explicit path that
    /// does not exist falls through to the other locations.
    pub fn load(explicit: Option<&Path>) -> Result<SettingsFile, ConfigError> {
        for path in Self::candidates(explicit) {
            if path.exists() {
                let settings = Self::read(&path)?;
                return Ok(SettingsFile {
                    settings,
                    path: Some(path),
                });
            }
        }
        Ok(SettingsFile::default())
    }

    /// Candidate paths in search order.
    fn candidates(explicit: Option<&Path>) -> Vec<PathBuf> {
        let mut paths = Vec::new();
        if let Some(path) = explicit {
            paths.push(path.to_path_buf());
        }
        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            if !xdg_home.is_empty() {
                paths.push(PathBuf::from(xdg_home).join("hub/config.toml"));
            }
        }
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".hub/config.toml"));
        }
        paths
    }

    /// Read, parse and validate one file.
    pub fn read(path: &Path) -> Result<Settings, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        settings.validate()?;
        Ok(settings)
    }
}

//! Configuration management module
//!
//! Provides centralized configuration including:
//! - Persisted-state file paths (alert settings, alerts-enabled flag)
//! - Log file path (replaces hard-coded paths)
//! - Build information (version, authors)
//!
//! All configuration is environment-aware and portable.

use std::path::PathBuf;

/// Configuration manager
pub struct Config;

impl Config {
    /// Get the log file path
    ///
    /// Returns a path in the user's home directory: `$HOME/.quakewatch/debug.log`
    /// Falls back to a temporary directory if HOME is not available.
    pub fn log_file_path() -> PathBuf {
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home).join(".quakewatch").join("debug.log");
        }
        std::env::temp_dir().join("quakewatch-debug.log")
    }

    /// Get the alert settings file path: `$HOME/.quakewatch/alert-settings.json`
    /// Falls back to a temporary directory if HOME is not available.
    pub fn settings_file_path() -> PathBuf {
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home).join(".quakewatch").join("alert-settings.json");
        }
        std::env::temp_dir().join("quakewatch-alert-settings.json")
    }

    /// Get the alerts-enabled flag file path: `$HOME/.quakewatch/alerts-enabled.json`
    /// Independent of the settings file so the flag can be toggled without
    /// touching thresholds. Falls back to temp if HOME is not available.
    pub fn alerts_enabled_file_path() -> PathBuf {
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home).join(".quakewatch").join("alerts-enabled.json");
        }
        std::env::temp_dir().join("quakewatch-alerts-enabled.json")
    }

    /// Ensure the state directory exists
    ///
    /// Creates the directory containing the settings files if it doesn't exist.
    pub fn ensure_state_directory() -> std::io::Result<()> {
        let path = Self::settings_file_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    /// Ensure the log directory exists
    pub fn ensure_log_directory() -> std::io::Result<()> {
        let log_path = Self::log_file_path();
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    /// Get the version string
    ///
    /// Returns the package version from CARGO_PKG_VERSION.
    pub fn version() -> String {
        env!("CARGO_PKG_VERSION").to_string()
    }

    /// Get the authors string
    ///
    /// Returns the package authors from CARGO_PKG_AUTHORS.
    pub fn authors() -> String {
        env!("CARGO_PKG_AUTHORS").to_string()
    }
}

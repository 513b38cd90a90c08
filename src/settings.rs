//! Persisted alert settings and the alerts-enabled flag
//!
//! Two independent JSON files under `~/.quakewatch/`. Loading never fails
//! the caller: missing or corrupt state yields defaults. Saving is
//! fire-and-forget: failures are logged and swallowed, so callers must not
//! assume durability confirmation.

use crate::config::Config;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;

/// Valid radius range in kilometers.
pub const RADIUS_KM_MIN: f64 = 25.0;
pub const RADIUS_KM_MAX: f64 = 500.0;

/// Valid magnitude threshold range.
pub const MIN_MAGNITUDE_MIN: f64 = 0.0;
pub const MIN_MAGNITUDE_MAX: f64 = 7.0;

/// User-configurable alert parameters. A snapshot is read at the start of
/// every monitor tick and treated as immutable within it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlertSettings {
    pub radius_km: f64,
    pub min_magnitude: f64,
}

impl Default for AlertSettings {
    fn default() -> Self {
        Self {
            radius_km: 150.0,
            min_magnitude: 3.0,
        }
    }
}

impl AlertSettings {
    /// Clamp both fields into their valid ranges.
    pub fn clamped(self) -> Self {
        Self {
            radius_km: self.radius_km.clamp(RADIUS_KM_MIN, RADIUS_KM_MAX),
            min_magnitude: self.min_magnitude.clamp(MIN_MAGNITUDE_MIN, MIN_MAGNITUDE_MAX),
        }
    }
}

/// Load the alert settings, substituting defaults on any failure.
pub fn load() -> AlertSettings {
    load_from(&Config::settings_file_path())
}

/// Save the alert settings (clamped into range). Failures are swallowed.
pub fn save(settings: AlertSettings) {
    if let Err(e) = Config::ensure_state_directory() {
        warn!("Settings: failed to create state directory: {}", e);
    }
    save_to(&Config::settings_file_path(), settings)
}

/// Load the persisted alerts-enabled flag; missing or corrupt ⇒ false.
pub fn load_enabled() -> bool {
    load_enabled_from(&Config::alerts_enabled_file_path())
}

/// Persist the alerts-enabled flag. Failures are swallowed.
pub fn save_enabled(enabled: bool) {
    if let Err(e) = Config::ensure_state_directory() {
        warn!("Settings: failed to create state directory: {}", e);
    }
    save_enabled_to(&Config::alerts_enabled_file_path(), enabled)
}

fn load_from(path: &Path) -> AlertSettings {
    match std::fs::read_to_string(path) {
        Ok(content) => match serde_json::from_str::<AlertSettings>(&content) {
            Ok(settings) => settings,
            Err(e) => {
                warn!("Settings: failed to parse {:?}: {}, using defaults", path, e);
                AlertSettings::default()
            }
        },
        Err(_) => AlertSettings::default(),
    }
}

fn save_to(path: &Path, settings: AlertSettings) {
    let settings = settings.clamped();
    match serde_json::to_string_pretty(&settings) {
        Ok(json) => {
            if let Err(e) = std::fs::write(path, json) {
                warn!("Settings: failed to write {:?}: {}", path, e);
            }
        }
        Err(e) => warn!("Settings: failed to serialize settings: {}", e),
    }
}

fn load_enabled_from(path: &Path) -> bool {
    std::fs::read_to_string(path)
        .ok()
        .and_then(|content| serde_json::from_str::<bool>(&content).ok())
        .unwrap_or(false)
}

fn save_enabled_to(path: &Path, enabled: bool) {
    match serde_json::to_string(&enabled) {
        Ok(json) => {
            if let Err(e) = std::fs::write(path, json) {
                warn!("Settings: failed to write {:?}: {}", path, e);
            }
        }
        Err(e) => warn!("Settings: failed to serialize flag: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let settings = load_from(&dir.path().join("nope.json"));
        assert_eq!(settings, AlertSettings::default());
        assert_eq!(settings.radius_km, 150.0);
        assert_eq!(settings.min_magnitude, 3.0);
    }

    #[test]
    fn corrupt_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("alert-settings.json");
        std::fs::write(&path, "{not json").expect("write");
        assert_eq!(load_from(&path), AlertSettings::default());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("alert-settings.json");
        let settings = AlertSettings { radius_km: 250.0, min_magnitude: 4.5 };
        save_to(&path, settings);
        assert_eq!(load_from(&path), settings);
    }

    #[test]
    fn save_clamps_out_of_range_values() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("alert-settings.json");
        save_to(&path, AlertSettings { radius_km: 9000.0, min_magnitude: -2.0 });
        let loaded = load_from(&path);
        assert_eq!(loaded.radius_km, RADIUS_KM_MAX);
        assert_eq!(loaded.min_magnitude, MIN_MAGNITUDE_MIN);
    }

    #[test]
    fn enabled_flag_round_trips_and_defaults_false() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("alerts-enabled.json");
        assert!(!load_enabled_from(&path));
        save_enabled_to(&path, true);
        assert!(load_enabled_from(&path));
        save_enabled_to(&path, false);
        assert!(!load_enabled_from(&path));
    }
}

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::data::model::BmsColumns;

/// Config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "bms-dash.json";
/// Environment variable overriding the config path.
pub const CONFIG_ENV: &str = "BMS_DASH_CONFIG";

/// Dashboard settings read from `bms-dash.json`.
///
/// ```json
/// { "window_size": [1400, 900], "columns": { "battery_id": "Pack" } }
/// ```
///
/// Every field is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashConfig {
    pub window_size: [f32; 2],
    pub columns: BmsColumns,
}

impl Default for DashConfig {
    fn default() -> Self {
        Self {
            window_size: [1400.0, 900.0],
            columns: BmsColumns::default(),
        }
    }
}

impl DashConfig {
    /// Read and parse a config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&data).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Load the config from `$BMS_DASH_CONFIG` or `./bms-dash.json`.
    ///
    /// A missing file yields the defaults; a broken one is logged and
    /// replaced by the defaults.
    pub fn load() -> Self {
        let path = std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        Self::load_or_default(&path)
    }

    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match Self::from_file(path) {
            Ok(config) => {
                info!("Config loaded from {}", path.display());
                config
            }
            Err(e) => {
                warn!("Ignoring config: {e:#}");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: DashConfig =
            serde_json::from_str(r#"{ "columns": { "battery_id": "Pack" } }"#).unwrap();
        assert_eq!(config.window_size, DashConfig::default().window_size);
        assert_eq!(config.columns.battery_id, "Pack");
        assert_eq!(config.columns.soc, "SoC");
    }

    #[test]
    fn test_missing_and_broken_files_fall_back() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("none.json");
        assert_eq!(DashConfig::load_or_default(&missing), DashConfig::default());

        let broken = dir.path().join("broken.json");
        std::fs::write(&broken, "{ not json").unwrap();
        assert!(DashConfig::from_file(&broken).is_err());
        assert_eq!(DashConfig::load_or_default(&broken), DashConfig::default());
    }

    #[test]
    fn test_file_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bms-dash.json");
        std::fs::write(&path, r#"{ "window_size": [800, 600] }"#).unwrap();
        let config = DashConfig::load_or_default(&path);
        assert_eq!(config.window_size, [800.0, 600.0]);
        assert_eq!(config.columns, BmsColumns::default());
    }
}

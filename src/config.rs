use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::Deserialize;

use crate::format::{BRAND_COLOR, WARNING_COLOR};
use crate::metrics::KpiColors;
use crate::table::{KNOWN_BAD_ROW, LoadOptions};

/// Application configuration loaded from TOML config file.
/// All fields have sensible defaults — the config file is optional.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Song spreadsheet (overrides `dataSet/spotify.xlsx`).
    pub data_path: Option<PathBuf>,
    /// Bars in the most-streamed chart.
    pub top_n: usize,
    /// Raw row positions always discarded before parsing.
    pub known_bad_rows: Vec<usize>,
    /// Skip malformed rows instead of refusing to load the table.
    pub skip_invalid_rows: bool,
    /// Display colours.
    pub colors: ColorConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_path: None,
            top_n: 10,
            known_bad_rows: vec![KNOWN_BAD_ROW],
            skip_invalid_rows: false,
            colors: ColorConfig::default(),
        }
    }
}

/// Display colour configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ColorConfig {
    /// Values and positive deltas.
    pub brand: String,
    /// Negative or flat deltas.
    pub warning: String,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            brand: BRAND_COLOR.to_string(),
            warning: WARNING_COLOR.to_string(),
        }
    }
}

impl ColorConfig {
    pub fn kpi(&self) -> KpiColors<'_> {
        KpiColors {
            up: &self.brand,
            down: &self.warning,
        }
    }
}

impl AppConfig {
    /// Load config from `~/.config/streamboard/config.toml`.
    /// Returns default config if file doesn't exist.
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => {
                log::debug!("No config file found, using defaults");
                Self::default()
            }
        }
    }

    /// Load config from an explicit path.
    /// Logs a warning if the file can't be read or parsed.
    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<AppConfig>(&contents) {
                Ok(config) => {
                    log::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    log::warn!("Failed to parse {}: {}. Using defaults.", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("Failed to read {}: {}. Using defaults.", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            known_bad_rows: self.known_bad_rows.clone(),
            skip_invalid_rows: self.skip_invalid_rows,
        }
    }

    /// Get the config file path.
    fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", crate::APP_NAME)
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }
}

/// The spreadsheet location used when neither CLI nor config names one.
pub fn default_data_path() -> PathBuf {
    PathBuf::from("dataSet").join("spotify.xlsx")
}

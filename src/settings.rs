use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::charts::{DEFAULT_BINS, DEFAULT_CURRENCY};
use crate::error::{DashError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub dataset_path: Option<String>,
    #[serde(default = "default_currency_suffix")]
    pub currency_suffix: String,
    #[serde(default = "default_histogram_bins")]
    pub histogram_bins: usize,
}

fn default_currency_suffix() -> String {
    DEFAULT_CURRENCY.to_string()
}

fn default_histogram_bins() -> usize {
    DEFAULT_BINS
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            dataset_path: None,
            currency_suffix: default_currency_suffix(),
            histogram_bins: default_histogram_bins(),
        }
    }
}

pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("tillview")
}

pub fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

pub fn log_path() -> PathBuf {
    config_dir().join("tillview.log")
}

pub fn load_settings() -> Settings {
    load_settings_from(&settings_path())
}

/// Missing or unreadable files fall back to defaults.
fn load_settings_from(path: &Path) -> Settings {
    if path.exists() {
        let content = std::fs::read_to_string(path).unwrap_or_default();
        serde_json::from_str(&content).unwrap_or_default()
    } else {
        Settings::default()
    }
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    save_settings_to(&settings_path(), settings)
}

fn save_settings_to(path: &Path, settings: &Settings) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let json = serde_json::to_string_pretty(settings)?;
    std::fs::write(path, format!("{json}\n"))?;
    Ok(())
}

/// Dataset to open: `--data` wins over the saved default.
pub fn resolve_dataset(cli_override: Option<&str>) -> Result<PathBuf> {
    cli_override
        .map(str::to_string)
        .or_else(|| load_settings().dataset_path)
        .map(|p| PathBuf::from(shellexpand_path(&p)))
        .ok_or(DashError::NoDataset)
}

pub fn shellexpand_path(path: &str) -> String {
    if path.starts_with('~') {
        if let Some(home) = dirs::home_dir() {
            return path.replacen('~', &home.to_string_lossy(), 1);
        }
    }
    std::fs::canonicalize(path)
        .unwrap_or_else(|_| PathBuf::from(path))
        .to_string_lossy()
        .to_string()
}

//! Application settings and the seed invoice.
//!
//! Both live in the platform config directory:
//! - `settings.toml`: output folder, currency, typst binary
//! - `invoice.toml`: the invoice the editor starts from, written from the
//!   built-in default on first run

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use directories::{BaseDirs, ProjectDirs};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::InvoiceSeed;

pub const DEFAULT_SEED_TEMPLATE: &str = include_str!("../invoice.toml");

const SETTINGS_FILENAME: &str = "settings.toml";
const SEED_FILENAME: &str = "invoice.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine the configuration directory")]
    NoConfigDir,
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub output_dir: String,
    pub currency: String,
    pub typst: String,
    pub open_after_export: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        AppSettings {
            output_dir: "~/Documents/Invoices".to_string(),
            currency: "Rs.".to_string(),
            typst: "typst".to_string(),
            open_after_export: true,
        }
    }
}

impl AppSettings {
    pub fn output_root(&self) -> PathBuf {
        PathBuf::from(expand_home_dir(&self.output_dir))
    }
}

pub fn config_dir() -> Option<PathBuf> {
    ProjectDirs::from("com", "invoice-designer", "app").map(|dirs| dirs.config_dir().to_path_buf())
}

pub fn settings_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join(SETTINGS_FILENAME))
}

/// Loads settings, falling back to defaults when the file is missing or
/// unreadable.
pub fn load_settings() -> AppSettings {
    let Some(path) = settings_path() else {
        tracing::warn!("Could not determine settings path, using defaults");
        return AppSettings::default();
    };
    match read_settings(&path) {
        Ok(Some(settings)) => {
            tracing::info!("Loaded settings from {:?}", path);
            settings
        }
        Ok(None) => {
            tracing::info!("No settings file at {:?}, using defaults", path);
            AppSettings::default()
        }
        Err(e) => {
            tracing::warn!("{}, using defaults", e);
            AppSettings::default()
        }
    }
}

pub fn read_settings(path: &Path) -> Result<Option<AppSettings>, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    toml::from_str(&content)
        .map(Some)
        .map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
}

pub fn save_settings(settings: &AppSettings) -> Result<PathBuf, ConfigError> {
    let path = settings_path().ok_or(ConfigError::NoConfigDir)?;
    write_settings(&path, settings)?;
    tracing::info!("Saved settings to {:?}", path);
    Ok(path)
}

pub fn write_settings(path: &Path, settings: &AppSettings) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let content = toml::to_string_pretty(settings)?;
    fs::write(path, content).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Loads the seed invoice. An explicit path must exist; otherwise the config
/// directory copy is used, created from the built-in default if absent.
pub fn load_seed(explicit: Option<&Path>) -> Result<InvoiceSeed, ConfigError> {
    if let Some(path) = explicit {
        return read_seed(path);
    }
    let Some(dir) = config_dir() else {
        tracing::warn!("Could not determine config directory, using built-in invoice");
        return parse_seed(Path::new(SEED_FILENAME), DEFAULT_SEED_TEMPLATE);
    };
    let path = dir.join(SEED_FILENAME);
    if !path.exists() {
        init_seed(&path)?;
    }
    read_seed(&path)
}

fn init_seed(path: &Path) -> Result<(), ConfigError> {
    tracing::info!("Initializing default invoice at {:?}", path);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, DEFAULT_SEED_TEMPLATE).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

pub fn read_seed(path: &Path) -> Result<InvoiceSeed, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_seed(path, &content)
}

fn parse_seed(path: &Path, content: &str) -> Result<InvoiceSeed, ConfigError> {
    toml::from_str(content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

pub fn expand_home_dir(path: &str) -> String {
    if path.starts_with('~') {
        if let Some(base_dirs) = BaseDirs::new() {
            let home = base_dirs.home_dir().to_string_lossy();
            return path.replacen('~', &home, 1);
        }
    }
    path.to_string()
}

//! User configuration: a flat key/value TOML file plus a typed view of the
//! keys the application reads.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{
    error::ConfigError,
    types::{CoachMode, Units},
};

pub const DEFAULT_DB_PATH: &str = "./ironlog.db";
pub const DEFAULT_API_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_API_MODEL: &str = "gpt-3.5-turbo";

pub const KEY_DB_PATH: &str = "db_path";
pub const KEY_COACH_MODE: &str = "coach_mode";
pub const KEY_COACH_ENDPOINT: &str = "coach_endpoint";
pub const KEY_COACH_API_KEY: &str = "coach_api_key";
pub const KEY_COACH_MODEL: &str = "coach_model";
pub const KEY_UNITS: &str = "units";

pub const KNOWN_KEYS: &[&str] = &[
    KEY_DB_PATH,
    KEY_COACH_MODE,
    KEY_COACH_ENDPOINT,
    KEY_COACH_API_KEY,
    KEY_COACH_MODEL,
    KEY_UNITS,
];

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(flatten)]
    pub map: BTreeMap<String, String>,
}

impl Config {
    /// `<config dir>/ironlog/config.toml`
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|d| d.join("ironlog").join("config.toml"))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Reads the file at `path`; a missing file is an empty config.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = match fs::read_to_string(path) {
            Ok(t) => t,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::ReadFailed {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        toml::from_str(&text).map_err(|source| ConfigError::Malformed {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let text = toml::to_string(self)?;
        let write = || -> std::io::Result<()> {
            if let Some(dir) = path.parent() {
                fs::create_dir_all(dir)?;
            }
            fs::write(path, text)
        };
        write().map_err(|source| ConfigError::WriteFailed {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.map.get(key).map(String::as_str).filter(|v| !v.is_empty())
    }
}

/// The settings the application acts on, with defaults filled in.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub db_path: String,
    pub coach_mode: CoachMode,
    pub api_endpoint: String,
    pub api_key: Option<String>,
    pub api_model: String,
    pub units: Units,
}

impl Default for Settings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

fn parse_enum<T: ValueEnum + Default>(cfg: &Config, key: &str) -> T {
    match cfg.get(key) {
        None => T::default(),
        Some(raw) => T::from_str(raw, true).unwrap_or_else(|_| {
            warn!(key, value = raw, "unrecognised config value, using default");
            T::default()
        }),
    }
}

impl Settings {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            db_path: cfg.get(KEY_DB_PATH).unwrap_or(DEFAULT_DB_PATH).to_string(),
            coach_mode: parse_enum(cfg, KEY_COACH_MODE),
            api_endpoint: cfg
                .get(KEY_COACH_ENDPOINT)
                .unwrap_or(DEFAULT_API_ENDPOINT)
                .to_string(),
            api_key: cfg.get(KEY_COACH_API_KEY).map(str::to_string),
            api_model: cfg.get(KEY_COACH_MODEL).unwrap_or(DEFAULT_API_MODEL).to_string(),
            units: parse_enum(cfg, KEY_UNITS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_empty_config() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load(&dir.path().join("nope.toml")).unwrap();
        assert!(cfg.map.is_empty());
        assert_eq!(Settings::from_config(&cfg), Settings::default());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut cfg = Config::default();
        cfg.map.insert(KEY_UNITS.into(), "lbs".into());
        cfg.map.insert(KEY_COACH_MODE.into(), "api".into());
        cfg.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded, cfg);

        let settings = Settings::from_config(&loaded);
        assert_eq!(settings.units, Units::Lbs);
        assert_eq!(settings.coach_mode, CoachMode::Api);
        assert_eq!(settings.api_model, DEFAULT_API_MODEL);
        assert!(settings.api_key.is_none());
    }

    #[test]
    fn bad_values_fall_back_to_defaults() {
        let mut cfg = Config::default();
        cfg.map.insert(KEY_UNITS.into(), "stone".into());
        cfg.map.insert(KEY_COACH_API_KEY.into(), String::new());
        let settings = Settings::from_config(&cfg);
        assert_eq!(settings.units, Units::Kg);
        assert!(settings.api_key.is_none());
    }

    #[test]
    fn malformed_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "units = [").unwrap();
        assert!(matches!(Config::load(&path), Err(ConfigError::Malformed { .. })));
    }
}

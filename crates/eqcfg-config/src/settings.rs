use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::errors::SettingsError;

/// Environment variable overriding the settings file location
pub const CONFIG_ENV_VAR: &str = "EQCFG_CONFIG";

const DEFAULT_START_LEVEL_KEY: &str = "default-start-level";
const START_LEVELS_FILE_KEY: &str = "start-levels-file";
const START_LEVEL_KEY_PREFIX: &str = "start-levels.";

/// Persistent defaults for `eqcfg build`, stored as TOML.
///
/// ```toml
/// default_start_level = 4
/// start_levels_file = "/opt/eclipse/start-levels.properties"
///
/// [start_levels]
/// "org.eclipse.equinox.common" = 2
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_start_level: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_levels_file: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub start_levels: BTreeMap<String, i32>,
}

impl Settings {
    /// Settings file location: `EQCFG_CONFIG` when set and non-empty,
    /// otherwise `<user config dir>/eqcfg/eqcfg.toml`.
    pub fn path() -> Result<PathBuf, SettingsError> {
        resolve_path(std::env::var(CONFIG_ENV_VAR).ok(), dirs::config_dir())
    }

    /// Load from [`Settings::path`].
    pub fn load() -> Result<Self, SettingsError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from `path`; a missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        if !path.exists() {
            debug!("No settings file at {:?}, using defaults", path);
            return Ok(Settings::default());
        }
        let content = fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        let write_error = |source| SettingsError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_error)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).map_err(write_error)?;
        debug!("Saved settings to {:?}", path);
        Ok(())
    }

    /// Look up a key; unknown keys are an error, unset keys are `None`.
    pub fn get(&self, key: &str) -> Result<Option<String>, SettingsError> {
        match key {
            DEFAULT_START_LEVEL_KEY => Ok(self.default_start_level.map(|l| l.to_string())),
            START_LEVELS_FILE_KEY => Ok(self
                .start_levels_file
                .as_ref()
                .map(|p| p.display().to_string())),
            _ => match start_level_bundle(key) {
                Some(bundle) => Ok(self.start_levels.get(bundle).map(|l| l.to_string())),
                None => Err(SettingsError::UnknownKey(key.to_string())),
            },
        }
    }

    /// Set a key. Integer keys reject non-integer values.
    ///
    /// Keys are `default-start-level`, `start-levels-file` and
    /// `start-levels.<bundle symbolic name>`.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), SettingsError> {
        match key {
            DEFAULT_START_LEVEL_KEY => {
                self.default_start_level = Some(parse_level(key, value)?);
            }
            START_LEVELS_FILE_KEY => {
                self.start_levels_file = Some(PathBuf::from(value));
            }
            _ => {
                let Some(bundle) = start_level_bundle(key) else {
                    return Err(SettingsError::UnknownKey(key.to_string()));
                };
                let level = parse_level(key, value)?;
                self.start_levels.insert(bundle.to_string(), level);
            }
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.default_start_level.is_none()
            && self.start_levels_file.is_none()
            && self.start_levels.is_empty()
    }

    /// Every set key with its value, in `get`/`set` key form.
    pub fn values_iter(&self) -> Vec<(String, String)> {
        let mut values = Vec::new();
        if let Some(level) = self.default_start_level {
            values.push((DEFAULT_START_LEVEL_KEY.to_string(), level.to_string()));
        }
        if let Some(ref file) = self.start_levels_file {
            values.push((START_LEVELS_FILE_KEY.to_string(), file.display().to_string()));
        }
        for (bundle, level) in &self.start_levels {
            values.push((format!("{}{}", START_LEVEL_KEY_PREFIX, bundle), level.to_string()));
        }
        values
    }
}

fn resolve_path(
    env_value: Option<String>,
    config_dir: Option<PathBuf>,
) -> Result<PathBuf, SettingsError> {
    if let Some(env_path) = env_value {
        let trimmed = env_path.trim();
        if !trimmed.is_empty() {
            return Ok(PathBuf::from(trimmed));
        }
    }
    config_dir
        .map(|dir| dir.join("eqcfg").join("eqcfg.toml"))
        .ok_or(SettingsError::NoConfigDir)
}

fn start_level_bundle(key: &str) -> Option<&str> {
    key.strip_prefix(START_LEVEL_KEY_PREFIX)
        .filter(|bundle| !bundle.is_empty())
}

fn parse_level(key: &str, value: &str) -> Result<i32, SettingsError> {
    value
        .trim()
        .parse::<i32>()
        .map_err(|_| SettingsError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        })
}

//! TOML-based application configuration.
//!
//! Stores user preferences:
//! - Session settings (duration off the fixed menu, technique id)
//! - Display preferences (daily quote)
//!
//! Configuration is stored at `<data_dir>/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::{ConfigError, Result};
use crate::technique;
use crate::timer::SessionConfig;

/// Fixed session-duration menu, in minutes.
pub const DURATION_MENU_MIN: [u32; 4] = [1, 3, 5, 10];

/// Session durations come off the fixed menu, nowhere else.
pub fn validate_duration_secs(secs: u32) -> Result<(), ConfigError> {
    if secs % 60 == 0 && DURATION_MENU_MIN.contains(&(secs / 60)) {
        return Ok(());
    }
    let menu = DURATION_MENU_MIN
        .iter()
        .map(|m| m.to_string())
        .collect::<Vec<_>>()
        .join("/");
    Err(ConfigError::InvalidValue {
        key: "session.duration_secs".into(),
        message: format!("must be one of the menu durations ({menu} minutes)"),
    })
}

/// Session settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSettings {
    /// Session length in seconds, from the fixed duration menu.
    #[serde(default = "default_duration_secs")]
    pub duration_secs: u32,
    /// Technique id from the built-in catalog.
    #[serde(default = "default_technique")]
    pub technique: String,
}

/// Display preferences.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_true")]
    pub daily_quote: bool,
}

/// Application configuration.
///
/// Serialized to/from TOML at `<data_dir>/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub session: SessionSettings,
    #[serde(default)]
    pub display: DisplayConfig,
}

// Default functions
fn default_duration_secs() -> u32 {
    180
}
fn default_technique() -> String {
    "4-7-8".into()
}
fn default_true() -> bool {
    true
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            duration_secs: default_duration_secs(),
            technique: default_technique(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self { daily_quote: true }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            session: SessionSettings::default(),
            display: DisplayConfig::default(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() {
            return Err(ConfigError::MissingKey(key.into()));
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current
                    .as_object_mut()
                    .ok_or_else(|| ConfigError::MissingKey(key.into()))?;
                let existing = obj
                    .get(part)
                    .ok_or_else(|| ConfigError::MissingKey(key.into()))?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value.parse::<bool>().map_err(|_| {
                            ConfigError::ParseFailed(format!("cannot parse '{value}' as bool"))
                        })?,
                    ),
                    serde_json::Value::Number(_) => {
                        if let Ok(n) = value.parse::<u64>() {
                            serde_json::Value::Number(n.into())
                        } else {
                            return Err(ConfigError::ParseFailed(format!(
                                "cannot parse '{value}' as number"
                            )));
                        }
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current
                .get_mut(part)
                .ok_or_else(|| ConfigError::MissingKey(key.into()))?;
        }

        Err(ConfigError::MissingKey(key.into()))
    }

    fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk, writing the defaults on first run.
    pub fn load() -> Result<Self> {
        Self::load_at(&Self::path()?)
    }

    pub fn load_at(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(|e| {
                    ConfigError::LoadFailed {
                        path: path.to_path_buf(),
                        message: e.to_string(),
                    }
                })?;
                Ok(cfg)
            }
            Err(_) => {
                let cfg = Self::default();
                cfg.save_at(path)?;
                Ok(cfg)
            }
        }
    }

    /// Persist to disk.
    pub fn save(&self) -> Result<()> {
        self.save_at(&Self::path()?)
    }

    pub fn save_at(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        std::fs::write(path, content).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key and persist.
    ///
    /// Unknown keys and unparseable values are rejected, as are session
    /// values outside their domain (menu durations, catalog techniques).
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json)?;
        updated.validate()?;
        *self = updated;
        self.save()?;
        Ok(())
    }

    /// Check the session settings against their domains.
    pub fn validate(&self) -> Result<()> {
        self.session_config().map(|_| ())
    }

    /// Build the configured session, resolving the technique id against
    /// the catalog.
    pub fn session_config(&self) -> Result<SessionConfig> {
        validate_duration_secs(self.session.duration_secs)?;
        let technique = technique::find(&self.session.technique)
            .ok_or_else(|| ConfigError::InvalidValue {
                key: "session.technique".into(),
                message: format!("unknown technique '{}'", self.session.technique),
            })?;
        Ok(SessionConfig::new(technique, self.session.duration_secs)?)
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }
}

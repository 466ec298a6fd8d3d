//! TOML-based application configuration.
//!
//! Stores:
//! - Device transport settings (simulate or remote, calibration)
//! - Physical caps that session requests are clamped to
//! - Content locations (motif banks, narrative lines)
//! - The fixed patterns used by the scripted story steps
//!
//! Configuration is stored at `~/.config/sedusa/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::data_dir;
use crate::device::{DeviceMode, HandySettings};
use crate::error::ConfigError;
use crate::story::{Caps, StorySettings};

/// Device transport configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    #[serde(default = "default_mode")]
    pub mode: DeviceMode,
    #[serde(default = "default_true")]
    pub log_device: bool,
    #[serde(default = "default_timeout_s")]
    pub timeout_s: u64,
    #[serde(default = "default_calibration")]
    pub speed_calibration_factor: f64,
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

/// Content file locations. Relative paths resolve against the config directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentConfig {
    #[serde(default = "default_motif_banks")]
    pub motif_banks: Vec<PathBuf>,
    #[serde(default = "default_narrative")]
    pub narrative: Option<PathBuf>,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/sedusa/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub device: DeviceConfig,
    #[serde(default)]
    pub caps: Caps,
    #[serde(default)]
    pub content: ContentConfig,
    #[serde(default)]
    pub story: StorySettings,
}

// Default functions
fn default_mode() -> DeviceMode {
    DeviceMode::Simulate
}
fn default_true() -> bool {
    true
}
fn default_timeout_s() -> u64 {
    5
}
fn default_calibration() -> f64 {
    2.8
}
fn default_base_url() -> String {
    HandySettings::default().base_url
}
fn default_motif_banks() -> Vec<PathBuf> {
    vec![PathBuf::from("motifs.json")]
}
fn default_narrative() -> Option<PathBuf> {
    Some(PathBuf::from("narrative.json"))
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            mode: default_mode(),
            log_device: true,
            timeout_s: default_timeout_s(),
            speed_calibration_factor: default_calibration(),
            base_url: default_base_url(),
        }
    }
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            motif_banks: default_motif_banks(),
            narrative: default_narrative(),
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
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value
                            .parse::<bool>()
                            .map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => {
                        if let Ok(n) = value.parse::<u64>() {
                            serde_json::Value::Number(n.into())
                        } else if let Ok(n) = value.parse::<f64>() {
                            serde_json::Number::from_f64(n)
                                .map(serde_json::Value::Number)
                                .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?
                        } else {
                            return Err(invalid(format!("cannot parse '{value}' as number")));
                        }
                    }
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    /// Default location of the config file.
    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the default location, writing defaults if the file is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => Ok(toml::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist to the default location.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
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

    /// Set a config value by key, keeping the existing value's type.
    /// Does not persist; call [`save`](Self::save) afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value cannot be parsed.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Device client settings; the API key never lives in the config file.
    pub fn handy_settings(&self, api_key: Option<String>) -> HandySettings {
        HandySettings {
            mode: self.device.mode,
            api_key: api_key.unwrap_or_default(),
            base_url: self.device.base_url.clone(),
            timeout: Duration::from_secs(self.device.timeout_s),
            log_device: self.device.log_device,
            speed_calibration_factor: self.device.speed_calibration_factor,
        }
    }

    /// Motif bank paths with relative entries resolved against `base`.
    pub fn motif_bank_paths(&self, base: &Path) -> Vec<PathBuf> {
        self.content.motif_banks.iter().map(|p| base.join(p)).collect()
    }

    pub fn narrative_path(&self, base: &Path) -> Option<PathBuf> {
        self.content.narrative.as_ref().map(|p| base.join(p))
    }
}

//! TOML-based application configuration.
//!
//! Stores the tunable engine parameters:
//! - Timing profile (production 24h/48h, fast 5s/15s, or custom windows)
//! - Artificial processing delay held by the in-flight guard
//! - UTC offset used to turn check-in instants into calendar dates
//!
//! Configuration is stored at `<data dir>/config.toml`.

use chrono::{Duration, FixedOffset};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::ConfigError;
use crate::gate::CooldownGate;

/// Which pair of gate durations to use
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimingProfile {
    /// 24h cooldown, 48h reset
    #[default]
    Production,
    /// 5s cooldown, 15s reset
    Fast,
    /// `custom_cooldown_secs` / `custom_reset_secs`
    Custom,
}

/// Gate and processing timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConfig {
    #[serde(default)]
    pub profile: TimingProfile,
    #[serde(default = "default_custom_cooldown_secs")]
    pub custom_cooldown_secs: u64,
    #[serde(default = "default_custom_reset_secs")]
    pub custom_reset_secs: u64,
    #[serde(default = "default_processing_delay_ms")]
    pub processing_delay_ms: u64,
    #[serde(default)]
    pub utc_offset_minutes: i32,
}

/// Application configuration.
///
/// Serialized to/from TOML at `<data dir>/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub timing: TimingConfig,
}

// Default functions
fn default_custom_cooldown_secs() -> u64 {
    24 * 60 * 60
}
fn default_custom_reset_secs() -> u64 {
    48 * 60 * 60
}
fn default_processing_delay_ms() -> u64 {
    600
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            profile: TimingProfile::Production,
            custom_cooldown_secs: default_custom_cooldown_secs(),
            custom_reset_secs: default_custom_reset_secs(),
            processing_delay_ms: default_processing_delay_ms(),
            utc_offset_minutes: 0,
        }
    }
}

impl TimingConfig {
    /// Build the cooldown gate for the selected profile.
    ///
    /// # Errors
    /// Returns `InvalidConfiguration` when the custom windows are not
    /// `0 < cooldown < reset`.
    pub fn gate(&self) -> Result<CooldownGate, ConfigError> {
        match self.profile {
            TimingProfile::Production => Ok(CooldownGate::production()),
            TimingProfile::Fast => Ok(CooldownGate::fast()),
            TimingProfile::Custom => {
                let cooldown = secs_to_duration("timing.custom_cooldown_secs", self.custom_cooldown_secs)?;
                let reset = secs_to_duration("timing.custom_reset_secs", self.custom_reset_secs)?;
                CooldownGate::new(cooldown, reset)
            }
        }
    }

    /// Offset used for calendar dates.
    ///
    /// # Errors
    /// Returns `InvalidValue` for offsets of a day or more.
    pub fn utc_offset(&self) -> Result<FixedOffset, ConfigError> {
        FixedOffset::east_opt(self.utc_offset_minutes.saturating_mul(60)).ok_or_else(|| {
            ConfigError::InvalidValue {
                key: "timing.utc_offset_minutes".into(),
                message: format!("{} is not a valid UTC offset", self.utc_offset_minutes),
            }
        })
    }

    pub fn processing_delay(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.processing_delay_ms)
    }
}

fn secs_to_duration(key: &str, secs: u64) -> Result<Duration, ConfigError> {
    i64::try_from(secs)
        .ok()
        .and_then(Duration::try_seconds)
        .ok_or_else(|| ConfigError::InvalidValue {
            key: key.into(),
            message: format!("{secs} seconds is out of range"),
        })
}

impl Config {
    fn lookup_path<'a>(
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

    fn assign_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() || key.is_empty() {
            return Err(ConfigError::UnknownKey(key.to_string()));
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                let obj = current
                    .as_object_mut()
                    .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
                let existing = obj
                    .get(part)
                    .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value
                            .parse::<bool>()
                            .map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => {
                        if let Ok(n) = value.parse::<u64>() {
                            serde_json::Value::Number(n.into())
                        } else if let Ok(n) = value.parse::<i64>() {
                            serde_json::Value::Number(n.into())
                        } else {
                            return Err(invalid(format!("cannot parse '{value}' as an integer")));
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

            current = current
                .get_mut(part)
                .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
        }

        Err(ConfigError::UnknownKey(key.to_string()))
    }

    fn collect_leaf_keys(prefix: &str, value: &serde_json::Value, out: &mut Vec<String>) {
        match value.as_object() {
            Some(obj) => {
                for (k, v) in obj {
                    let path = if prefix.is_empty() {
                        k.clone()
                    } else {
                        format!("{prefix}.{k}")
                    };
                    Self::collect_leaf_keys(&path, v, out);
                }
            }
            None => out.push(prefix.to_string()),
        }
    }

    /// Location of the config file.
    ///
    /// # Errors
    /// Returns an error if the data directory cannot be created.
    pub fn path() -> Result<PathBuf, ConfigError> {
        data_dir()
            .map(|dir| dir.join("config.toml"))
            .map_err(|e| ConfigError::LoadFailed {
                path: PathBuf::from("config.toml"),
                message: e.to_string(),
            })
    }

    /// Load from disk or return (and write) the default.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from an explicit path; a missing file yields the default, which
    /// is written back.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config =
                    toml::from_str(&content).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
                Ok(cfg)
            }
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

    /// Persist to disk.
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
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::lookup_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a value in memory by dot-separated key, then validate the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the resulting configuration is invalid.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json =
            serde_json::to_value(&*self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Self::assign_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// All dot-separated keys with their current values, sorted.
    pub fn entries(&self) -> Vec<(String, String)> {
        let Ok(json) = serde_json::to_value(self) else {
            return Vec::new();
        };
        let mut keys = Vec::new();
        Self::collect_leaf_keys("", &json, &mut keys);
        keys.sort();
        keys.into_iter()
            .filter_map(|k| self.get(&k).map(|v| (k, v)))
            .collect()
    }

    /// Check that the configuration can build an engine.
    ///
    /// # Errors
    /// Returns the first invalid setting found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.timing.gate()?;
        self.timing.utc_offset()?;
        Ok(())
    }
}

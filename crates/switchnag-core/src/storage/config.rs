//! TOML-based application configuration.
//!
//! Stores:
//! - Reminder cadence, anger threshold, per-mood durations
//! - Punitive and manual cooldown lengths, expiry poll interval
//! - Network interface name and toggle backend
//! - Notification app name and "next thing" choices
//!
//! Configuration is stored at `~/.config/switchnag/config.toml`. Runtime
//! state (anger, cooldowns) is never persisted.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::data_dir;
use crate::error::ConfigError;
use crate::escalation::{EscalationPolicy, PresentationDurations};
use crate::network::NetworkBackend;

/// Reminder cadence and escalation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderConfig {
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    #[serde(default = "default_anger_threshold")]
    pub anger_threshold: u32,
    #[serde(default)]
    pub durations: DurationsConfig,
}

/// How long each mood stays on screen, in seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurationsConfig {
    #[serde(default = "default_neutral_secs")]
    pub neutral_secs: u64,
    /// 0 keeps the urgent reminder up until dismissed.
    #[serde(default)]
    pub angry_secs: u64,
    #[serde(default = "default_disabled_secs")]
    pub disabled_secs: u64,
}

/// Cooldown lengths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CooldownConfig {
    #[serde(default = "default_duration_on_anger_secs")]
    pub duration_on_anger_secs: u64,
    /// Short manual cooldown; the long one is three times this.
    #[serde(default = "default_duration_on_manual_secs")]
    pub duration_on_manual_secs: u64,
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
}

/// Which interface to toggle and how.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    #[serde(default = "default_interface")]
    pub interface: String,
    #[serde(default)]
    pub backend: NetworkBackend,
}

/// Notification configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationsConfig {
    #[serde(default = "default_app_name")]
    pub app_name: String,
    /// Offered as "next thing" answers on desktop notifications.
    #[serde(default = "default_choices")]
    pub choices: Vec<String>,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/switchnag/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub reminder: ReminderConfig,
    #[serde(default)]
    pub cooldown: CooldownConfig,
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub notifications: NotificationsConfig,
}

// Default functions
fn default_interval_secs() -> u64 {
    10
}
fn default_anger_threshold() -> u32 {
    10
}
fn default_neutral_secs() -> u64 {
    1200
}
fn default_disabled_secs() -> u64 {
    2400
}
fn default_duration_on_anger_secs() -> u64 {
    40 * 60
}
fn default_duration_on_manual_secs() -> u64 {
    20 * 60
}
fn default_poll_interval_secs() -> u64 {
    5
}
fn default_interface() -> String {
    "Wi-Fi".into()
}
fn default_app_name() -> String {
    "Time to Switch!".into()
}
fn default_choices() -> Vec<String> {
    vec!["Stretch".into(), "Inbox".into(), "Next task".into()]
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            anger_threshold: default_anger_threshold(),
            durations: DurationsConfig::default(),
        }
    }
}

impl Default for DurationsConfig {
    fn default() -> Self {
        Self {
            neutral_secs: default_neutral_secs(),
            angry_secs: 0,
            disabled_secs: default_disabled_secs(),
        }
    }
}

impl Default for CooldownConfig {
    fn default() -> Self {
        Self {
            duration_on_anger_secs: default_duration_on_anger_secs(),
            duration_on_manual_secs: default_duration_on_manual_secs(),
            poll_interval_secs: default_poll_interval_secs(),
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            interface: default_interface(),
            backend: NetworkBackend::default(),
        }
    }
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            app_name: default_app_name(),
            choices: default_choices(),
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

        let (parent_path, leaf) = match key.rsplit_once('.') {
            Some((parent, leaf)) => (Some(parent), leaf),
            None => (None, key),
        };
        if leaf.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        if let Some(parent_path) = parent_path {
            for part in parent_path.split('.') {
                current = current.get_mut(part).ok_or_else(unknown)?;
            }
        }

        let obj = current.as_object_mut().ok_or_else(unknown)?;
        let existing = obj.get(leaf).ok_or_else(unknown)?;

        let new_value = match existing {
            serde_json::Value::Bool(_) => serde_json::Value::Bool(
                value
                    .parse::<bool>()
                    .map_err(|e| invalid(e.to_string()))?,
            ),
            serde_json::Value::Number(_) => {
                let n = value
                    .parse::<u64>()
                    .map_err(|_| invalid(format!("cannot parse '{value}' as a whole number")))?;
                serde_json::Value::Number(n.into())
            }
            serde_json::Value::Object(_) => return Err(unknown()),
            serde_json::Value::Array(_) => {
                serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
            }
            _ => serde_json::Value::String(value.into()),
        };

        obj.insert(leaf.to_string(), new_value);
        Ok(())
    }

    /// Default location of the config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the config directory cannot be created.
    pub fn path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("~/.config/switchnag"),
            message: e.to_string(),
        })?;
        Ok(dir.join("config.toml"))
    }

    /// Load from the default location, writing defaults if the file is
    /// missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from `path`, writing defaults there if it does not exist.
    ///
    /// # Errors
    ///
    /// See [`Config::load`].
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config =
                    toml::from_str(&content).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
                cfg.validate()?;
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                tracing::info!(path = %path.display(), "wrote default configuration");
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

    /// Persist to `path`.
    ///
    /// # Errors
    ///
    /// See [`Config::save`].
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

    /// Set a leaf value by dot-separated key, keeping its type. The result
    /// is validated but not saved.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the resulting config is invalid.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json =
            serde_json::to_value(&*self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config =
            serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns the first value that would make the nudger misbehave.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("reminder.interval_secs", self.reminder.interval_secs),
            ("reminder.anger_threshold", u64::from(self.reminder.anger_threshold)),
            ("cooldown.duration_on_anger_secs", self.cooldown.duration_on_anger_secs),
            ("cooldown.duration_on_manual_secs", self.cooldown.duration_on_manual_secs),
            ("cooldown.poll_interval_secs", self.cooldown.poll_interval_secs),
        ];
        for (key, value) in positive {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    message: "must be greater than zero".into(),
                });
            }
        }
        if self.network.interface.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "network.interface".into(),
                message: "must not be empty".into(),
            });
        }
        Ok(())
    }

    pub fn policy(&self) -> EscalationPolicy {
        let durations = &self.reminder.durations;
        EscalationPolicy {
            anger_threshold: self.reminder.anger_threshold,
            duration_on_anger_secs: self.cooldown.duration_on_anger_secs,
            duration_on_manual_secs: self.cooldown.duration_on_manual_secs,
            reminder_interval: Duration::from_secs(self.reminder.interval_secs),
            poll_interval: Duration::from_secs(self.cooldown.poll_interval_secs),
            durations: PresentationDurations {
                neutral: Duration::from_secs(durations.neutral_secs),
                angry: Duration::from_secs(durations.angry_secs),
                disabled: Duration::from_secs(durations.disabled_secs),
            },
        }
    }
}

//! TOML-based user settings.
//!
//! Stores user preferences including:
//! - Long-break cadence and interval lengths
//! - Auto-start, mute and sound choice
//! - Dark mode (presentation only)
//! - Today's completion counts
//!
//! Settings are stored at `<data dir>/settings.toml`.

use serde::{Deserialize, Serialize};

use crate::daily::DailyCounts;
use crate::error::ConfigError;
use crate::timer::{check_long_break_interval, DurationConfig};

/// Top-level keys maintained by the engine rather than the user.
const READ_ONLY_KEYS: &[&str] = &["dailyCounts"];

/// Application settings.
///
/// Every field has a serde default so that partially written documents
/// still load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default = "default_long_break_interval")]
    pub long_break_interval: u32,
    #[serde(default)]
    pub auto_start: bool,
    #[serde(default)]
    pub muted: bool,
    #[serde(default = "default_sound_choice")]
    pub sound_choice: String,
    #[serde(default)]
    pub dark_mode: bool,
    #[serde(default)]
    pub durations: DurationConfig,
    #[serde(default)]
    pub daily_counts: DailyCounts,
}

fn default_long_break_interval() -> u32 {
    4
}
fn default_sound_choice() -> String {
    "default".into()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            long_break_interval: default_long_break_interval(),
            auto_start: false,
            muted: false,
            sound_choice: default_sound_choice(),
            dark_mode: false,
            durations: DurationConfig::default(),
            daily_counts: DailyCounts::default(),
        }
    }
}

impl Settings {
    /// Replace out-of-range values with their defaults.
    pub fn sanitized(mut self) -> Self {
        if check_long_break_interval(self.long_break_interval).is_err() {
            self.long_break_interval = default_long_break_interval();
        }
        self.durations = self.durations.sanitized();
        self
    }

    /// Check every ranged value.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidValue`] naming the first offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_long_break_interval(self.long_break_interval).map_err(|e| {
            ConfigError::InvalidValue {
                key: "longBreakInterval".into(),
                message: e.to_string(),
            }
        })?;
        self.durations
            .validate()
            .map_err(|e| ConfigError::InvalidValue {
                key: "durations".into(),
                message: e.to_string(),
            })
    }

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
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value
                            .parse::<bool>()
                            .map_err(|e| invalid(format!("'{value}': {e}")))?,
                    ),
                    serde_json::Value::Number(_) => serde_json::Value::Number(
                        value
                            .parse::<u32>()
                            .map_err(|e| invalid(format!("'{value}': {e}")))?
                            .into(),
                    ),
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        return Err(invalid("key names a section, not a value".into()));
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

    /// Get a settings value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a value by dot-separated key. On error nothing changes.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or read-only, the value cannot
    /// be parsed, or the result is out of range.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let top = key.split('.').next().unwrap_or_default();
        if READ_ONLY_KEYS.contains(&top) {
            return Err(ConfigError::ReadOnly(key.to_string()));
        }

        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let next: Settings =
            serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            })?;
        next.validate()?;
        *self = next;
        Ok(())
    }
}

//! TOML-based application configuration.
//!
//! Stores operator preferences:
//! - Site identity shown on the placeholder
//! - Countdown durations and display highlight
//! - Celebration palette and hint timing
//! - Keyboard shortcuts for the gate
//!
//! Configuration is stored at `<data_dir>/config.toml`.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::data_dir;
use crate::celebrate::DEFAULT_PALETTE;
use crate::error::ConfigError;
use crate::input::KeyChord;

/// Site identity shown on the placeholder page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default)]
    pub organizer: String,
}

/// Countdown durations and display behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountdownConfig {
    /// Full launch countdown, in minutes.
    #[serde(default = "default_launch_minutes")]
    pub launch_minutes: u32,
    /// Quick demo countdown, in seconds.
    #[serde(default = "default_demo_seconds")]
    pub demo_seconds: u32,
    /// On-stage short countdown, in seconds.
    #[serde(default = "default_stage_seconds")]
    pub stage_seconds: u32,
    /// Highlight the display during the last N seconds.
    #[serde(default = "default_highlight_seconds")]
    pub highlight_seconds: u32,
}

/// Celebration effect configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CelebrationConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_palette")]
    pub palette: Vec<String>,
    /// How long the post-reveal hint stays visible, in seconds.
    #[serde(default = "default_hint_seconds")]
    pub hint_seconds: u32,
}

/// Keyboard shortcuts for the gate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShortcutsConfig {
    /// Operator override chord, recognized only while locked.
    #[serde(default = "default_reveal_chord")]
    pub reveal: String,
    /// Decorative celebration key, recognized only while unlocked.
    #[serde(default = "default_celebrate_key")]
    pub celebrate: String,
}

/// Application configuration.
///
/// Serialized to/from TOML at `<data_dir>/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub countdown: CountdownConfig,
    #[serde(default)]
    pub celebration: CelebrationConfig,
    #[serde(default)]
    pub shortcuts: ShortcutsConfig,
}

// Default functions
fn default_title() -> String {
    "Launch Night".into()
}
fn default_launch_minutes() -> u32 {
    15
}
fn default_demo_seconds() -> u32 {
    10
}
fn default_stage_seconds() -> u32 {
    3
}
fn default_highlight_seconds() -> u32 {
    3
}
fn default_hint_seconds() -> u32 {
    10
}
fn default_true() -> bool {
    true
}
fn default_palette() -> Vec<String> {
    DEFAULT_PALETTE.iter().map(|c| (*c).to_string()).collect()
}
fn default_reveal_chord() -> String {
    "ctrl+alt+i".into()
}
fn default_celebrate_key() -> String {
    "space".into()
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            organizer: String::new(),
        }
    }
}

impl Default for CountdownConfig {
    fn default() -> Self {
        Self {
            launch_minutes: default_launch_minutes(),
            demo_seconds: default_demo_seconds(),
            stage_seconds: default_stage_seconds(),
            highlight_seconds: default_highlight_seconds(),
        }
    }
}

impl Default for CelebrationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            palette: default_palette(),
            hint_seconds: default_hint_seconds(),
        }
    }
}

impl Default for ShortcutsConfig {
    fn default() -> Self {
        Self {
            reveal: default_reveal_chord(),
            celebrate: default_celebrate_key(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            site: SiteConfig::default(),
            countdown: CountdownConfig::default(),
            celebration: CelebrationConfig::default(),
            shortcuts: ShortcutsConfig::default(),
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
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() {
            return Err(ConfigError::UnknownKey(key.to_string()));
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
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
                        } else if let Ok(n) = value.parse::<f64>() {
                            serde_json::Number::from_f64(n)
                                .map(serde_json::Value::Number)
                                .ok_or_else(|| {
                                    invalid(format!("cannot parse '{value}' as number"))
                                })?
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

            current = current
                .get_mut(part)
                .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
        }

        Err(ConfigError::UnknownKey(key.to_string()))
    }

    /// Absolute path of the config file.
    ///
    /// # Errors
    /// Returns an error if the data directory cannot be created.
    pub fn path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("<data dir>"),
            message: e.to_string(),
        })?;
        Ok(dir.join("config.toml"))
    }

    /// Load from disk or return default.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path,
                message: e.to_string(),
            }),
            Err(_) => {
                let cfg = Self::default();
                cfg.save()?;
                Ok(cfg)
            }
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::path()?;
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, content).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
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

    /// Set a config value by key and persist.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the config cannot be saved.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        self.save()?;
        Ok(())
    }

    // ── Typed accessors ──────────────────────────────────────────────

    pub fn launch_duration(&self) -> Duration {
        Duration::minutes(i64::from(self.countdown.launch_minutes))
    }

    pub fn demo_duration(&self) -> Duration {
        Duration::seconds(i64::from(self.countdown.demo_seconds))
    }

    pub fn stage_duration(&self) -> Duration {
        Duration::seconds(i64::from(self.countdown.stage_seconds))
    }

    /// The operator override chord, falling back to the default when the
    /// configured string is malformed.
    pub fn reveal_chord(&self) -> KeyChord {
        KeyChord::parse(&self.shortcuts.reveal).unwrap_or_else(|_| KeyChord::reveal_default())
    }

    /// The decorative celebration key, with the same fallback behavior.
    pub fn celebrate_chord(&self) -> KeyChord {
        KeyChord::parse(&self.shortcuts.celebrate)
            .unwrap_or_else(|_| KeyChord::celebrate_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.countdown.launch_minutes, 15);
        assert_eq!(parsed.countdown.demo_seconds, 10);
        assert_eq!(parsed.celebration.hint_seconds, 10);
        assert_eq!(parsed.shortcuts.reveal, "ctrl+alt+i");
    }

    #[test]
    fn empty_toml_fills_defaults() {
        let parsed: Config = toml::from_str("").unwrap();
        assert_eq!(parsed.countdown.launch_minutes, 15);
        assert_eq!(parsed.celebration.palette.len(), 4);
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("countdown.launch_minutes").as_deref(), Some("15"));
        assert_eq!(cfg.get("celebration.enabled").as_deref(), Some("true"));
        assert_eq!(cfg.get("shortcuts.celebrate").as_deref(), Some("space"));
        assert!(cfg.get("countdown.missing_key").is_none());
    }

    #[test]
    fn set_json_value_by_path_updates_nested_number() {
        let mut json = serde_json::to_value(Config::default()).unwrap();
        Config::set_json_value_by_path(&mut json, "countdown.demo_seconds", "20").unwrap();
        assert_eq!(
            Config::get_json_value_by_path(&json, "countdown.demo_seconds").unwrap(),
            &serde_json::Value::Number(20.into())
        );
    }

    #[test]
    fn set_json_value_by_path_rejects_unknown_key() {
        let mut json = serde_json::to_value(Config::default()).unwrap();
        let result = Config::set_json_value_by_path(&mut json, "countdown.nonexistent", "1");
        assert!(matches!(result, Err(ConfigError::UnknownKey(_))));
    }

    #[test]
    fn set_json_value_by_path_rejects_invalid_type() {
        let mut json = serde_json::to_value(Config::default()).unwrap();
        let result = Config::set_json_value_by_path(&mut json, "celebration.enabled", "not_a_bool");
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn typed_durations_match_sections() {
        let cfg = Config::default();
        assert_eq!(cfg.launch_duration(), Duration::minutes(15));
        assert_eq!(cfg.demo_duration(), Duration::seconds(10));
        assert_eq!(cfg.stage_duration(), Duration::seconds(3));
    }

    #[test]
    fn malformed_chord_falls_back_to_default() {
        let mut cfg = Config::default();
        cfg.shortcuts.reveal = "hyper+q".into();
        assert_eq!(cfg.reveal_chord(), KeyChord::reveal_default());

        cfg.shortcuts.reveal = "ctrl+shift+l".into();
        assert_eq!(cfg.reveal_chord(), KeyChord::parse("ctrl+shift+l").unwrap());
    }
}

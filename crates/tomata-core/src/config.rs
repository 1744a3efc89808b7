//! TOML-based application configuration.
//!
//! Stores user preferences for the session clock (phase durations, metronome)
//! and sound output. Configuration is stored at `~/.config/tomata/config.toml`;
//! set `TOMATA_CONFIG_DIR` to use a different directory.
//!
//! Timer settings and the playback volume are bounded. Setters clamp to the
//! allowed range and never fail; out-of-range values read from disk are
//! clamped on load.

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::path::PathBuf;

use crate::error::ConfigError;

/// Allowed work phase length, in minutes.
pub const WORK_MINUTES: RangeInclusive<u32> = 1..=60;
/// Allowed short break length, in minutes.
pub const SHORT_BREAK_MINUTES: RangeInclusive<u32> = 1..=30;
/// Allowed long break length, in minutes.
pub const LONG_BREAK_MINUTES: RangeInclusive<u32> = 5..=30;
/// Allowed metronome tick spacing, in seconds.
pub const METRONOME_INTERVAL_SECS: RangeInclusive<f64> = 0.3..=2.0;
/// Allowed playback volume, linear percent.
pub const VOLUME: RangeInclusive<u32> = 0..=100;

/// Session clock configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimerConfig {
    #[serde(default = "default_work_minutes")]
    pub work_minutes: u32,
    #[serde(default = "default_short_break_minutes")]
    pub short_break_minutes: u32,
    #[serde(default = "default_long_break_minutes")]
    pub long_break_minutes: u32,
    #[serde(default)]
    pub metronome_enabled: bool,
    #[serde(default = "default_metronome_interval")]
    pub metronome_interval_secs: f64,
}

/// Sound output configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SoundConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Linear playback volume, 0-100.
    #[serde(default = "default_volume")]
    pub volume: u32,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/tomata/config.toml`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub timer: TimerConfig,
    #[serde(default)]
    pub sound: SoundConfig,
}

// Default functions
fn default_work_minutes() -> u32 {
    25
}
fn default_short_break_minutes() -> u32 {
    5
}
fn default_long_break_minutes() -> u32 {
    15
}
fn default_metronome_interval() -> f64 {
    1.0
}
fn default_true() -> bool {
    true
}
fn default_volume() -> u32 {
    80
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            work_minutes: default_work_minutes(),
            short_break_minutes: default_short_break_minutes(),
            long_break_minutes: default_long_break_minutes(),
            metronome_enabled: false,
            metronome_interval_secs: default_metronome_interval(),
        }
    }
}

impl Default for SoundConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            volume: default_volume(),
        }
    }
}

impl TimerConfig {
    /// Set the work phase length, saturating to the allowed range.
    pub fn set_work_minutes(&mut self, minutes: u32) {
        self.work_minutes = minutes.clamp(*WORK_MINUTES.start(), *WORK_MINUTES.end());
    }

    /// Set the short break length, saturating to the allowed range.
    pub fn set_short_break_minutes(&mut self, minutes: u32) {
        self.short_break_minutes =
            minutes.clamp(*SHORT_BREAK_MINUTES.start(), *SHORT_BREAK_MINUTES.end());
    }

    /// Set the long break length, saturating to the allowed range.
    pub fn set_long_break_minutes(&mut self, minutes: u32) {
        self.long_break_minutes =
            minutes.clamp(*LONG_BREAK_MINUTES.start(), *LONG_BREAK_MINUTES.end());
    }

    pub fn set_metronome_enabled(&mut self, enabled: bool) {
        self.metronome_enabled = enabled;
    }

    /// Set the metronome tick spacing, saturating to the allowed range.
    /// Non-finite values fall back to the default spacing.
    pub fn set_metronome_interval_secs(&mut self, secs: f64) {
        let secs = if secs.is_finite() {
            secs
        } else {
            default_metronome_interval()
        };
        self.metronome_interval_secs = secs.clamp(
            *METRONOME_INTERVAL_SECS.start(),
            *METRONOME_INTERVAL_SECS.end(),
        );
    }

    /// Return a copy with every field forced into its allowed range.
    ///
    /// Applied after deserializing, since hand-edited config files can carry
    /// out-of-range values.
    pub fn clamped(mut self) -> Self {
        let copy = self;
        self.set_work_minutes(copy.work_minutes);
        self.set_short_break_minutes(copy.short_break_minutes);
        self.set_long_break_minutes(copy.long_break_minutes);
        self.set_metronome_interval_secs(copy.metronome_interval_secs);
        self
    }
}

impl SoundConfig {
    /// Set the playback volume, saturating to the allowed range.
    pub fn set_volume(&mut self, volume: u32) {
        self.volume = volume.clamp(*VOLUME.start(), *VOLUME.end());
    }

    /// Return a copy with every field forced into its allowed range.
    pub fn clamped(mut self) -> Self {
        let copy = self;
        self.set_volume(copy.volume);
        self
    }
}

/// Returns the configuration directory, creating it if needed.
///
/// `~/.config/tomata/` unless `TOMATA_CONFIG_DIR` is set.
///
/// # Errors
/// Returns an error if the home directory cannot be determined or if
/// creating the directory fails.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("TOMATA_CONFIG_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => dirs::home_dir()
            .ok_or(ConfigError::NoConfigDir)?
            .join(".config")
            .join("tomata"),
    };
    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::LoadFailed {
        path: dir.clone(),
        message: e.to_string(),
    })?;
    Ok(dir)
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
        let bad_value = || ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => {
                        serde_json::Value::Bool(value.parse::<bool>().map_err(|_| bad_value())?)
                    }
                    serde_json::Value::Number(_) => {
                        if let Ok(n) = value.parse::<u64>() {
                            serde_json::Value::Number(n.into())
                        } else if let Ok(n) = value.parse::<f64>() {
                            serde_json::Number::from_f64(n)
                                .map(serde_json::Value::Number)
                                .ok_or_else(bad_value)?
                        } else {
                            return Err(bad_value());
                        }
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

    fn path() -> Result<PathBuf, ConfigError> {
        Ok(config_dir()?.join("config.toml"))
    }

    /// Load from disk or, when no file exists yet, write and return defaults.
    ///
    /// Settings are clamped into their allowed ranges after parsing.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be read or
    /// parsed, or if the default config cannot be written to disk. Only a
    /// missing file triggers the write-defaults path; other read failures
    /// must not overwrite an existing file.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                let mut cfg: Config =
                    toml::from_str(&content).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
                cfg.timer = cfg.timer.clamped();
                cfg.sound = cfg.sound.clamped();
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save()?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path,
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
        let path = Self::path()?;
        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        std::fs::write(&path, content).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
        })
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

    /// Set a config value by key and persist. Returns error if key is unknown.
    ///
    /// Bounded values land clamped, matching the setter behavior.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the config cannot be saved.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        self.timer = self.timer.clamped();
        self.sound = self.sound.clamped();
        self.save()?;
        Ok(())
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }
}

//! Core error types for tomata-core.
//!
//! Range violations on timer settings are never errors -- setters clamp and
//! saturate. The variants here cover construction-time preconditions and the
//! I/O edges (config file, audio backend), keeping the per-poll `advance`
//! path free of fallible operations.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for tomata-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Audio playback errors
    #[error("Audio error: {0}")]
    Audio(#[from] AudioError),

    /// Synthesis precondition violations
    #[error("Synthesis error: {0}")]
    Synth(#[from] SynthError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),

    /// Unknown dot-path key passed to get/set
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Value cannot be parsed as the existing type of the key
    #[error("Cannot parse '{value}' as a value for '{key}'")]
    InvalidValue { key: String, value: String },

    /// No home directory / config directory could be resolved
    #[error("Could not resolve a configuration directory")]
    NoConfigDir,
}

/// Audio playback errors.
///
/// A missing output device degrades playback to a logged no-op; these errors
/// never propagate into the session clock.
#[derive(Error, Debug)]
pub enum AudioError {
    /// No output device could be opened
    #[error("No audio output device available: {0}")]
    DeviceUnavailable(String),

    /// The audio engine thread has shut down
    #[error("Audio engine thread is not running")]
    EngineStopped,
}

/// Synthesis precondition violations, reported at construction time only.
#[derive(Error, Debug)]
pub enum SynthError {
    /// Sample rate of zero
    #[error("Sample rate must be greater than zero")]
    ZeroSampleRate,

    /// Frequency outside (0, inf)
    #[error("Frequency must be positive and finite, got {0}")]
    InvalidFrequency(f64),

    /// Duration outside (0, inf)
    #[error("Duration must be positive and finite, got {0}")]
    InvalidDuration(f64),

    /// A recipe with nothing to render
    #[error("Tone spec needs at least one {0}")]
    Empty(&'static str),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

//! # tomata core library
//!
//! Core logic for the tomata Pomodoro timer: a wall-clock-driven session
//! state machine and a procedural PCM synthesizer that generates the alarm
//! and metronome sounds instead of shipping audio assets. The CLI binary is
//! a thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Session clock**: a state machine advanced by the caller passing the
//!   current instant into [`SessionClock::advance`]; it returns events and
//!   performs no I/O, which keeps it trivially testable
//! - **Synthesizer**: pure `spec -> i16 buffer` rendering with seeded noise,
//!   plus WAV packing for export
//! - **Audio**: render-once sound bank and a fire-and-forget playback thread
//! - **Config**: TOML file with clamped, never-failing timer setters
//!
//! ## Key components
//!
//! - [`SessionClock`]: Pomodoro state machine
//! - [`Synthesizer`] / [`ToneSpec`]: tone recipes and rendering
//! - [`SoundBank`] / [`AudioEngine`]: playback
//! - [`Config`]: application configuration

pub mod audio;
pub mod clock;
pub mod config;
pub mod error;
pub mod events;
pub mod synth;

pub use audio::{AudioEngine, Sound, SoundBank};
pub use clock::{Phase, SessionClock, Snapshot};
pub use config::{Config, SoundConfig, TimerConfig};
pub use error::{AudioError, ConfigError, CoreError, SynthError};
pub use events::Event;
pub use synth::{Synthesizer, ToneSpec, DEFAULT_SAMPLE_RATE};

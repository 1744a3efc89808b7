//! Fire-and-forget playback of precomputed buffers.
//!
//! The session clock never touches audio. The CLI maps events to one of the
//! three buffers in a [`SoundBank`] and hands it to the [`AudioEngine`],
//! which queues it on a dedicated thread. A missing output device degrades
//! to a logged no-op without affecting timer behavior.

use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use std::thread;

use rodio::buffer::SamplesBuffer;
use rodio::{OutputStream, Sink};

use crate::error::AudioError;
use crate::synth::{Synthesizer, ToneSpec};

/// The three sounds the timer can make.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sound {
    /// Sustained tremolo tone, played when a work phase ends.
    WorkAlarm,
    /// Ascending arpeggio, played when a break ends.
    BreakAlarm,
    /// Short percussive tick.
    MetronomeTick,
}

/// Buffers rendered once and replayed on demand.
///
/// Immutable after construction; the `Arc` slices are shared freely with the
/// playback thread without synchronization.
#[derive(Debug, Clone)]
pub struct SoundBank {
    sample_rate: u32,
    work_alarm: Arc<[i16]>,
    break_alarm: Arc<[i16]>,
    tick: Arc<[i16]>,
}

impl SoundBank {
    /// Render the three preset recipes through `synth`.
    pub fn render(synth: &Synthesizer, tick_seed: u64) -> Self {
        Self {
            sample_rate: synth.sample_rate(),
            work_alarm: synth.render(&ToneSpec::work_alarm()).into(),
            break_alarm: synth.render(&ToneSpec::break_alarm()).into(),
            tick: synth.render(&ToneSpec::metronome_tick(tick_seed)).into(),
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn samples(&self, sound: Sound) -> Arc<[i16]> {
        match sound {
            Sound::WorkAlarm => Arc::clone(&self.work_alarm),
            Sound::BreakAlarm => Arc::clone(&self.break_alarm),
            Sound::MetronomeTick => Arc::clone(&self.tick),
        }
    }
}

enum AudioCommand {
    Play {
        samples: Arc<[i16]>,
        sample_rate: u32,
    },
    SetVolume(f32),
}

/// Handle to the playback thread.
///
/// The thread is spawned lazily on first use and owns the non-Send rodio
/// output objects. Every public method is non-blocking.
pub struct AudioEngine {
    tx: Mutex<Option<Sender<AudioCommand>>>,
}

impl Default for AudioEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioEngine {
    pub fn new() -> Self {
        Self {
            tx: Mutex::new(None),
        }
    }

    fn ensure_thread(&self) -> Result<Sender<AudioCommand>, AudioError> {
        let mut guard = self.tx.lock().map_err(|_| AudioError::EngineStopped)?;
        if let Some(tx) = guard.as_ref() {
            return Ok(tx.clone());
        }

        let (tx, rx) = mpsc::channel::<AudioCommand>();

        // Dedicated thread holding the non-Send output stream and sink.
        thread::Builder::new()
            .name("audio-engine".to_string())
            .spawn(move || {
                let mut _stream: Option<OutputStream> = None;
                let mut sink: Option<Sink> = None;
                let mut volume = 1.0f32;
                let mut warned = false;

                fn ensure_sink(
                    stream: &mut Option<OutputStream>,
                    sink: &mut Option<Sink>,
                ) -> Result<(), AudioError> {
                    if sink.is_none() {
                        let (s, handle) = OutputStream::try_default()
                            .map_err(|e| AudioError::DeviceUnavailable(e.to_string()))?;
                        let new_sink = Sink::try_new(&handle)
                            .map_err(|e| AudioError::DeviceUnavailable(e.to_string()))?;
                        *stream = Some(s);
                        *sink = Some(new_sink);
                    }
                    Ok(())
                }

                while let Ok(cmd) = rx.recv() {
                    match cmd {
                        AudioCommand::Play {
                            samples,
                            sample_rate,
                        } => match ensure_sink(&mut _stream, &mut sink) {
                            Ok(()) => {
                                if let Some(ref s) = sink {
                                    s.set_volume(volume);
                                    s.append(SamplesBuffer::new(1, sample_rate, samples.to_vec()));
                                }
                            }
                            Err(e) => {
                                // Degrade to silence; the timer does not care.
                                if !warned {
                                    log::warn!("audio playback disabled: {e}");
                                    warned = true;
                                }
                            }
                        },
                        AudioCommand::SetVolume(v) => {
                            volume = v.clamp(0.0, 1.0);
                            if let Some(ref s) = sink {
                                s.set_volume(volume);
                            }
                        }
                    }
                }
            })
            .map_err(|_| AudioError::EngineStopped)?;

        let tx_clone = tx.clone();
        *guard = Some(tx);
        Ok(tx_clone)
    }

    /// Queue a buffer for playback. Never blocks; failures are logged and
    /// the sound is dropped.
    pub fn play(&self, samples: Arc<[i16]>, sample_rate: u32) {
        match self.ensure_thread() {
            Ok(tx) => {
                if tx
                    .send(AudioCommand::Play {
                        samples,
                        sample_rate,
                    })
                    .is_err()
                {
                    log::warn!("audio engine thread is gone; dropping sound");
                }
            }
            Err(e) => log::warn!("audio engine unavailable: {e}"),
        }
    }

    /// Queue one of the precomputed sounds.
    pub fn play_sound(&self, bank: &SoundBank, sound: Sound) {
        self.play(bank.samples(sound), bank.sample_rate());
    }

    /// Set playback volume, clamped to [0, 1].
    pub fn set_volume(&self, volume: f32) {
        if let Ok(tx) = self.ensure_thread() {
            let _ = tx.send(AudioCommand::SetVolume(volume));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bank_buffers_have_expected_lengths() {
        let bank = SoundBank::render(&Synthesizer::default(), 0);
        assert_eq!(bank.sample_rate(), 44_100);
        assert_eq!(bank.samples(Sound::WorkAlarm).len(), 44_100);
        assert_eq!(bank.samples(Sound::MetronomeTick).len(), 3_528);
    }

    #[test]
    fn bank_buffers_are_shared_not_copied() {
        let bank = SoundBank::render(&Synthesizer::default(), 0);
        let a = bank.samples(Sound::BreakAlarm);
        let b = bank.samples(Sound::BreakAlarm);
        assert!(Arc::ptr_eq(&a, &b));
    }
}

//! Procedural tone synthesis.
//!
//! Produces short mono buffers of signed 16-bit PCM from closed-form recipes:
//! a sustained alarm with a slow tremolo, an ascending arpeggio with a
//! per-note fade, and a percussive metronome tick built from three
//! independently decaying layers. Rendering is pure -- the same spec and seed
//! always produce an identical buffer -- so the sounds are rendered once at
//! startup and replayed on demand.
//!
//! Parameter validation happens at spec construction, never inside
//! [`Synthesizer::render`].

pub mod wav;

use std::f64::consts::TAU;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::error::SynthError;

/// Reference sample rate, matching CD audio.
pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;

/// Raw waveform behind one percussive layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Generator {
    /// Pure sinusoid at the given frequency.
    Sine { freq_hz: f64 },
    /// Uniform noise in [-1, 1], resampled every sample.
    Noise,
}

/// One additive layer of a percussive recipe: a generator under an
/// exponential `exp(-t/tau)` envelope, mixed in at `weight`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layer {
    pub generator: Generator,
    pub tau_secs: f64,
    pub weight: f64,
}

/// A renderable tone recipe.
///
/// Use the validated constructors for user-supplied parameters; the preset
/// functions carry the reference constants.
#[derive(Debug, Clone, PartialEq)]
pub enum ToneSpec {
    /// `sin(2*pi*f*t)` under a `0.5*(1 + sin(2*pi*g*t))` amplitude envelope.
    Tremolo {
        freq_hz: f64,
        tremolo_hz: f64,
        duration_secs: f64,
    },
    /// Equal-length note segments. Each note holds full amplitude for the
    /// first 80% of its segment, then ramps linearly to silence.
    Arpeggio {
        freqs: Vec<f64>,
        duration_secs: f64,
        gain: f64,
    },
    /// Weighted sum of decaying layers, scaled by `gain` and hard-clipped
    /// before quantization. Noise layers draw from a PCG stream seeded with
    /// `seed`, keeping output reproducible.
    Percussive {
        layers: Vec<Layer>,
        duration_secs: f64,
        gain: f64,
        seed: u64,
    },
}

fn check_freq(freq_hz: f64) -> Result<(), SynthError> {
    if freq_hz.is_finite() && freq_hz > 0.0 {
        Ok(())
    } else {
        Err(SynthError::InvalidFrequency(freq_hz))
    }
}

fn check_duration(duration_secs: f64) -> Result<(), SynthError> {
    if duration_secs.is_finite() && duration_secs > 0.0 {
        Ok(())
    } else {
        Err(SynthError::InvalidDuration(duration_secs))
    }
}

impl ToneSpec {
    /// Validated sustained-tone recipe.
    pub fn tremolo(freq_hz: f64, tremolo_hz: f64, duration_secs: f64) -> Result<Self, SynthError> {
        check_freq(freq_hz)?;
        check_freq(tremolo_hz)?;
        check_duration(duration_secs)?;
        Ok(Self::Tremolo {
            freq_hz,
            tremolo_hz,
            duration_secs,
        })
    }

    /// Validated arpeggio recipe.
    pub fn arpeggio(freqs: Vec<f64>, duration_secs: f64, gain: f64) -> Result<Self, SynthError> {
        if freqs.is_empty() {
            return Err(SynthError::Empty("note"));
        }
        for &f in &freqs {
            check_freq(f)?;
        }
        check_duration(duration_secs)?;
        Ok(Self::Arpeggio {
            freqs,
            duration_secs,
            gain,
        })
    }

    /// Validated percussive recipe.
    pub fn percussive(
        layers: Vec<Layer>,
        duration_secs: f64,
        gain: f64,
        seed: u64,
    ) -> Result<Self, SynthError> {
        if layers.is_empty() {
            return Err(SynthError::Empty("layer"));
        }
        for layer in &layers {
            if let Generator::Sine { freq_hz } = layer.generator {
                check_freq(freq_hz)?;
            }
            check_duration(layer.tau_secs)?;
        }
        check_duration(duration_secs)?;
        Ok(Self::Percussive {
            layers,
            duration_secs,
            gain,
            seed,
        })
    }

    /// The work-end alarm: 880 Hz carrier under a 2 Hz tremolo, one second.
    pub fn work_alarm() -> Self {
        Self::Tremolo {
            freq_hz: 880.0,
            tremolo_hz: 2.0,
            duration_secs: 1.0,
        }
    }

    /// The break-end chord: ascending C5/E5/G5 major triad over two seconds.
    pub fn break_alarm() -> Self {
        Self::Arpeggio {
            freqs: vec![523.25, 659.25, 783.99],
            duration_secs: 2.0,
            gain: 0.7,
        }
    }

    /// The metronome tick: transient, tonal body and noise, each under its
    /// own exponential decay, 80 ms total.
    pub fn metronome_tick(seed: u64) -> Self {
        Self::Percussive {
            layers: vec![
                Layer {
                    generator: Generator::Sine { freq_hz: 3500.0 },
                    tau_secs: 0.004,
                    weight: 0.55,
                },
                Layer {
                    generator: Generator::Sine { freq_hz: 650.0 },
                    tau_secs: 0.018,
                    weight: 0.25,
                },
                Layer {
                    generator: Generator::Noise,
                    tau_secs: 0.010,
                    weight: 0.20,
                },
            ],
            duration_secs: 0.08,
            gain: 0.7,
            seed,
        }
    }
}

/// Renders [`ToneSpec`]s into mono i16 buffers at a fixed sample rate.
#[derive(Debug, Clone, Copy)]
pub struct Synthesizer {
    sample_rate: u32,
}

impl Default for Synthesizer {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
        }
    }
}

impl Synthesizer {
    /// Create a synthesizer at `sample_rate` Hz.
    ///
    /// # Errors
    /// Rejects a zero sample rate.
    pub fn new(sample_rate: u32) -> Result<Self, SynthError> {
        if sample_rate == 0 {
            return Err(SynthError::ZeroSampleRate);
        }
        Ok(Self { sample_rate })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Render a recipe to signed 16-bit samples. Pure and deterministic.
    pub fn render(&self, spec: &ToneSpec) -> Vec<i16> {
        match spec {
            ToneSpec::Tremolo {
                freq_hz,
                tremolo_hz,
                duration_secs,
            } => self.render_tremolo(*freq_hz, *tremolo_hz, *duration_secs),
            ToneSpec::Arpeggio {
                freqs,
                duration_secs,
                gain,
            } => self.render_arpeggio(freqs, *duration_secs, *gain),
            ToneSpec::Percussive {
                layers,
                duration_secs,
                gain,
                seed,
            } => self.render_percussive(layers, *duration_secs, *gain, *seed),
        }
    }

    fn render_tremolo(&self, freq_hz: f64, tremolo_hz: f64, duration_secs: f64) -> Vec<i16> {
        let rate = f64::from(self.sample_rate);
        let num_samples = (rate * duration_secs) as usize;
        (0..num_samples)
            .map(|i| {
                let t = i as f64 / rate;
                let carrier = (TAU * freq_hz * t).sin();
                let amplitude = 0.5 * (1.0 + (TAU * tremolo_hz * t).sin());
                quantize(carrier * amplitude)
            })
            .collect()
    }

    fn render_arpeggio(&self, freqs: &[f64], duration_secs: f64, gain: f64) -> Vec<i16> {
        // The validated constructor rejects an empty note list, but the
        // variant fields are public; stay total for hand-built specs.
        if freqs.is_empty() {
            return Vec::new();
        }
        let rate = f64::from(self.sample_rate);
        let num_samples = (rate * duration_secs) as usize;
        let note_len = num_samples / freqs.len();
        let mut out = Vec::with_capacity(note_len * freqs.len());

        for &freq_hz in freqs {
            for i in 0..note_len {
                let t = i as f64 / rate;
                let progress = i as f64 / note_len as f64;
                // Full amplitude for 80% of the note, linear fade after.
                let fade = if progress > 0.8 {
                    1.0 - (progress - 0.8) * 5.0
                } else {
                    1.0
                };
                out.push(quantize((TAU * freq_hz * t).sin() * fade * gain));
            }
        }
        out
    }

    fn render_percussive(
        &self,
        layers: &[Layer],
        duration_secs: f64,
        gain: f64,
        seed: u64,
    ) -> Vec<i16> {
        let rate = f64::from(self.sample_rate);
        let num_samples = (rate * duration_secs) as usize;
        let mut rng = Pcg32::seed_from_u64(seed);
        let mut out = Vec::with_capacity(num_samples);

        for i in 0..num_samples {
            let t = i as f64 / rate;
            let mut mix = 0.0;
            for layer in layers {
                let raw = match layer.generator {
                    Generator::Sine { freq_hz } => (TAU * freq_hz * t).sin(),
                    Generator::Noise => rng.gen_range(-1.0..=1.0),
                };
                mix += layer.weight * raw * (-t / layer.tau_secs).exp();
            }
            out.push(quantize(mix * gain));
        }
        out
    }
}

/// `round(clamp(x, -1, 1) * 32767)` as i16.
fn quantize(sample: f64) -> i16 {
    (sample.clamp(-1.0, 1.0) * 32767.0).round() as i16
}

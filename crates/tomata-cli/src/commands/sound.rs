use std::path::PathBuf;
use std::time::Duration;

use clap::{Subcommand, ValueEnum};
use tomata_core::synth::{wav, Synthesizer, ToneSpec};
use tomata_core::{AudioEngine, Config, Sound, SoundBank};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SoundName {
    /// Sustained work-end alarm tone
    Alarm,
    /// Ascending break-end arpeggio
    Chord,
    /// Metronome tick
    Tick,
}

#[derive(Subcommand)]
pub enum SoundAction {
    /// Render the three sounds and write them as WAV files
    Export {
        /// Output directory
        #[arg(long, default_value = ".")]
        dir: PathBuf,
        /// Sample rate in Hz
        #[arg(long, default_value = "44100")]
        sample_rate: u32,
        /// Seed for the tick's noise layer
        #[arg(long, default_value = "0")]
        seed: u64,
    },
    /// Play one sound through the audio backend
    Play {
        name: SoundName,
        /// Seed for the tick's noise layer
        #[arg(long, default_value = "0")]
        seed: u64,
    },
}

pub fn run(action: SoundAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        SoundAction::Export {
            dir,
            sample_rate,
            seed,
        } => {
            let synth = Synthesizer::new(sample_rate)?;
            std::fs::create_dir_all(&dir)?;
            let recipes = [
                ("alarm.wav", ToneSpec::work_alarm()),
                ("break.wav", ToneSpec::break_alarm()),
                ("tick.wav", ToneSpec::metronome_tick(seed)),
            ];
            for (file, spec) in recipes {
                let path = dir.join(file);
                wav::write_wav(&path, &synth.render(&spec), synth.sample_rate())?;
                println!("wrote {}", path.display());
            }
        }
        SoundAction::Play { name, seed } => {
            let config = Config::load_or_default();
            let bank = SoundBank::render(&Synthesizer::default(), seed);
            let engine = AudioEngine::new();
            engine.set_volume(config.sound.volume as f32 / 100.0);

            let sound = match name {
                SoundName::Alarm => Sound::WorkAlarm,
                SoundName::Chord => Sound::BreakAlarm,
                SoundName::Tick => Sound::MetronomeTick,
            };
            let secs = bank.samples(sound).len() as f64 / f64::from(bank.sample_rate());
            engine.play_sound(&bank, sound);
            // Playback is fire-and-forget; keep the process alive until the
            // queued buffer has drained.
            std::thread::sleep(Duration::from_secs_f64(secs + 0.2));
        }
    }
    Ok(())
}

//! The interactive timer loop.
//!
//! Polls the session clock at roughly 60 Hz and reacts to the events it
//! returns; one-second and metronome thresholds land within a frame of their
//! due time. Control is line-based on stdin so the loop itself never blocks:
//! a reader thread forwards lines over a channel.

use std::io::BufRead;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

use clap::Args;
use tomata_core::{
    AudioEngine, Config, Event, Phase, SessionClock, Sound, SoundBank, Synthesizer,
};

const FRAME: Duration = Duration::from_millis(16);

#[derive(Args)]
pub struct RunArgs {
    /// Work phase length in minutes (overrides config, clamped to 1-60)
    #[arg(long, value_name = "MINUTES")]
    work: Option<u32>,
    /// Short break length in minutes (clamped to 1-30)
    #[arg(long, value_name = "MINUTES")]
    short_break: Option<u32>,
    /// Long break length in minutes (clamped to 5-30)
    #[arg(long, value_name = "MINUTES")]
    long_break: Option<u32>,
    /// Enable the metronome with the given tick spacing in seconds
    /// (clamped to 0.3-2.0)
    #[arg(long, value_name = "SECS")]
    metronome: Option<f64>,
    /// Start the countdown immediately instead of paused
    #[arg(long)]
    autostart: bool,
    /// Disable sound output
    #[arg(long)]
    silent: bool,
}

enum Command {
    Start,
    Pause,
    Toggle,
    Reset,
    Status,
    Quit,
}

fn parse_command(line: &str) -> Option<Command> {
    match line.trim() {
        "start" | "s" => Some(Command::Start),
        "pause" | "p" => Some(Command::Pause),
        "toggle" | "t" | "" => Some(Command::Toggle),
        "reset" | "r" => Some(Command::Reset),
        "status" | "?" => Some(Command::Status),
        "quit" | "q" => Some(Command::Quit),
        _ => None,
    }
}

fn spawn_stdin_reader() -> Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::Builder::new()
        .name("stdin-reader".to_string())
        .spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                match line {
                    Ok(line) => {
                        if tx.send(line).is_err() {
                            break;
                        }
                    }
                    Err(_) => break,
                }
            }
        })
        .ok();
    rx
}

fn phase_label(phase: Phase) -> &'static str {
    match phase {
        Phase::Work => "work",
        Phase::ShortBreak => "short break",
        Phase::LongBreak => "long break",
    }
}

fn format_time(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

fn status_line(clock: &SessionClock) -> String {
    let snap = clock.snapshot();
    format!(
        "[{}] {} {} sessions: {}",
        phase_label(snap.phase),
        format_time(snap.remaining_seconds),
        if snap.running { "|>" } else { "||" },
        snap.session_count,
    )
}

pub fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = Config::load_or_default();
    if let Some(minutes) = args.work {
        config.timer.set_work_minutes(minutes);
    }
    if let Some(minutes) = args.short_break {
        config.timer.set_short_break_minutes(minutes);
    }
    if let Some(minutes) = args.long_break {
        config.timer.set_long_break_minutes(minutes);
    }
    if let Some(secs) = args.metronome {
        config.timer.set_metronome_enabled(true);
        config.timer.set_metronome_interval_secs(secs);
    }

    let sound_on = config.sound.enabled && !args.silent;
    let bank = SoundBank::render(&Synthesizer::default(), 0);
    let engine = AudioEngine::new();
    if sound_on {
        engine.set_volume(config.sound.volume as f32 / 100.0);
    }

    let mut clock = SessionClock::new(config.timer, Instant::now());
    if args.autostart {
        clock.start(Instant::now());
    }

    println!("commands: start pause toggle reset status quit");
    let stdin_rx = spawn_stdin_reader();
    let mut last_line = String::new();

    loop {
        let now = Instant::now();
        for event in clock.advance(now) {
            match &event {
                Event::ModeTransition { exited, .. } => {
                    if sound_on {
                        let sound = match exited {
                            Phase::Work => Sound::WorkAlarm,
                            Phase::ShortBreak | Phase::LongBreak => Sound::BreakAlarm,
                        };
                        engine.play_sound(&bank, sound);
                    }
                    println!("\n{}", serde_json::to_string(&event)?);
                }
                Event::MetronomeTick { .. } => {
                    if sound_on {
                        engine.play_sound(&bank, Sound::MetronomeTick);
                    }
                }
            }
        }

        match stdin_rx.try_recv() {
            Ok(line) => match parse_command(&line) {
                Some(Command::Start) => clock.start(Instant::now()),
                Some(Command::Pause) => clock.pause(),
                Some(Command::Toggle) => clock.toggle(Instant::now()),
                Some(Command::Reset) => clock.reset(Instant::now()),
                Some(Command::Status) => {
                    println!("\n{}", serde_json::to_string_pretty(&clock.snapshot())?);
                }
                Some(Command::Quit) => break,
                None => eprintln!("\nunknown command: {}", line.trim()),
            },
            Err(TryRecvError::Empty) => {}
            // stdin closed: keep running headless until interrupted.
            Err(TryRecvError::Disconnected) => {}
        }

        let line = status_line(&clock);
        if line != last_line {
            use std::io::Write;
            print!("\r{line}    ");
            std::io::stdout().flush()?;
            last_line = line;
        }

        thread::sleep(FRAME);
    }

    println!();
    Ok(())
}

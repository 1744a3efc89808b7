//! Pomodoro session clock.
//!
//! The clock is a wall-clock-based state machine. It does not use internal
//! threads -- the caller is responsible for calling [`SessionClock::advance`]
//! periodically (the CLI polls at roughly 60 Hz) and passing in the current
//! instant. Correctness does not depend on the poll rate: the countdown
//! decrements against real elapsed time, not per call.
//!
//! ## State transitions
//!
//! ```text
//! (Work, paused) -> start -> (Work, running) -> ... -> ModeTransition
//!                                                      -> (Break, paused)
//! ```
//!
//! Every 4th completed work phase routes to the long break; the clock lands
//! paused after each transition and waits for an explicit `start`/`toggle`.

use std::time::{Duration, Instant};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::config::TimerConfig;
use crate::events::Event;

/// One phase of the Pomodoro cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Work,
    ShortBreak,
    LongBreak,
}

/// Read-only view of the clock for presentation layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub phase: Phase,
    pub remaining_seconds: u32,
    pub running: bool,
    pub session_count: u32,
}

/// Pomodoro session state machine.
///
/// Created once at startup and mutated only through the four commands and
/// [`advance`](Self::advance). All time bases are injected `Instant`s so the
/// clock is deterministic under test.
#[derive(Debug, Clone)]
pub struct SessionClock {
    config: TimerConfig,
    phase: Phase,
    remaining_seconds: u32,
    running: bool,
    session_count: u32,
    /// Instant of the last one-second decrement.
    last_tick: Instant,
    /// Instant of the last metronome fire.
    last_metronome: Instant,
}

impl SessionClock {
    /// Create a clock in `(Work, paused)` with the configured durations.
    ///
    /// The config is clamped on the way in, so a hand-built out-of-range
    /// `TimerConfig` cannot produce an out-of-range countdown.
    pub fn new(config: TimerConfig, now: Instant) -> Self {
        let config = config.clamped();
        Self {
            config,
            phase: Phase::Work,
            remaining_seconds: config.work_minutes * 60,
            running: false,
            session_count: 0,
            last_tick: now,
            last_metronome: now,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    pub fn running(&self) -> bool {
        self.running
    }

    pub fn session_count(&self) -> u32 {
        self.session_count
    }

    pub fn config(&self) -> &TimerConfig {
        &self.config
    }

    /// Length of the current phase in seconds, for progress displays.
    pub fn phase_total_seconds(&self) -> u32 {
        self.phase_duration_seconds(self.phase)
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            phase: self.phase,
            remaining_seconds: self.remaining_seconds,
            running: self.running,
            session_count: self.session_count,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start the countdown.
    ///
    /// Re-seats both time bases to `now` so that time spent paused neither
    /// produces an immediate decrement nor a stale-interval metronome tick.
    pub fn start(&mut self, now: Instant) {
        self.running = true;
        self.last_tick = now;
        self.last_metronome = now;
    }

    /// Stop the countdown. Idempotent; no time-base reset is needed because
    /// `advance` is a no-op while paused.
    pub fn pause(&mut self) {
        self.running = false;
    }

    /// Return to a fresh `(Work, paused)` state with a zeroed session count.
    pub fn reset(&mut self, now: Instant) {
        self.running = false;
        self.phase = Phase::Work;
        self.remaining_seconds = self.config.work_minutes * 60;
        self.session_count = 0;
        self.last_tick = now;
        self.last_metronome = now;
    }

    /// Flip between running and paused.
    pub fn toggle(&mut self, now: Instant) {
        if self.running {
            self.pause();
        } else {
            self.start(now);
        }
    }

    // ── Configuration ────────────────────────────────────────────────
    //
    // Setters clamp and never fail. While paused in the edited phase the
    // displayed countdown is re-seated, matching how a settings panel is
    // expected to behave.

    pub fn set_work_minutes(&mut self, minutes: u32) {
        self.config.set_work_minutes(minutes);
        self.reseat_if_editing(Phase::Work);
    }

    pub fn set_short_break_minutes(&mut self, minutes: u32) {
        self.config.set_short_break_minutes(minutes);
        self.reseat_if_editing(Phase::ShortBreak);
    }

    pub fn set_long_break_minutes(&mut self, minutes: u32) {
        self.config.set_long_break_minutes(minutes);
        self.reseat_if_editing(Phase::LongBreak);
    }

    pub fn set_metronome_enabled(&mut self, enabled: bool) {
        self.config.set_metronome_enabled(enabled);
    }

    pub fn set_metronome_interval_secs(&mut self, secs: f64) {
        self.config.set_metronome_interval_secs(secs);
    }

    fn reseat_if_editing(&mut self, phase: Phase) {
        if self.phase == phase && !self.running {
            self.remaining_seconds = self.phase_duration_seconds(phase);
        }
    }

    // ── Polling ──────────────────────────────────────────────────────

    /// The per-poll operation. Call frequently (every frame); correct at any
    /// call rate.
    ///
    /// Decrements at most one second per call. A poll gap longer than one
    /// second therefore stretches the countdown rather than jumping it --
    /// drift is deliberately not caught up.
    ///
    /// `now` earlier than the stored time bases (clock skew) is treated as
    /// "not yet due": `saturating_duration_since` yields zero elapsed, so the
    /// countdown never underflows.
    ///
    /// Returns the events that came due. At most one `ModeTransition`, at
    /// most one `MetronomeTick`, never both.
    pub fn advance(&mut self, now: Instant) -> Vec<Event> {
        let mut events = Vec::new();
        if !self.running {
            return events;
        }

        if now.saturating_duration_since(self.last_tick) >= Duration::from_secs(1) {
            self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
            self.last_tick = now;

            if self.remaining_seconds == 0 {
                let exited = self.phase;
                self.switch_phase();
                self.last_tick = now;
                self.last_metronome = now;
                events.push(Event::ModeTransition {
                    exited,
                    entered: self.phase,
                    session_count: self.session_count,
                    at: Utc::now(),
                });
                return events;
            }
        }

        if self.phase == Phase::Work
            && self.config.metronome_enabled
            && now.saturating_duration_since(self.last_metronome).as_secs_f64()
                >= self.config.metronome_interval_secs
        {
            self.last_metronome = now;
            events.push(Event::MetronomeTick { at: Utc::now() });
        }

        events
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn phase_duration_seconds(&self, phase: Phase) -> u32 {
        let minutes = match phase {
            Phase::Work => self.config.work_minutes,
            Phase::ShortBreak => self.config.short_break_minutes,
            Phase::LongBreak => self.config.long_break_minutes,
        };
        minutes * 60
    }

    fn switch_phase(&mut self) {
        match self.phase {
            Phase::Work => {
                self.session_count += 1;
                self.phase = if self.session_count % 4 == 0 {
                    Phase::LongBreak
                } else {
                    Phase::ShortBreak
                };
            }
            Phase::ShortBreak | Phase::LongBreak => {
                self.phase = Phase::Work;
            }
        }
        self.remaining_seconds = self.phase_duration_seconds(self.phase);
        self.running = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clock() -> (SessionClock, Instant) {
        let t0 = Instant::now();
        (SessionClock::new(TimerConfig::default(), t0), t0)
    }

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    #[test]
    fn starts_paused_in_work() {
        let (clock, _) = clock();
        assert_eq!(clock.phase(), Phase::Work);
        assert!(!clock.running());
        assert_eq!(clock.remaining_seconds(), 25 * 60);
        assert_eq!(clock.session_count(), 0);
    }

    #[test]
    fn advance_is_noop_while_paused() {
        let (mut clock, t0) = clock();
        let before = clock.snapshot();
        assert!(clock.advance(t0 + secs(120)).is_empty());
        assert_eq!(clock.snapshot(), before);
    }

    #[test]
    fn decrements_once_per_elapsed_second() {
        let (mut clock, t0) = clock();
        clock.start(t0);
        for i in 1..=10 {
            let events = clock.advance(t0 + secs(i));
            assert!(events.is_empty());
            assert_eq!(clock.remaining_seconds(), 25 * 60 - i as u32);
        }
    }

    #[test]
    fn sub_second_polls_do_not_decrement() {
        let (mut clock, t0) = clock();
        clock.start(t0);
        // 59 polls at 16ms spacing stay under the one-second threshold.
        for i in 1..60u64 {
            clock.advance(t0 + Duration::from_millis(i * 16));
            assert_eq!(clock.remaining_seconds(), 25 * 60);
        }
        // The poll that crosses the boundary decrements exactly once.
        clock.advance(t0 + Duration::from_millis(1000));
        assert_eq!(clock.remaining_seconds(), 25 * 60 - 1);
    }

    #[test]
    fn advance_decrements_at_most_once_per_call() {
        // Deliberate behavior: a stall longer than one second is not caught
        // up. Five elapsed seconds in a single poll still cost one second.
        let (mut clock, t0) = clock();
        clock.start(t0);
        clock.advance(t0 + secs(5));
        assert_eq!(clock.remaining_seconds(), 25 * 60 - 1);
    }

    #[test]
    fn skewed_clock_does_not_decrement() {
        let (mut clock, t0) = clock();
        clock.start(t0 + secs(100));
        // `now` earlier than the time base: not yet due.
        assert!(clock.advance(t0).is_empty());
        assert_eq!(clock.remaining_seconds(), 25 * 60);
    }

    #[test]
    fn start_reseats_time_base_after_pause() {
        let (mut clock, t0) = clock();
        clock.start(t0);
        clock.advance(t0 + secs(1));
        assert_eq!(clock.remaining_seconds(), 25 * 60 - 1);
        clock.pause();
        // A long pause must not produce a decrement on resume.
        let resume_at = t0 + secs(500);
        clock.start(resume_at);
        assert!(clock.advance(resume_at + Duration::from_millis(900)).is_empty());
        assert_eq!(clock.remaining_seconds(), 25 * 60 - 1);
    }

    #[test]
    fn pause_is_idempotent() {
        let (mut clock, t0) = clock();
        clock.start(t0);
        clock.pause();
        let once = clock.snapshot();
        clock.pause();
        assert_eq!(clock.snapshot(), once);
    }

    #[test]
    fn toggle_flips_running() {
        let (mut clock, t0) = clock();
        clock.toggle(t0);
        assert!(clock.running());
        clock.toggle(t0);
        assert!(!clock.running());
    }

    fn run_phase_to_transition(clock: &mut SessionClock, t0: &mut Instant) -> Vec<Event> {
        clock.start(*t0);
        let total = clock.remaining_seconds() as u64;
        for i in 1..total {
            let events = clock.advance(*t0 + secs(i));
            assert!(!events.iter().any(|e| matches!(e, Event::ModeTransition { .. })));
        }
        let events = clock.advance(*t0 + secs(total));
        *t0 += secs(total);
        events
    }

    #[test]
    fn work_completion_routes_to_short_break() {
        let (mut clock, mut t) = clock();
        let events = run_phase_to_transition(&mut clock, &mut t);
        assert_eq!(events.len(), 1);
        match &events[0] {
            Event::ModeTransition {
                exited,
                entered,
                session_count,
                ..
            } => {
                assert_eq!(*exited, Phase::Work);
                assert_eq!(*entered, Phase::ShortBreak);
                assert_eq!(*session_count, 1);
            }
            other => panic!("expected ModeTransition, got {other:?}"),
        }
        assert!(!clock.running());
        assert_eq!(clock.phase(), Phase::ShortBreak);
        assert_eq!(clock.remaining_seconds(), 5 * 60);
        assert_eq!(clock.session_count(), 1);
    }

    #[test]
    fn break_completion_returns_to_work() {
        let (mut clock, mut t) = clock();
        run_phase_to_transition(&mut clock, &mut t);
        let events = run_phase_to_transition(&mut clock, &mut t);
        match &events[0] {
            Event::ModeTransition { exited, entered, session_count, .. } => {
                assert_eq!(*exited, Phase::ShortBreak);
                assert_eq!(*entered, Phase::Work);
                // Breaks do not bump the session count.
                assert_eq!(*session_count, 1);
            }
            other => panic!("expected ModeTransition, got {other:?}"),
        }
        assert_eq!(clock.remaining_seconds(), 25 * 60);
    }

    #[test]
    fn fourth_work_completion_routes_to_long_break() {
        let (mut clock, mut t) = clock();
        for expected in [Phase::ShortBreak, Phase::ShortBreak, Phase::ShortBreak] {
            run_phase_to_transition(&mut clock, &mut t); // work
            assert_eq!(clock.phase(), expected);
            run_phase_to_transition(&mut clock, &mut t); // break
        }
        run_phase_to_transition(&mut clock, &mut t); // 4th work
        assert_eq!(clock.phase(), Phase::LongBreak);
        assert_eq!(clock.session_count(), 4);
        assert_eq!(clock.remaining_seconds(), 15 * 60);
    }

    #[test]
    fn reset_returns_to_initial_state() {
        let (mut clock, mut t) = clock();
        run_phase_to_transition(&mut clock, &mut t);
        clock.reset(t);
        assert_eq!(clock.phase(), Phase::Work);
        assert_eq!(clock.remaining_seconds(), 25 * 60);
        assert_eq!(clock.session_count(), 0);
        assert!(!clock.running());
    }

    #[test]
    fn metronome_fires_on_interval_during_work() {
        let (mut clock, t0) = clock();
        clock.set_metronome_enabled(true);
        clock.set_metronome_interval_secs(0.5);
        clock.start(t0);

        assert!(clock.advance(t0 + Duration::from_millis(400)).is_empty());
        let events = clock.advance(t0 + Duration::from_millis(500));
        assert!(matches!(events.as_slice(), [Event::MetronomeTick { .. }]));
        // Interval restarts from the last fire.
        assert!(clock.advance(t0 + Duration::from_millis(900)).is_empty());
        assert!(!clock.advance(t0 + Duration::from_millis(1100)).is_empty());
    }

    #[test]
    fn metronome_silent_when_disabled_or_paused_or_on_break() {
        let (mut clock, mut t) = clock();
        clock.set_metronome_interval_secs(0.5);

        // Disabled.
        clock.start(t);
        assert!(clock.advance(t + Duration::from_millis(600)).is_empty());

        // Paused.
        clock.set_metronome_enabled(true);
        clock.pause();
        assert!(clock.advance(t + secs(5)).is_empty());

        // On break: run work to completion, then check no tick fires.
        run_phase_to_transition(&mut clock, &mut t);
        assert_eq!(clock.phase(), Phase::ShortBreak);
        clock.start(t);
        let events = clock.advance(t + Duration::from_millis(700));
        assert!(events.is_empty());
    }

    #[test]
    fn transition_poll_does_not_also_tick_metronome() {
        let (mut clock, t0) = clock();
        clock.set_metronome_enabled(true);
        clock.set_metronome_interval_secs(0.3);
        clock.set_work_minutes(1);
        clock.start(t0);
        for i in 1..60 {
            clock.advance(t0 + secs(i));
        }
        let events = clock.advance(t0 + secs(60));
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], Event::ModeTransition { .. }));
    }

    #[test]
    fn duration_edit_reseats_paused_matching_phase() {
        let (mut clock, t0) = clock();
        clock.set_work_minutes(40);
        assert_eq!(clock.remaining_seconds(), 40 * 60);

        // Running clock keeps its countdown.
        clock.start(t0);
        clock.advance(t0 + secs(1));
        clock.set_work_minutes(10);
        assert_eq!(clock.remaining_seconds(), 40 * 60 - 1);

        // Editing a different phase leaves the countdown alone.
        clock.pause();
        clock.set_long_break_minutes(20);
        assert_eq!(clock.remaining_seconds(), 40 * 60 - 1);
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Whatever the poll spacing, one call never costs more than one
            /// second and the countdown never underflows.
            #[test]
            fn advance_never_over_decrements(gaps in proptest::collection::vec(0u64..2500, 1..80)) {
                let t0 = Instant::now();
                let mut clock = SessionClock::new(TimerConfig::default(), t0);
                clock.start(t0);
                let mut now = t0;
                let mut prev = clock.remaining_seconds();
                for gap in gaps {
                    now += Duration::from_millis(gap);
                    clock.advance(now);
                    let cur = clock.remaining_seconds();
                    prop_assert!(prev.saturating_sub(cur) <= 1);
                    prev = cur;
                }
            }
        }
    }
}

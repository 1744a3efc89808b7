use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::clock::Phase;

/// Signals returned by [`SessionClock::advance`].
///
/// The clock performs no I/O of its own. The caller decides whether and how
/// to react -- typically by playing one of the precomputed buffers -- and a
/// dropped event never affects timer correctness.
///
/// [`SessionClock::advance`]: crate::clock::SessionClock::advance
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// A phase finished and the clock moved to the next one.
    ///
    /// Carries both sides of the transition so the handler can pick a sound
    /// without re-deriving the routing rule: exiting `Work` plays the
    /// sustained alarm, exiting a break plays the arpeggio.
    ModeTransition {
        exited: Phase,
        entered: Phase,
        session_count: u32,
        at: DateTime<Utc>,
    },
    /// A metronome tick came due during a running work phase.
    MetronomeTick { at: DateTime<Utc> },
}

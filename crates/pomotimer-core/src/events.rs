use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::{IntervalKind, TimerPhase};

/// Every state change in the engine produces an Event.
/// Engine commands return the events they caused, in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        state: IntervalKind,
        time_left_secs: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        state: IntervalKind,
        time_left_secs: u64,
        at: DateTime<Utc>,
    },
    TimerResumed {
        state: IntervalKind,
        time_left_secs: u64,
        at: DateTime<Utc>,
    },
    TimerReset {
        state: IntervalKind,
        time_left_secs: u64,
        at: DateTime<Utc>,
    },
    /// One second elapsed. A final tick with `time_left_secs == 0` precedes
    /// every completion.
    Tick {
        state: IntervalKind,
        time_left_secs: u64,
        at: DateTime<Utc>,
    },
    /// The countdown for `state` reached zero while running.
    TimerCompleted {
        state: IntervalKind,
        next: IntervalKind,
        at: DateTime<Utc>,
    },
    TimerSkipped {
        from: IntervalKind,
        to: IntervalKind,
        at: DateTime<Utc>,
    },
    /// The selected interval kind changed (after completion or skip).
    StateChanged {
        state: IntervalKind,
        time_left_secs: u64,
        at: DateTime<Utc>,
    },
    DurationChanged {
        kind: IntervalKind,
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        state: IntervalKind,
        phase: TimerPhase,
        time_left_secs: u64,
        total_secs: u64,
        progress: f64,
        work_cycle_count: u64,
        long_break_interval: u32,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// Interval kind and remaining seconds, for events that carry both.
    pub fn countdown(&self) -> Option<(IntervalKind, u64)> {
        match self {
            Event::TimerStarted {
                state,
                time_left_secs,
                ..
            }
            | Event::TimerPaused {
                state,
                time_left_secs,
                ..
            }
            | Event::TimerResumed {
                state,
                time_left_secs,
                ..
            }
            | Event::TimerReset {
                state,
                time_left_secs,
                ..
            }
            | Event::Tick {
                state,
                time_left_secs,
                ..
            }
            | Event::StateChanged {
                state,
                time_left_secs,
                ..
            }
            | Event::StateSnapshot {
                state,
                time_left_secs,
                ..
            } => Some((*state, *time_left_secs)),
            _ => None,
        }
    }
}

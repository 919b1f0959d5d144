//! Synchronous clock driver.

use super::engine::TimerEngine;
use crate::events::Event;

/// Delivers ticks on demand instead of in real time.
///
/// Each call answers the engine's outstanding tick request, exactly as a
/// real one-second timer would, so scripted runs and tests see the same
/// event stream a live session produces.
#[derive(Debug, Default)]
pub struct ManualClock {
    elapsed_secs: u64,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seconds delivered so far.
    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    /// Deliver up to `secs` ticks. Stops early once the engine no longer
    /// wants ticks (paused, idle, or the interval completed).
    pub fn advance(&mut self, engine: &mut TimerEngine, secs: u64) -> Vec<Event> {
        let mut events = Vec::new();
        for _ in 0..secs {
            let Some(request) = engine.pending_tick() else {
                break;
            };
            events.extend(engine.fire(request));
            self.elapsed_secs += 1;
        }
        events
    }
}

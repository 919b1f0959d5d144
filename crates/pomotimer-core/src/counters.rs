//! Completion counters keyed by interval kind.

use serde::{Deserialize, Serialize};

use crate::timer::IntervalKind;

/// One count per interval kind.
///
/// Used both for the in-memory session counters and for the persisted
/// all-time history document (`{"pomodoro": n, "short": n, "long": n}`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterSet {
    #[serde(default)]
    pub pomodoro: u64,
    #[serde(default)]
    pub short: u64,
    #[serde(default)]
    pub long: u64,
}

impl CounterSet {
    pub fn get(&self, kind: IntervalKind) -> u64 {
        match kind {
            IntervalKind::Work => self.pomodoro,
            IntervalKind::ShortBreak => self.short,
            IntervalKind::LongBreak => self.long,
        }
    }

    pub fn increment(&mut self, kind: IntervalKind) {
        let slot = self.slot(kind);
        *slot = slot.saturating_add(1);
    }

    /// Add `n` to `kind`, saturating.
    pub fn add(&mut self, kind: IntervalKind, n: u64) {
        let slot = self.slot(kind);
        *slot = slot.saturating_add(n);
    }

    /// Return the count for `kind` and zero it.
    pub fn take(&mut self, kind: IntervalKind) -> u64 {
        std::mem::take(self.slot(kind))
    }

    fn slot(&mut self, kind: IntervalKind) -> &mut u64 {
        match kind {
            IntervalKind::Work => &mut self.pomodoro,
            IntervalKind::ShortBreak => &mut self.short,
            IntervalKind::LongBreak => &mut self.long,
        }
    }
}

//! Notification and tray capabilities.
//!
//! Hosts pick one implementation of each trait at startup. The engine only
//! ever talks to the trait, and ignores delivery failures.

use crate::error::NotifyError;
use crate::events::Event;
use crate::timer::IntervalKind;

/// What a completion notification needs to say.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub completed: IntervalKind,
    pub next: IntervalKind,
    /// Length of the next interval in minutes.
    pub next_minutes: u32,
    pub work_cycle_count: u64,
    pub long_break_interval: u32,
    pub muted: bool,
    pub sound_choice: String,
}

impl Completion {
    /// A break just ended and the long-break cadence is back at its start.
    pub fn cycle_restarted(&self) -> bool {
        self.completed.is_break()
            && self.long_break_interval > 0
            && self.work_cycle_count % u64::from(self.long_break_interval) == 0
    }

    pub fn title(&self) -> &'static str {
        match (self.completed, self.next) {
            (IntervalKind::Work, IntervalKind::LongBreak) => "Long Break!",
            (IntervalKind::Work, _) => "Short Break!",
            _ if self.cycle_restarted() => "Pomodoro Cycle Restarted!",
            _ => "Time to get back to work!",
        }
    }

    pub fn message(&self) -> String {
        match (self.completed, self.next) {
            (IntervalKind::Work, IntervalKind::LongBreak) => format!(
                "Time for a long break! {} minutes of rest.",
                self.next_minutes
            ),
            (IntervalKind::Work, _) => format!(
                "Time for a short break! {} minutes of rest.",
                self.next_minutes
            ),
            _ if self.cycle_restarted() => "Back to work! Start your next Pomodoro.".to_string(),
            _ => "Time to get back to work!".to_string(),
        }
    }
}

/// Receives one call per completed interval.
pub trait NotificationSink {
    fn notify(&self, completion: &Completion) -> Result<(), NotifyError>;
}

/// Sink used when no notification backend is available.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl NotificationSink for NoopSink {
    fn notify(&self, _completion: &Completion) -> Result<(), NotifyError> {
        Ok(())
    }
}

/// Mirrors engine state somewhere persistent on screen (tray icon, title bar).
pub trait TraySink {
    fn update(&mut self, event: &Event);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTray;

impl TraySink for NoopTray {
    fn update(&mut self, _event: &Event) {}
}

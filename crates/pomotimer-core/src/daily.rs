//! Calendar-day completion counters.
//!
//! Daily counts live inside the settings document but are independent of the
//! all-time history. When the stored date is not today the counts are
//! discarded and restarted from zero; they are never folded into history.

use std::cell::Cell;
use std::rc::Rc;

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::storage::{PersistenceStore, Settings};
use crate::timer::IntervalKind;

/// Counts for a single calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyCounts {
    #[serde(default = "local_today")]
    pub date: NaiveDate,
    #[serde(default)]
    pub pomodoro: u64,
    #[serde(default)]
    pub short: u64,
    #[serde(default)]
    pub long: u64,
}

fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

impl Default for DailyCounts {
    fn default() -> Self {
        Self::fresh(local_today())
    }
}

impl DailyCounts {
    /// All-zero counts for `date`.
    pub fn fresh(date: NaiveDate) -> Self {
        Self {
            date,
            pomodoro: 0,
            short: 0,
            long: 0,
        }
    }

    fn increment(&mut self, kind: IntervalKind) {
        let slot = match kind {
            IntervalKind::Work => &mut self.pomodoro,
            IntervalKind::ShortBreak => &mut self.short,
            IntervalKind::LongBreak => &mut self.long,
        };
        *slot = slot.saturating_add(1);
    }
}

/// Where "today" comes from.
pub trait DateSource {
    fn today(&self) -> NaiveDate;
}

/// The host's local calendar date.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemDate;

impl DateSource for SystemDate {
    fn today(&self) -> NaiveDate {
        local_today()
    }
}

/// A settable date. Clones share the same underlying date, so a test can
/// keep a handle after moving one into a tracker.
#[derive(Debug, Clone)]
pub struct FixedDate(Rc<Cell<NaiveDate>>);

impl FixedDate {
    pub fn new(date: NaiveDate) -> Self {
        Self(Rc::new(Cell::new(date)))
    }

    pub fn set(&self, date: NaiveDate) {
        self.0.set(date);
    }

    pub fn advance_days(&self, days: u64) {
        let next = self
            .0
            .get()
            .checked_add_days(chrono::Days::new(days))
            .unwrap_or(NaiveDate::MAX);
        self.0.set(next);
    }
}

impl DateSource for FixedDate {
    fn today(&self) -> NaiveDate {
        self.0.get()
    }
}

/// Keeps [`DailyCounts`] pinned to the current date.
pub struct DailyCounterTracker {
    dates: Box<dyn DateSource>,
}

impl DailyCounterTracker {
    pub fn new(dates: impl DateSource + 'static) -> Self {
        Self {
            dates: Box::new(dates),
        }
    }

    /// Tracker reading the host's local date.
    pub fn system() -> Self {
        Self::new(SystemDate)
    }

    pub fn today(&self) -> NaiveDate {
        self.dates.today()
    }

    /// Restart the daily counts if their date is not today, saving settings
    /// when that happens. Returns whether a reset took place.
    pub fn check_daily_reset(&self, settings: &mut Settings, store: &PersistenceStore) -> bool {
        let today = self.today();
        if settings.daily_counts.date == today {
            return false;
        }
        info!(
            stale = %settings.daily_counts.date,
            today = %today,
            "daily counts rolled over"
        );
        settings.daily_counts = DailyCounts::fresh(today);
        store.save_settings(settings);
        true
    }

    /// Count one completion of `kind` for today and save settings.
    pub fn increment_daily(
        &self,
        settings: &mut Settings,
        kind: IntervalKind,
        store: &PersistenceStore,
    ) {
        self.check_daily_reset(settings, store);
        settings.daily_counts.increment(kind);
        store.save_settings(settings);
    }
}

impl Default for DailyCounterTracker {
    fn default() -> Self {
        Self::system()
    }
}

impl std::fmt::Debug for DailyCounterTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DailyCounterTracker")
            .field("today", &self.today())
            .finish()
    }
}

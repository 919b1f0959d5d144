//! Timer engine implementation.
//!
//! The timer engine is a tick-driven state machine. It never reads the wall
//! clock and spawns no threads: while running it holds one outstanding
//! [`TickRequest`], and the host's clock driver answers it by calling
//! [`TimerEngine::fire`] one second later.
//!
//! ## State Transitions
//!
//! ```text
//! (kind, Idle) -start-> (kind, Running) -pause-> (kind, Paused) -pause/resume-> (kind, Running)
//! (kind, *)    -reset-> (kind, Idle)
//! (kind, *)    -skip--> (next(kind), Idle)
//! (kind, Running) -tick to zero-> completion -> (next(kind), Idle | Running if auto-start)
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::open(store, Box::new(NoopSink));
//! engine.start();
//! // Once per second:
//! if let Some(request) = engine.pending_tick() {
//!     for event in engine.fire(request) { render(event) }
//! }
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

use super::interval::{check_long_break_interval, IntervalKind};
use crate::counters::CounterSet;
use crate::daily::{DailyCounterTracker, DailyCounts};
use crate::error::ValidationError;
use crate::events::Event;
use crate::notify::{Completion, NotificationSink};
use crate::storage::{PersistenceStore, Settings};

/// Sub-state of the selected interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerPhase {
    Idle,
    Running,
    Paused,
}

/// Handle for the single outstanding tick. Revoked by every command other
/// than a tick, so a driver holding an old request cannot fire it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TickRequest(u64);

/// Runtime countdown state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSession {
    pub state: IntervalKind,
    /// Seconds remaining, never above the current kind's duration.
    pub time_left: u64,
    pub running: bool,
    /// Only meaningful while `running`.
    pub paused: bool,
    /// Completed Work intervals, drives the long-break cadence.
    pub work_cycle_count: u64,
    pub long_break_interval: u32,
}

impl TimerSession {
    pub fn phase(&self) -> TimerPhase {
        match (self.running, self.paused) {
            (false, _) => TimerPhase::Idle,
            (true, false) => TimerPhase::Running,
            (true, true) => TimerPhase::Paused,
        }
    }
}

/// Core timer engine.
///
/// Owns the countdown, the session counters, and in-memory copies of the
/// history and settings documents. All commands must be issued from one
/// logical thread; the engine has no internal locking.
pub struct TimerEngine {
    session: TimerSession,
    counters: CounterSet,
    history: CounterSet,
    settings: Settings,
    store: PersistenceStore,
    tracker: DailyCounterTracker,
    sink: Box<dyn NotificationSink>,
    pending_tick: Option<TickRequest>,
    next_tick_id: u64,
}

impl TimerEngine {
    /// Create an engine from already loaded documents.
    ///
    /// Starts in `(Work, Idle)` with a full Work countdown.
    pub fn new(
        store: PersistenceStore,
        settings: Settings,
        history: CounterSet,
        sink: Box<dyn NotificationSink>,
    ) -> Self {
        let settings = settings.sanitized();
        let session = TimerSession {
            state: IntervalKind::Work,
            time_left: settings.durations.secs(IntervalKind::Work),
            running: false,
            paused: false,
            work_cycle_count: 0,
            long_break_interval: settings.long_break_interval,
        };
        Self {
            session,
            counters: CounterSet::default(),
            history,
            settings,
            store,
            tracker: DailyCounterTracker::system(),
            sink,
            pending_tick: None,
            next_tick_id: 0,
        }
    }

    /// Load history and settings from `store` and create an engine.
    pub fn open(store: PersistenceStore, sink: Box<dyn NotificationSink>) -> Self {
        let (history, settings) = store.load();
        Self::new(store, settings, history, sink)
    }

    /// Replace the daily tracker (tests use a fixed date).
    pub fn with_tracker(mut self, tracker: DailyCounterTracker) -> Self {
        self.tracker = tracker;
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn session(&self) -> &TimerSession {
        &self.session
    }

    pub fn state(&self) -> IntervalKind {
        self.session.state
    }

    pub fn phase(&self) -> TimerPhase {
        self.session.phase()
    }

    pub fn time_left(&self) -> u64 {
        self.session.time_left
    }

    pub fn work_cycle_count(&self) -> u64 {
        self.session.work_cycle_count
    }

    /// Configured length of `kind` in seconds.
    pub fn duration(&self, kind: IntervalKind) -> u64 {
        self.settings.durations.secs(kind)
    }

    /// Completions not yet flushed into history.
    pub fn session_counters(&self) -> &CounterSet {
        &self.counters
    }

    pub fn history(&self) -> &CounterSet {
        &self.history
    }

    /// Current settings. Daily counts are rolled over first if the date
    /// changed, like [`Self::daily_counts`].
    pub fn settings(&mut self) -> &Settings {
        self.tracker
            .check_daily_reset(&mut self.settings, &self.store);
        &self.settings
    }

    pub fn store(&self) -> &PersistenceStore {
        &self.store
    }

    /// Today's counts. Rolls the counts over first if the date changed.
    pub fn daily_counts(&mut self) -> DailyCounts {
        self.tracker
            .check_daily_reset(&mut self.settings, &self.store);
        self.settings.daily_counts
    }

    /// The outstanding tick request, if the countdown is running.
    pub fn pending_tick(&self) -> Option<TickRequest> {
        self.pending_tick
    }

    /// 0.0 .. 1.0 progress within the current interval.
    pub fn progress(&self) -> f64 {
        let total = self.duration(self.session.state);
        if total == 0 {
            return 0.0;
        }
        1.0 - (self.session.time_left as f64 / total as f64)
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            state: self.session.state,
            phase: self.phase(),
            time_left_secs: self.session.time_left,
            total_secs: self.duration(self.session.state),
            progress: self.progress(),
            work_cycle_count: self.session.work_cycle_count,
            long_break_interval: self.session.long_break_interval,
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Idle -> Running. No-op while running or paused.
    pub fn start(&mut self) -> Vec<Event> {
        if self.session.running {
            return Vec::new();
        }
        if self.session.time_left == 0 {
            self.session.time_left = self.duration(self.session.state);
        }
        self.session.running = true;
        self.session.paused = false;
        self.request_tick();
        debug!(state = ?self.session.state, time_left = self.session.time_left, "timer started");
        vec![Event::TimerStarted {
            state: self.session.state,
            time_left_secs: self.session.time_left,
            at: Utc::now(),
        }]
    }

    /// Running -> Paused, or Paused -> Running. No-op while idle.
    pub fn pause(&mut self) -> Vec<Event> {
        match self.phase() {
            TimerPhase::Running => {
                self.cancel_tick();
                self.session.paused = true;
                debug!(time_left = self.session.time_left, "timer paused");
                vec![Event::TimerPaused {
                    state: self.session.state,
                    time_left_secs: self.session.time_left,
                    at: Utc::now(),
                }]
            }
            TimerPhase::Paused => self.resume(),
            TimerPhase::Idle => Vec::new(),
        }
    }

    /// Paused -> Running. No-op otherwise.
    pub fn resume(&mut self) -> Vec<Event> {
        if self.phase() != TimerPhase::Paused {
            return Vec::new();
        }
        self.cancel_tick();
        self.session.paused = false;
        self.request_tick();
        debug!(time_left = self.session.time_left, "timer resumed");
        vec![Event::TimerResumed {
            state: self.session.state,
            time_left_secs: self.session.time_left,
            at: Utc::now(),
        }]
    }

    /// Stop and refill the current interval. Kind and counters are kept.
    pub fn reset(&mut self) -> Vec<Event> {
        self.cancel_tick();
        self.session.running = false;
        self.session.paused = false;
        self.session.time_left = self.duration(self.session.state);
        vec![Event::TimerReset {
            state: self.session.state,
            time_left_secs: self.session.time_left,
            at: Utc::now(),
        }]
    }

    /// Move to the next interval without crediting a completion.
    pub fn skip(&mut self) -> Vec<Event> {
        self.cancel_tick();
        self.session.running = false;
        self.session.paused = false;
        let from = self.session.state;
        let to = self.advance();
        debug!(?from, ?to, "interval skipped");
        let at = Utc::now();
        vec![
            Event::TimerSkipped { from, to, at },
            Event::StateChanged {
                state: to,
                time_left_secs: self.session.time_left,
                at,
            },
        ]
    }

    /// Count down one second. No-op unless running and not paused.
    pub fn tick(&mut self) -> Vec<Event> {
        if self.phase() != TimerPhase::Running {
            return Vec::new();
        }
        self.pending_tick = None;
        self.session.time_left = self.session.time_left.saturating_sub(1);

        let mut events = vec![Event::Tick {
            state: self.session.state,
            time_left_secs: self.session.time_left,
            at: Utc::now(),
        }];
        if self.session.time_left > 0 {
            self.request_tick();
        } else {
            self.session.running = false;
            events.extend(self.complete_cycle());
        }
        events
    }

    /// Deliver a tick for `request`. Requests that are no longer outstanding
    /// are ignored.
    pub fn fire(&mut self, request: TickRequest) -> Vec<Event> {
        if self.pending_tick != Some(request) {
            trace!(?request, "stale tick ignored");
            return Vec::new();
        }
        self.tick()
    }

    /// Change the length of `kind`. When `kind` is the selected interval the
    /// countdown restarts from the new length immediately, even mid-run.
    ///
    /// # Errors
    /// Returns [`ValidationError::DurationOutOfRange`]; nothing changes.
    pub fn set_duration(
        &mut self,
        kind: IntervalKind,
        minutes: u32,
    ) -> Result<Vec<Event>, ValidationError> {
        let duration_secs = self.settings.durations.set_minutes(kind, minutes)?;
        self.store.save_settings(&self.settings);

        let at = Utc::now();
        let mut events = vec![Event::DurationChanged {
            kind,
            duration_secs,
            at,
        }];
        if kind == self.session.state {
            let ticking = self.phase() == TimerPhase::Running;
            self.cancel_tick();
            self.session.time_left = duration_secs;
            if ticking {
                self.request_tick();
            }
            events.push(Event::Tick {
                state: kind,
                time_left_secs: duration_secs,
                at,
            });
        }
        Ok(events)
    }

    /// Set how many Work completions lead to a long break.
    ///
    /// # Errors
    /// Returns [`ValidationError::IntervalOutOfRange`] unless `2 <= n <= 12`.
    pub fn set_long_break_interval(&mut self, n: u32) -> Result<(), ValidationError> {
        check_long_break_interval(n)?;
        self.session.long_break_interval = n;
        self.settings.long_break_interval = n;
        self.store.save_settings(&self.settings);
        Ok(())
    }

    pub fn set_auto_start_next(&mut self, enabled: bool) {
        self.settings.auto_start = enabled;
        self.store.save_settings(&self.settings);
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.settings.muted = muted;
        self.store.save_settings(&self.settings);
    }

    pub fn set_sound_choice(&mut self, name: impl Into<String>) {
        self.settings.sound_choice = name.into();
        self.store.save_settings(&self.settings);
    }

    /// Presentation preference only.
    pub fn set_dark_mode(&mut self, enabled: bool) {
        self.settings.dark_mode = enabled;
        self.store.save_settings(&self.settings);
    }

    /// Flush pending counters and save settings before the host exits.
    pub fn shutdown(&mut self) {
        self.cancel_tick();
        self.store
            .flush_session_counters(&mut self.counters, &mut self.history);
        self.tracker
            .check_daily_reset(&mut self.settings, &self.store);
        self.store.save_settings(&self.settings);
        info!(history = ?self.history, "engine shut down");
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn request_tick(&mut self) {
        self.next_tick_id = self.next_tick_id.wrapping_add(1);
        self.pending_tick = Some(TickRequest(self.next_tick_id));
    }

    fn cancel_tick(&mut self) {
        self.pending_tick = None;
    }

    fn complete_cycle(&mut self) -> Vec<Event> {
        let completed = self.session.state;
        self.counters.increment(completed);
        self.tracker
            .increment_daily(&mut self.settings, completed, &self.store);
        self.store
            .flush_session_counters(&mut self.counters, &mut self.history);

        let (next, work_cycle_count) = self.next_interval();
        info!(?completed, ?next, cycles = work_cycle_count, "interval completed");

        let completion = Completion {
            completed,
            next,
            next_minutes: self.settings.durations.minutes(next),
            work_cycle_count,
            long_break_interval: self.session.long_break_interval,
            muted: self.settings.muted,
            sound_choice: self.settings.sound_choice.clone(),
        };
        if let Err(e) = self.sink.notify(&completion) {
            warn!(error = %e, "completion notification failed");
        }
        self.advance();

        let at = Utc::now();
        let mut events = vec![
            Event::TimerCompleted {
                state: completed,
                next,
                at,
            },
            Event::StateChanged {
                state: next,
                time_left_secs: self.session.time_left,
                at,
            },
        ];
        if self.settings.auto_start {
            events.extend(self.start());
        }
        events
    }

    /// The kind that follows the current one, and the Work cycle count once
    /// it is entered.
    fn next_interval(&self) -> (IntervalKind, u64) {
        let cycles = self.session.work_cycle_count;
        match self.session.state {
            IntervalKind::Work => {
                let cycles = cycles + 1;
                if cycles % u64::from(self.session.long_break_interval) == 0 {
                    (IntervalKind::LongBreak, cycles)
                } else {
                    (IntervalKind::ShortBreak, cycles)
                }
            }
            IntervalKind::ShortBreak | IntervalKind::LongBreak => (IntervalKind::Work, cycles),
        }
    }

    /// Apply the next-state rule and load the new kind's full duration.
    fn advance(&mut self) -> IntervalKind {
        let (next, cycles) = self.next_interval();
        self.session.work_cycle_count = cycles;
        self.session.state = next;
        self.session.time_left = self.duration(next);
        next
    }
}

impl std::fmt::Debug for TimerEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerEngine")
            .field("session", &self.session)
            .field("counters", &self.counters)
            .field("history", &self.history)
            .field("pending_tick", &self.pending_tick)
            .finish_non_exhaustive()
    }
}

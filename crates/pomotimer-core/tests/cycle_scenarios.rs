//! Integration tests for the interval cycle.
//!
//! Drives the engine through its public API with a manual clock, a fixed
//! date and a temp data directory, covering the standard four-pomodoro
//! cadence, skips, flushes and day rollover.

use std::cell::RefCell;
use std::rc::Rc;

use chrono::NaiveDate;
use pomotimer_core::{
    Completion, CounterSet, DailyCounterTracker, DailyCounts, Event, FixedDate, IntervalKind,
    ManualClock, NotificationSink, NotifyError, PersistenceStore, Settings, TimerEngine,
    TimerPhase,
};
use tempfile::TempDir;

#[derive(Clone, Default)]
struct Recorder(Rc<RefCell<Vec<Completion>>>);

impl NotificationSink for Recorder {
    fn notify(&self, completion: &Completion) -> Result<(), NotifyError> {
        self.0.borrow_mut().push(completion.clone());
        Ok(())
    }
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 17).unwrap()
}

struct Harness {
    _dir: TempDir,
    engine: TimerEngine,
    clock: ManualClock,
    dates: FixedDate,
    notified: Recorder,
}

fn harness_with(history: CounterSet, daily: DailyCounts) -> Harness {
    let dir = TempDir::new().unwrap();
    let store = PersistenceStore::at(dir.path());
    let settings = Settings {
        daily_counts: daily,
        ..Settings::default()
    };
    store.try_save_settings(&settings).unwrap();
    store.try_save_history(&history).unwrap();

    let dates = FixedDate::new(today());
    let notified = Recorder::default();
    let engine = TimerEngine::open(store, Box::new(notified.clone()))
        .with_tracker(DailyCounterTracker::new(dates.clone()));
    Harness {
        _dir: dir,
        engine,
        clock: ManualClock::new(),
        dates,
        notified,
    }
}

fn harness() -> Harness {
    harness_with(CounterSet::default(), DailyCounts::fresh(today()))
}

fn completions(events: &[Event]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, Event::TimerCompleted { .. }))
        .count()
}

#[test]
fn work_interval_completes_into_short_break() {
    let mut h = harness();
    h.engine.start();
    let events = h.clock.advance(&mut h.engine, 1500);

    assert_eq!(completions(&events), 1);
    assert_eq!(h.engine.history().pomodoro, 1);
    assert_eq!(h.engine.history().short, 0);
    assert_eq!(h.engine.work_cycle_count(), 1);
    assert_eq!(h.engine.state(), IntervalKind::ShortBreak);
    assert_eq!(h.engine.time_left(), 300);
    assert_eq!(h.engine.phase(), TimerPhase::Idle);
    assert!(events.iter().any(|e| matches!(
        e,
        Event::StateChanged {
            state: IntervalKind::ShortBreak,
            time_left_secs: 300,
            ..
        }
    )));
}

#[test]
fn fourth_work_completion_leads_to_long_break() {
    let mut h = harness();
    for round in 1..=4u64 {
        h.engine.start();
        h.clock.advance(&mut h.engine, 1500);
        assert_eq!(h.engine.work_cycle_count(), round);
        if round < 4 {
            assert_eq!(h.engine.state(), IntervalKind::ShortBreak);
            h.engine.start();
            h.clock.advance(&mut h.engine, 300);
            assert_eq!(h.engine.state(), IntervalKind::Work);
        }
    }

    assert_eq!(h.engine.state(), IntervalKind::LongBreak);
    assert_eq!(h.engine.time_left(), 2400);
    assert_eq!(h.engine.history().pomodoro, 4);
    assert_eq!(h.engine.history().short, 3);

    let titles: Vec<_> = h.notified.0.borrow().iter().map(|c| c.title()).collect();
    assert_eq!(titles.last(), Some(&"Long Break!"));
}

#[test]
fn skipping_a_running_break_credits_nothing() {
    let mut h = harness();
    h.engine.start();
    h.clock.advance(&mut h.engine, 1500);
    h.engine.start();
    h.clock.advance(&mut h.engine, 180);
    assert_eq!(h.engine.time_left(), 120);

    let history_before = *h.engine.history();
    let daily_before = h.engine.daily_counts();
    h.engine.skip();

    assert_eq!(h.engine.state(), IntervalKind::Work);
    assert_eq!(h.engine.time_left(), 1500);
    assert_eq!(h.engine.session_counters().short, 0);
    assert_eq!(h.engine.history(), &history_before);
    assert_eq!(h.engine.daily_counts(), daily_before);
    assert_eq!(h.notified.0.borrow().len(), 1);
}

#[test]
fn completion_adds_to_existing_history() {
    let mut h = harness_with(
        CounterSet {
            pomodoro: 2,
            short: 0,
            long: 0,
        },
        DailyCounts::fresh(today()),
    );
    h.engine.start();
    h.clock.advance(&mut h.engine, 1500);

    assert_eq!(h.engine.history().pomodoro, 3);
    assert_eq!(h.engine.session_counters().pomodoro, 0);
    assert_eq!(h.engine.store().load_history().pomodoro, 3);

    h.engine.shutdown();
    assert_eq!(h.engine.store().load_history().pomodoro, 3);
}

#[test]
fn yesterdays_counts_are_discarded_on_first_completion() {
    let yesterday = today().pred_opt().unwrap();
    let mut h = harness_with(
        CounterSet::default(),
        DailyCounts {
            date: yesterday,
            pomodoro: 5,
            short: 4,
            long: 1,
        },
    );
    h.engine.start();
    h.clock.advance(&mut h.engine, 1500);

    assert_eq!(
        h.engine.daily_counts(),
        DailyCounts {
            date: today(),
            pomodoro: 1,
            short: 0,
            long: 0,
        }
    );
    assert_eq!(h.engine.history().pomodoro, 1);
    assert_eq!(h.engine.history().short, 0);
    assert_eq!(h.engine.store().load_settings().daily_counts.pomodoro, 1);
}

#[test]
fn reading_daily_counts_after_midnight_rolls_over() {
    let mut h = harness();
    h.engine.start();
    h.clock.advance(&mut h.engine, 1500);
    assert_eq!(h.engine.daily_counts().pomodoro, 1);

    h.dates.advance_days(1);
    let counts = h.engine.daily_counts();
    assert_eq!(counts, DailyCounts::fresh(today().succ_opt().unwrap()));
    assert_eq!(h.engine.history().pomodoro, 1);
}

#[test]
fn shortening_a_running_break_applies_immediately() {
    let mut h = harness();
    h.engine.skip();
    h.engine.start();
    h.clock.advance(&mut h.engine, 50);
    assert_eq!(h.engine.time_left(), 250);

    h.engine.set_duration(IntervalKind::ShortBreak, 3).unwrap();
    assert_eq!(h.engine.time_left(), 180);
    assert_eq!(h.engine.phase(), TimerPhase::Running);

    h.clock.advance(&mut h.engine, 1);
    assert_eq!(h.engine.time_left(), 179);
}

#[test]
fn settings_changes_survive_restart() {
    let mut h = harness();
    h.engine.set_long_break_interval(3).unwrap();
    h.engine.set_muted(true);
    h.engine.set_auto_start_next(true);
    h.engine.set_duration(IntervalKind::Work, 45).unwrap();
    h.engine.shutdown();

    let store = h.engine.store().clone();
    let mut restored = TimerEngine::open(store, Box::new(Recorder::default()));
    assert_eq!(restored.session().long_break_interval, 3);
    assert!(restored.settings().muted);
    assert!(restored.settings().auto_start);
    assert_eq!(restored.time_left(), 45 * 60);
}

//! # Pomotimer Core Library
//!
//! This library provides the core logic for the Pomotimer work/break interval
//! timer. Front ends (the bundled CLI, or any other presentation layer) own a
//! single [`TimerEngine`], forward user commands to it and render the
//! [`Event`]s it returns.
//!
//! ## Architecture
//!
//! - **Timer Engine**: a tick-driven state machine. It never reads the wall
//!   clock; a clock driver calls [`TimerEngine::fire`] once per second while a
//!   tick request is outstanding
//! - **Counters**: per-session counts flushed into all-time history on every
//!   completion, plus calendar-day counts that reset at date change
//! - **Storage**: best-effort JSON history and TOML settings documents
//! - **Notifications**: capability traits with no-op defaults, selected once
//!   by the host
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: core timer state machine
//! - [`PersistenceStore`]: history and settings persistence
//! - [`DailyCounterTracker`]: calendar-day counters
//! - [`NotificationSink`]: completion notification capability

pub mod counters;
pub mod daily;
pub mod error;
pub mod events;
pub mod notify;
pub mod storage;
pub mod timer;

pub use counters::CounterSet;
pub use daily::{DailyCounterTracker, DailyCounts, DateSource, FixedDate, SystemDate};
pub use error::{ConfigError, CoreError, NotifyError, StorageError, ValidationError};
pub use events::Event;
pub use notify::{Completion, NoopSink, NoopTray, NotificationSink, TraySink};
pub use storage::{PersistenceStore, Settings};
pub use timer::{
    DurationConfig, IntervalKind, ManualClock, TickRequest, TimerEngine, TimerPhase, TimerSession,
};

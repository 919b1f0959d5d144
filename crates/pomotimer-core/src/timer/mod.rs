mod clock;
mod engine;
mod interval;

pub use clock::ManualClock;
pub use engine::{TickRequest, TimerEngine, TimerPhase, TimerSession};
pub(crate) use interval::check_long_break_interval;
pub use interval::{
    DurationConfig, IntervalKind, LONG_BREAK_INTERVAL_MAX, LONG_BREAK_INTERVAL_MIN,
};

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Fewest Work completions allowed between long breaks.
pub const LONG_BREAK_INTERVAL_MIN: u32 = 2;
/// Most Work completions allowed between long breaks.
pub const LONG_BREAK_INTERVAL_MAX: u32 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IntervalKind {
    #[serde(rename = "pomodoro")]
    Work,
    #[serde(rename = "short")]
    ShortBreak,
    #[serde(rename = "long")]
    LongBreak,
}

impl IntervalKind {
    pub const ALL: [IntervalKind; 3] = [
        IntervalKind::Work,
        IntervalKind::ShortBreak,
        IntervalKind::LongBreak,
    ];

    /// Key used in the persisted documents.
    pub fn key(self) -> &'static str {
        match self {
            IntervalKind::Work => "pomodoro",
            IntervalKind::ShortBreak => "short",
            IntervalKind::LongBreak => "long",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            IntervalKind::Work => "Pomodoro",
            IntervalKind::ShortBreak => "Short Break",
            IntervalKind::LongBreak => "Long Break",
        }
    }

    pub fn is_break(self) -> bool {
        !matches!(self, IntervalKind::Work)
    }

    /// Accepted duration in minutes.
    pub fn minute_range(self) -> RangeInclusive<u32> {
        match self {
            IntervalKind::Work => 25..=50,
            IntervalKind::ShortBreak => 3..=15,
            IntervalKind::LongBreak => 40..=120,
        }
    }

    pub fn default_minutes(self) -> u32 {
        match self {
            IntervalKind::Work => 25,
            IntervalKind::ShortBreak => 5,
            IntervalKind::LongBreak => 40,
        }
    }
}

impl fmt::Display for IntervalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for IntervalKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pomodoro" | "work" => Ok(IntervalKind::Work),
            "short" | "short-break" | "short_break" => Ok(IntervalKind::ShortBreak),
            "long" | "long-break" | "long_break" => Ok(IntervalKind::LongBreak),
            other => Err(format!(
                "unknown interval kind '{other}' (expected pomodoro, short or long)"
            )),
        }
    }
}

/// Per-kind interval lengths, stored in minutes.
///
/// The fields are only writable through [`DurationConfig::set_minutes`], which
/// enforces [`IntervalKind::minute_range`]. Values read back from disk go
/// through [`DurationConfig::sanitized`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurationConfig {
    #[serde(default = "default_work")]
    work: u32,
    #[serde(default = "default_short")]
    short: u32,
    #[serde(default = "default_long")]
    long: u32,
}

fn default_work() -> u32 {
    IntervalKind::Work.default_minutes()
}
fn default_short() -> u32 {
    IntervalKind::ShortBreak.default_minutes()
}
fn default_long() -> u32 {
    IntervalKind::LongBreak.default_minutes()
}

impl Default for DurationConfig {
    fn default() -> Self {
        Self {
            work: default_work(),
            short: default_short(),
            long: default_long(),
        }
    }
}

impl DurationConfig {
    pub fn minutes(&self, kind: IntervalKind) -> u32 {
        match kind {
            IntervalKind::Work => self.work,
            IntervalKind::ShortBreak => self.short,
            IntervalKind::LongBreak => self.long,
        }
    }

    pub fn secs(&self, kind: IntervalKind) -> u64 {
        u64::from(self.minutes(kind)) * 60
    }

    /// Store a new length for `kind`. Out-of-range values are rejected and
    /// the previous value kept. Returns the new length in seconds.
    pub fn set_minutes(&mut self, kind: IntervalKind, minutes: u32) -> Result<u64, ValidationError> {
        check_minutes(kind, minutes)?;
        *self.slot(kind) = minutes;
        Ok(self.secs(kind))
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        for kind in IntervalKind::ALL {
            check_minutes(kind, self.minutes(kind))?;
        }
        Ok(())
    }

    /// Replace every out-of-range value with that kind's default.
    pub fn sanitized(mut self) -> Self {
        for kind in IntervalKind::ALL {
            if check_minutes(kind, self.minutes(kind)).is_err() {
                *self.slot(kind) = kind.default_minutes();
            }
        }
        self
    }

    fn slot(&mut self, kind: IntervalKind) -> &mut u32 {
        match kind {
            IntervalKind::Work => &mut self.work,
            IntervalKind::ShortBreak => &mut self.short,
            IntervalKind::LongBreak => &mut self.long,
        }
    }
}

fn check_minutes(kind: IntervalKind, minutes: u32) -> Result<(), ValidationError> {
    let range = kind.minute_range();
    if range.contains(&minutes) {
        Ok(())
    } else {
        Err(ValidationError::DurationOutOfRange {
            kind,
            minutes,
            min: *range.start(),
            max: *range.end(),
        })
    }
}

pub(crate) fn check_long_break_interval(value: u32) -> Result<(), ValidationError> {
    if (LONG_BREAK_INTERVAL_MIN..=LONG_BREAK_INTERVAL_MAX).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::IntervalOutOfRange {
            value,
            min: LONG_BREAK_INTERVAL_MIN,
            max: LONG_BREAK_INTERVAL_MAX,
        })
    }
}

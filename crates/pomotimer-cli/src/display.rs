//! Terminal rendering of engine events.

use std::io::Write;

use pomotimer_core::{Event, IntervalKind, TraySink};

pub fn format_time(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

pub fn emoji(kind: IntervalKind) -> &'static str {
    match kind {
        IntervalKind::Work => "🍅",
        IntervalKind::ShortBreak => "🫐",
        IntervalKind::LongBreak => "🍌",
    }
}

/// Writes events to stdout, either as JSON lines or as a human status view,
/// and mirrors them into the tray.
pub struct View {
    json: bool,
    tray: Box<dyn TraySink>,
}

impl View {
    pub fn new(json: bool, tray: Box<dyn TraySink>) -> Self {
        Self { json, tray }
    }

    pub fn show(&mut self, events: &[Event]) {
        for event in events {
            self.tray.update(event);
            if self.json {
                match serde_json::to_string(event) {
                    Ok(line) => println!("{line}"),
                    Err(e) => tracing::warn!(error = %e, "event not serializable"),
                }
            } else {
                self.show_human(event);
            }
        }
    }

    pub fn notice(&self, message: &str) {
        if self.json {
            println!("{}", serde_json::json!({ "type": "Notice", "message": message }));
        } else {
            println!("\r{message}");
        }
    }

    fn show_human(&self, event: &Event) {
        match event {
            Event::Tick {
                state,
                time_left_secs,
                ..
            } => {
                print!("\r{} {} {}   ", emoji(*state), state, format_time(*time_left_secs));
                let _ = std::io::stdout().flush();
            }
            Event::TimerCompleted { state, next, .. } => {
                println!("\r{} {} complete, next: {}", emoji(*state), state, next);
            }
            Event::TimerSkipped { from, to, .. } => {
                println!("\r{from} skipped, next: {to}");
            }
            Event::DurationChanged {
                kind,
                duration_secs,
                ..
            } => {
                println!("\r{kind} is now {} minutes", duration_secs / 60);
            }
            Event::StateSnapshot {
                state,
                phase,
                time_left_secs,
                work_cycle_count,
                long_break_interval,
                ..
            } => {
                println!(
                    "\r{} {} {} ({:?}), pomodoros this run: {}, long break every {}",
                    emoji(*state),
                    state,
                    format_time(*time_left_secs),
                    phase,
                    work_cycle_count,
                    long_break_interval
                );
            }
            other => {
                if let Some((state, left)) = other.countdown() {
                    let verb = match other {
                        Event::TimerStarted { .. } => "started",
                        Event::TimerPaused { .. } => "paused",
                        Event::TimerResumed { .. } => "resumed",
                        Event::TimerReset { .. } => "reset",
                        _ => "ready",
                    };
                    println!("\r{} {} {} {}", emoji(state), state, verb, format_time(left));
                }
            }
        }
    }
}

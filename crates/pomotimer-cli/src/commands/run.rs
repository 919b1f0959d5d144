//! Interactive timer session.
//!
//! Owns the single engine for the life of the process. One current-thread
//! runtime multiplexes the tick deadline and stdin, so every engine call
//! happens on the same task.

use std::time::Duration;

use clap::Args;
use pomotimer_core::{Event, IntervalKind, PersistenceStore, TickRequest, TimerEngine};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::time::Instant;
use tracing::warn;

use super::CliResult;
use crate::display::View;
use crate::sinks;

const HELP: &str = "commands: start|s, pause|p, resume|r, reset, skip|n, \
duration <pomodoro|short|long> <minutes>, cadence <n>, auto on|off, mute on|off, \
sound <name>, dark on|off, status, help, quit|q";

#[derive(Args)]
pub struct RunArgs {
    /// Start the first interval immediately
    #[arg(long)]
    pub start: bool,
    /// Turn on auto-start of the next interval (saved to settings)
    #[arg(long)]
    pub auto_start: bool,
    /// Real-time length of one timer second, in milliseconds
    #[arg(long, default_value_t = 1000, value_parser = clap::value_parser!(u64).range(1..))]
    pub tick_ms: u64,
    /// Print events as JSON lines
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Start,
    Pause,
    Resume,
    Reset,
    Skip,
    Duration(IntervalKind, u32),
    Cadence(u32),
    AutoStart(bool),
    Mute(bool),
    Sound(String),
    Dark(bool),
    Status,
    Help,
    Quit,
}

fn parse_switch(word: Option<&str>) -> Result<bool, String> {
    match word {
        Some("on" | "true" | "yes") => Ok(true),
        Some("off" | "false" | "no") => Ok(false),
        Some(other) => Err(format!("expected on or off, got '{other}'")),
        None => Err("expected on or off".to_string()),
    }
}

fn parse_number(word: Option<&str>) -> Result<u32, String> {
    let word = word.ok_or("missing number")?;
    word.parse()
        .map_err(|_| format!("'{word}' is not a whole number"))
}

fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(None);
    };
    let command = match head.to_ascii_lowercase().as_str() {
        "start" | "s" => Command::Start,
        "pause" | "p" => Command::Pause,
        "resume" | "r" => Command::Resume,
        "reset" => Command::Reset,
        "skip" | "n" => Command::Skip,
        "duration" | "d" => {
            let kind = words.next().ok_or("missing interval kind")?.parse()?;
            Command::Duration(kind, parse_number(words.next())?)
        }
        "cadence" => Command::Cadence(parse_number(words.next())?),
        "auto" => Command::AutoStart(parse_switch(words.next())?),
        "mute" => Command::Mute(parse_switch(words.next())?),
        "sound" => {
            let name = words.collect::<Vec<_>>().join(" ");
            if name.is_empty() {
                return Err("missing sound name".to_string());
            }
            Command::Sound(name)
        }
        "dark" => Command::Dark(parse_switch(words.next())?),
        "status" => Command::Status,
        "help" | "?" => Command::Help,
        "quit" | "q" | "exit" => Command::Quit,
        other => return Err(format!("unknown command '{other}' (try help)")),
    };
    Ok(Some(command))
}

/// Applies a command; `Err` carries a message for the user.
fn apply(engine: &mut TimerEngine, command: Command) -> Result<Vec<Event>, String> {
    let events = match command {
        Command::Start => engine.start(),
        Command::Pause => engine.pause(),
        Command::Resume => engine.resume(),
        Command::Reset => engine.reset(),
        Command::Skip => engine.skip(),
        Command::Duration(kind, minutes) => {
            engine.set_duration(kind, minutes).map_err(|e| e.to_string())?
        }
        Command::Cadence(n) => {
            engine.set_long_break_interval(n).map_err(|e| e.to_string())?;
            vec![engine.snapshot()]
        }
        Command::AutoStart(enabled) => {
            engine.set_auto_start_next(enabled);
            Vec::new()
        }
        Command::Mute(muted) => {
            engine.set_muted(muted);
            Vec::new()
        }
        Command::Sound(name) => {
            engine.set_sound_choice(name);
            Vec::new()
        }
        Command::Dark(enabled) => {
            engine.set_dark_mode(enabled);
            Vec::new()
        }
        Command::Status => vec![engine.snapshot()],
        Command::Help | Command::Quit => Vec::new(),
    };
    Ok(events)
}

/// Answers the engine's tick request one `unit` after it was issued.
struct TickDriver {
    unit: Duration,
    armed: Option<(TickRequest, Instant)>,
}

impl TickDriver {
    fn new(unit: Duration) -> Self {
        Self { unit, armed: None }
    }

    /// Track the engine's current request; a new request restarts the wait.
    fn sync(&mut self, engine: &TimerEngine) {
        self.armed = match (engine.pending_tick(), self.armed) {
            (Some(request), Some((armed, deadline))) if request == armed => {
                Some((armed, deadline))
            }
            (Some(request), _) => Some((request, Instant::now() + self.unit)),
            (None, _) => None,
        };
    }

    async fn wait(&self) -> TickRequest {
        match self.armed {
            Some((request, deadline)) => {
                tokio::time::sleep_until(deadline).await;
                request
            }
            None => std::future::pending().await,
        }
    }
}

/// Next input line, decoded lossily so stray bytes cannot end the session.
/// Returns `None` at end of input. Bytes from a read cut short by `select!`
/// stay in `buf` and the next call picks up after them.
async fn read_command_line<R>(reader: &mut R, buf: &mut Vec<u8>) -> std::io::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    if reader.read_until(b'\n', buf).await? == 0 && buf.is_empty() {
        return Ok(None);
    }
    let line = String::from_utf8_lossy(buf)
        .trim_end_matches(['\r', '\n'])
        .to_string();
    buf.clear();
    Ok(Some(line))
}

fn store_or_fallback() -> PersistenceStore {
    PersistenceStore::open().unwrap_or_else(|e| {
        let dir = std::env::temp_dir().join("pomotimer");
        warn!(error = %e, fallback = %dir.display(), "no data directory, using temp dir");
        PersistenceStore::at(dir)
    })
}

pub fn run(args: RunArgs) -> CliResult {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(session(args))
}

async fn session(args: RunArgs) -> CliResult {
    let mut engine = TimerEngine::open(store_or_fallback(), sinks::detect_notifier());
    let mut view = View::new(args.json, sinks::detect_tray());
    let mut driver = TickDriver::new(Duration::from_millis(args.tick_ms));

    if args.auto_start {
        engine.set_auto_start_next(true);
    }
    view.show(&[engine.snapshot()]);
    if !args.json {
        view.notice(HELP);
    }
    if args.start {
        view.show(&engine.start());
    }

    let mut stdin = BufReader::new(tokio::io::stdin());
    let mut pending = Vec::new();
    loop {
        driver.sync(&engine);
        tokio::select! {
            request = driver.wait() => {
                let events = engine.fire(request);
                view.show(&events);
            }
            line = read_command_line(&mut stdin, &mut pending) => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => break,
                    Err(e) => {
                        warn!(error = %e, "stdin closed with an error");
                        view.notice(&format!("input error: {e}"));
                        break;
                    }
                };
                match parse_command(&line) {
                    Ok(Some(Command::Quit)) => break,
                    Ok(Some(Command::Help)) => view.notice(HELP),
                    Ok(Some(command)) => match apply(&mut engine, command) {
                        Ok(events) => view.show(&events),
                        Err(message) => view.notice(&message),
                    },
                    Ok(None) => {}
                    Err(message) => view.notice(&message),
                }
            }
        }
    }

    engine.shutdown();
    let history = engine.history();
    view.notice(&format!(
        "all-time: {} pomodoros, {} short breaks, {} long breaks",
        history.pomodoro, history.short, history.long
    ));
    Ok(())
}

//! Notification and tray backends, chosen once at startup.

use std::io::{IsTerminal, Write};

use notify_rust::Notification;
use pomotimer_core::{
    Completion, Event, IntervalKind, NoopSink, NoopTray, NotificationSink, NotifyError, TraySink,
};
use tracing::debug;

use crate::display::{emoji, format_time};

/// Force a notifier: `desktop`, `bell` or `none`.
const NOTIFY_ENV: &str = "POMOTIMER_NOTIFY";

/// Desktop toast through the platform notification service.
pub struct DesktopNotifier;

impl NotificationSink for DesktopNotifier {
    fn notify(&self, completion: &Completion) -> Result<(), NotifyError> {
        let body = completion.message();
        let mut notification = Notification::new();
        notification
            .appname("pomotimer")
            .summary(completion.title())
            .body(&body);
        if !completion.muted {
            let sound = match completion.sound_choice.as_str() {
                "default" => "message-new-instant",
                other => other,
            };
            notification.sound_name(sound);
        }
        notification
            .show()
            .map(|_| ())
            .map_err(|e| NotifyError::Delivery(e.to_string()))
    }
}

/// Message on stderr plus the terminal bell.
pub struct BellNotifier;

impl NotificationSink for BellNotifier {
    fn notify(&self, completion: &Completion) -> Result<(), NotifyError> {
        let bell = if completion.muted { "" } else { "\x07" };
        let mut err = std::io::stderr().lock();
        writeln!(
            err,
            "\r{bell}{} {}: {}",
            emoji(completion.next),
            completion.title(),
            completion.message()
        )
        .map_err(|e| NotifyError::Delivery(e.to_string()))
    }
}

/// Shows the countdown in the terminal window title.
pub struct TitleTray;

impl TraySink for TitleTray {
    fn update(&mut self, event: &Event) {
        if let Some((state, left)) = event.countdown() {
            if let Err(e) = set_title(&mut std::io::stderr().lock(), &title_for(state, left)) {
                debug!(error = %e, "terminal title not updated");
            }
        }
    }
}

fn title_for(state: IntervalKind, left: u64) -> String {
    format!("{} {} {}", emoji(state), state, format_time(left))
}

fn set_title(out: &mut impl Write, title: &str) -> std::io::Result<()> {
    write!(out, "\x1b]0;{title}\x07")?;
    out.flush()
}

fn desktop_session_available() -> bool {
    if cfg!(any(target_os = "macos", windows)) {
        return true;
    }
    std::env::var_os("DBUS_SESSION_BUS_ADDRESS").is_some()
}

pub fn detect_notifier() -> Box<dyn NotificationSink> {
    let forced = std::env::var(NOTIFY_ENV).ok();
    let choice = match forced.as_deref() {
        Some(choice) => choice,
        None if desktop_session_available() => "desktop",
        None if std::io::stderr().is_terminal() => "bell",
        None => "none",
    };
    debug!(notifier = choice, "notification backend selected");
    match choice {
        "desktop" => Box::new(DesktopNotifier),
        "bell" => Box::new(BellNotifier),
        _ => Box::new(NoopSink),
    }
}

pub fn detect_tray() -> Box<dyn TraySink> {
    if std::io::stderr().is_terminal() {
        Box::new(TitleTray)
    } else {
        Box::new(NoopTray)
    }
}

//! Basic CLI E2E tests.
//!
//! Tests invoke the built binary against a throwaway data directory.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};
use std::time::{Duration, Instant};

use tempfile::TempDir;

fn cli(data_dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_pomotimer"));
    cmd.env("POMOTIMER_DATA_DIR", data_dir)
        .env("POMOTIMER_NOTIFY", "none")
        .env_remove("POMOTIMER_ENV")
        .env_remove("POMOTIMER_LOG");
    cmd
}

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(data_dir: &Path, args: &[&str]) -> (String, String, i32) {
    let output = cli(data_dir)
        .args(args)
        .output()
        .expect("Failed to execute CLI command");
    decode(output)
}

fn decode(output: Output) -> (String, String, i32) {
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);
    (stdout, stderr, code)
}

fn json_lines(stdout: &str) -> Vec<serde_json::Value> {
    stdout
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| serde_json::from_str(l).expect("stdout line is JSON"))
        .collect()
}

#[test]
fn test_path_prints_data_dir() {
    let dir = TempDir::new().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["path"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), dir.path().display().to_string());
}

#[test]
fn test_config_get_defaults() {
    let dir = TempDir::new().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["config", "get", "durations.work"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "25");

    let (stdout, _, code) = run_cli(dir.path(), &["config", "get", "longBreakInterval"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "4");
}

#[test]
fn test_config_set_persists() {
    let dir = TempDir::new().unwrap();
    let (_, _, code) = run_cli(dir.path(), &["config", "set", "durations.short", "3"]);
    assert_eq!(code, 0);

    let (stdout, _, _) = run_cli(dir.path(), &["config", "get", "durations.short"]);
    assert_eq!(stdout.trim(), "3");

    let document = std::fs::read_to_string(dir.path().join("settings.toml")).unwrap();
    assert!(document.contains("short = 3"));
}

#[test]
fn test_config_set_rejects_bad_values() {
    let dir = TempDir::new().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["config", "set", "durations.work", "90"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"));

    let (_, _, code) = run_cli(dir.path(), &["config", "set", "dailyCounts.pomodoro", "9"]);
    assert_eq!(code, 1);

    let (_, _, code) = run_cli(dir.path(), &["config", "get", "nope"]);
    assert_eq!(code, 1);

    assert!(!dir.path().join("settings.toml").exists());
}

#[test]
fn test_config_list_and_reset() {
    let dir = TempDir::new().unwrap();
    run_cli(dir.path(), &["config", "set", "muted", "true"]);

    let (stdout, _, code) = run_cli(dir.path(), &["config", "list"]);
    assert_eq!(code, 0);
    let listed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(listed["muted"], true);
    assert_eq!(listed["soundChoice"], "default");

    let (_, _, code) = run_cli(dir.path(), &["config", "reset"]);
    assert_eq!(code, 0);
    let (stdout, _, _) = run_cli(dir.path(), &["config", "get", "muted"]);
    assert_eq!(stdout.trim(), "false");
}

#[test]
fn test_stats_start_at_zero() {
    let dir = TempDir::new().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["stats", "all"]);
    assert_eq!(code, 0);
    let history: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(history, serde_json::json!({"pomodoro": 0, "short": 0, "long": 0}));

    let (stdout, _, code) = run_cli(dir.path(), &["stats", "today"]);
    assert_eq!(code, 0);
    let today: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(today["pomodoro"], 0);
    assert!(today["date"].is_string());
}

#[test]
fn test_run_json_status_and_skip() {
    let dir = TempDir::new().unwrap();
    let mut child = cli(dir.path())
        .args(["run", "--json"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"status\nskip\nbogus\nquit\n")
        .unwrap();
    let (stdout, _, code) = decode(child.wait_with_output().unwrap());
    assert_eq!(code, 0);

    let events = json_lines(&stdout);
    assert_eq!(events[0]["type"], "StateSnapshot");
    assert_eq!(events[0]["state"], "pomodoro");
    assert_eq!(events[0]["time_left_secs"], 1500);

    let skipped = events
        .iter()
        .find(|e| e["type"] == "TimerSkipped")
        .expect("skip event");
    assert_eq!(skipped["from"], "pomodoro");
    assert_eq!(skipped["to"], "short");
    assert!(events.iter().any(|e| e["type"] == "Notice"));

    // Skips never count.
    let history = std::fs::read_to_string(dir.path().join("history.json")).unwrap_or_default();
    assert!(!history.contains("\"short\": 1"));
}

#[test]
fn test_run_survives_undecodable_input() {
    let dir = TempDir::new().unwrap();
    let mut child = cli(dir.path())
        .args(["run", "--json"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"start\n\xff\xfe\nstatus\nquit\n")
        .unwrap();
    let (stdout, stderr, code) = decode(child.wait_with_output().unwrap());
    assert_eq!(code, 0, "stderr: {stderr}");

    let events = json_lines(&stdout);
    assert!(events.iter().any(|e| e["type"] == "TimerStarted"));
    assert!(events.iter().any(|e| e["type"] == "Notice"));
    let last_snapshot = events
        .iter()
        .rev()
        .find(|e| e["type"] == "StateSnapshot")
        .expect("status answered");
    assert_eq!(last_snapshot["phase"], "running");
}

#[test]
fn test_run_completion_updates_history() {
    let dir = TempDir::new().unwrap();
    run_cli(dir.path(), &["config", "set", "durations.short", "3"]);

    let mut child = cli(dir.path())
        .args(["run", "--json", "--tick-ms", "1"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    let mut stdin = child.stdin.take().unwrap();
    stdin.write_all(b"skip\nstart\n").unwrap();
    stdin.flush().unwrap();

    let history_path = dir.path().join("history.json");
    let deadline = Instant::now() + Duration::from_secs(20);
    let mut history = serde_json::Value::Null;
    while Instant::now() < deadline {
        if let Ok(text) = std::fs::read_to_string(&history_path) {
            if let Ok(value) = serde_json::from_str::<serde_json::Value>(&text) {
                if value["short"] == 1 {
                    history = value;
                    break;
                }
            }
        }
        std::thread::sleep(Duration::from_millis(20));
    }

    stdin.write_all(b"quit\n").unwrap();
    drop(stdin);
    let (stdout, _, code) = decode(child.wait_with_output().unwrap());
    assert_eq!(code, 0);
    assert_eq!(history, serde_json::json!({"pomodoro": 0, "short": 1, "long": 0}));

    let events = json_lines(&stdout);
    let completed = events
        .iter()
        .find(|e| e["type"] == "TimerCompleted")
        .expect("completion event");
    assert_eq!(completed["state"], "short");
    assert_eq!(completed["next"], "pomodoro");

    let (stdout, _, _) = run_cli(dir.path(), &["stats", "today"]);
    let today: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(today["short"], 1);
}

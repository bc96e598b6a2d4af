//! Basic CLI E2E tests.
//!
//! Tests invoke the built binary with `SWITCHNAG_HOME` pointed at a temp
//! directory and verify outputs.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

use tempfile::TempDir;

fn switchnag(home: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_switchnag"));
    cmd.env("SWITCHNAG_HOME", home).env_remove("SWITCHNAG_LOG");
    cmd
}

/// Run a CLI command and return (code, stdout, stderr).
fn run_cli(home: &Path, args: &[&str]) -> (i32, String, String) {
    let output = switchnag(home)
        .args(args)
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (code, stdout, stderr)
}

#[test]
fn test_config_path_is_under_home() {
    let home = TempDir::new().unwrap();
    let (code, stdout, _) = run_cli(home.path(), &["config", "path"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), home.path().join("config.toml").display().to_string());
}

#[test]
fn test_config_list_writes_defaults() {
    let home = TempDir::new().unwrap();
    let (code, stdout, _) = run_cli(home.path(), &["config", "list"]);
    assert_eq!(code, 0, "config list failed");

    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["reminder"]["anger_threshold"], 10);
    assert_eq!(json["network"]["backend"], "netsh");
    assert!(home.path().join("config.toml").exists());
}

#[test]
fn test_config_set_then_get() {
    let home = TempDir::new().unwrap();
    let (code, _, _) = run_cli(home.path(), &["config", "set", "reminder.anger_threshold", "3"]);
    assert_eq!(code, 0, "config set failed");

    let (code, stdout, _) = run_cli(home.path(), &["config", "get", "reminder.anger_threshold"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "3");
}

#[test]
fn test_config_rejects_bad_values() {
    let home = TempDir::new().unwrap();
    let (code, _, stderr) = run_cli(home.path(), &["config", "set", "reminder.anger_threshold", "0"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"), "stderr: {stderr}");

    let (code, _, _) = run_cli(home.path(), &["config", "get", "reminder.nope"]);
    assert_eq!(code, 1);
}

#[test]
fn test_config_reset() {
    let home = TempDir::new().unwrap();
    run_cli(home.path(), &["config", "set", "network.interface", "Ethernet"]);
    let (code, _, _) = run_cli(home.path(), &["config", "reset"]);
    assert_eq!(code, 0);

    let (_, stdout, _) = run_cli(home.path(), &["config", "get", "network.interface"]);
    assert_eq!(stdout.trim(), "Wi-Fi");
}

#[test]
fn test_preview_moods() {
    let home = TempDir::new().unwrap();

    let (code, stdout, _) = run_cli(home.path(), &["preview"]);
    assert_eq!(code, 0);
    let neutral: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(neutral["text"], "Time to Switch!");
    assert_eq!(neutral["duration_secs"], 1200);

    let (_, stdout, _) = run_cli(home.path(), &["preview", "--anger", "4"]);
    let urgent: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(urgent["text"], "Please do not ignore me!");
    assert_eq!(urgent["duration_secs"], 0);

    let (_, stdout, _) = run_cli(home.path(), &["preview", "--anger", "-1"]);
    let angered: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(angered["text"], "You have angered me! Internet disabled temporarily.");
    assert_eq!(angered["duration_secs"], 2400);
}

#[test]
fn test_preview_rejects_negative_anger() {
    let home = TempDir::new().unwrap();
    let (code, _, _) = run_cli(home.path(), &["preview", "--anger", "-2"]);
    assert_eq!(code, 1);
}

/// Run `switchnag run --console --dry-run <extra>` feeding `input` on stdin.
fn run_console(home: &Path, extra: &[&str], input: &[u8]) -> (i32, String) {
    let mut child = switchnag(home)
        .args(["run", "--console", "--dry-run"])
        .args(extra)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to start switchnag run");

    child.stdin.take().unwrap().write_all(input).unwrap();
    let output = child.wait_with_output().unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    (output.status.code().unwrap_or(-1), stdout)
}

#[test]
fn test_run_console_exits_on_command() {
    let home = TempDir::new().unwrap();
    let (code, stdout) = run_console(home.path(), &[], b"status\nexit\n");

    assert_eq!(code, 0, "stdout: {stdout}");
    assert!(stdout.contains("Disable Wifi (+20 min)"));
    assert!(stdout.contains("Disable Wifi (+1 hour)"));
    assert!(stdout.contains("Bye."));
}

#[test]
fn test_run_manual_cooldown_is_reported() {
    let home = TempDir::new().unwrap();
    let (code, stdout) = run_console(home.path(), &[], b"+\n+\nexit\n");

    assert_eq!(code, 0, "stdout: {stdout}");
    assert!(stdout.contains("Wi-Fi disabled until"), "stdout: {stdout}");
    assert!(stdout.contains("Cooldown extended by 20 min"), "stdout: {stdout}");
}

#[test]
fn test_run_manual_cooldown_in_event_stream() {
    let home = TempDir::new().unwrap();
    let (code, stdout) = run_console(home.path(), &["--events"], b"++\nexit\n");
    assert_eq!(code, 0, "stdout: {stdout}");

    let extended: Vec<serde_json::Value> = stdout
        .lines()
        .filter_map(|line| serde_json::from_str::<serde_json::Value>(line).ok())
        .filter(|event| event["type"] == "CooldownExtended")
        .collect();
    assert_eq!(extended.len(), 1, "stdout: {stdout}");
    assert_eq!(extended[0]["added_secs"], 3600);
    assert_eq!(extended[0]["started"], true);
}

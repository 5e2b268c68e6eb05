//! Basic CLI E2E tests.
//!
//! Each test runs the built binary against its own temporary data directory.

use std::process::Command;
use tempfile::TempDir;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(data_dir: &TempDir, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_routina"))
        .args(args)
        .env("ROUTINA_DATA_DIR", data_dir.path())
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn run_ok(data_dir: &TempDir, args: &[&str]) -> String {
    let (stdout, stderr, code) = run_cli(data_dir, args);
    assert_eq!(code, 0, "{args:?} failed: {stderr}");
    stdout
}

fn add_template(data_dir: &TempDir, args: &[&str]) -> String {
    let mut full = vec!["template", "add"];
    full.extend_from_slice(args);
    let out = run_ok(data_dir, &full);
    out.trim()
        .strip_prefix("Template created: ")
        .expect("unexpected add output")
        .to_string()
}

fn json(stdout: &str) -> serde_json::Value {
    serde_json::from_str(stdout).expect("Failed to parse JSON output")
}

#[test]
fn test_template_add_and_list() {
    let dir = TempDir::new().unwrap();
    let id = add_template(&dir, &["Read", "--time", "20m"]);

    let list = json(&run_ok(&dir, &["template", "list", "--json"]));
    let templates = list.as_array().unwrap();
    assert_eq!(templates.len(), 1);
    assert_eq!(templates[0]["id"], id.as_str());
    assert_eq!(templates[0]["title"], "Read");
    assert_eq!(templates[0]["repeat_type"], "daily");
    assert_eq!(templates[0]["count"], 1);
}

#[test]
fn test_template_add_rejects_blank_title() {
    let dir = TempDir::new().unwrap();
    let (_, stderr, code) = run_cli(&dir, &["template", "add", "   "]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"));
    let list = json(&run_ok(&dir, &["template", "list", "--json"]));
    assert!(list.as_array().unwrap().is_empty());
}

#[test]
fn test_template_add_requires_days_for_specific_days() {
    let dir = TempDir::new().unwrap();
    let (_, stderr, code) = run_cli(&dir, &["template", "add", "Gym", "--repeat", "specific_days"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("repeat_days"));
}

#[test]
fn test_day_json_lists_occurrence() {
    let dir = TempDir::new().unwrap();
    let id = add_template(&dir, &["Stretch", "--count", "2"]);

    let day = json(&run_ok(&dir, &["day", "--json"]));
    assert_eq!(day["is_today"], true);
    let occs = day["occurrences"].as_array().unwrap();
    assert_eq!(occs.len(), 1);
    assert_eq!(occs[0]["template_id"], id.as_str());
    assert_eq!(occs[0]["completed_count"], 0);
    assert_eq!(day["summary"]["remaining"], 1);
}

#[test]
fn test_day_before_creation_is_empty() {
    let dir = TempDir::new().unwrap();
    add_template(&dir, &["Stretch"]);
    let day = json(&run_ok(&dir, &["day", "2000-01-01", "--all", "--json"]));
    assert!(day["occurrences"].as_array().unwrap().is_empty());
}

#[test]
fn test_done_and_toggle_update_history() {
    let dir = TempDir::new().unwrap();
    let id = add_template(&dir, &["Water", "--count", "2"]);

    let out = run_ok(&dir, &["done", &id]);
    assert!(out.contains("1/2 (open)"));
    let out = run_ok(&dir, &["done", &id]);
    assert!(out.contains("2/2 (completed)"));
    let out = run_ok(&dir, &["done", &id]);
    assert!(out.contains("2/2 (completed)"));

    let history = json(&run_ok(&dir, &["history", &id, "--json"]));
    assert_eq!(history["completed_dates"].as_array().unwrap().len(), 1);
    assert_eq!(history["current_streak"], 1);

    let out = run_ok(&dir, &["toggle", &id]);
    assert!(out.contains("0/2 (open)"));
    let history = json(&run_ok(&dir, &["history", &id, "--json"]));
    assert!(history["completed_dates"].as_array().unwrap().is_empty());
}

#[test]
fn test_date_arguments_accept_timestamps() {
    let dir = TempDir::new().unwrap();
    let id = add_template(&dir, &["Walk"]);

    let out = run_ok(&dir, &["done", &id, "--date", "2099-01-05T10:00:00Z"]);
    assert!(out.contains("2099-01-05"));
    assert!(out.contains("1/1 (completed)"));

    let day = json(&run_ok(&dir, &["day", "2099-01-05T23:59", "--json"]));
    assert_eq!(day["date"], "2099-01-05");
    assert_eq!(day["occurrences"][0]["completed"], true);

    let (_, stderr, code) = run_cli(&dir, &["day", "2099-13-05T10:00"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"));
}

#[test]
fn test_done_unknown_template_fails() {
    let dir = TempDir::new().unwrap();
    let (_, stderr, code) = run_cli(&dir, &["done", "nope"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("Template not found: nope"));
}

#[test]
fn test_template_edit_and_remove() {
    let dir = TempDir::new().unwrap();
    let id = add_template(&dir, &["Read"]);
    run_ok(&dir, &["day"]);

    run_ok(&dir, &["template", "edit", &id, "--title", "Read more", "--count", "3"]);
    let day = json(&run_ok(&dir, &["day", "--json"]));
    assert_eq!(day["occurrences"][0]["title"], "Read more");
    assert_eq!(day["occurrences"][0]["count"], 3);

    run_ok(&dir, &["template", "remove", &id]);
    let day = json(&run_ok(&dir, &["day", "--json"]));
    assert!(day["occurrences"].as_array().unwrap().is_empty());
    let (_, _, code) = run_cli(&dir, &["template", "show", &id]);
    assert_eq!(code, 1);
}

#[test]
fn test_calendar_json_covers_month() {
    let dir = TempDir::new().unwrap();
    let days = json(&run_ok(&dir, &["calendar", "--month", "2024-02", "--json"]));
    let days = days.as_array().unwrap();
    assert_eq!(days.len(), 29);
    assert_eq!(days[0]["date"], "2024-02-01");
    assert_eq!(days[0]["has_tasks"], false);
}

#[test]
fn test_config_get_set() {
    let dir = TempDir::new().unwrap();
    assert_eq!(run_ok(&dir, &["config", "get", "defaults.count"]).trim(), "1");
    run_ok(&dir, &["config", "set", "defaults.count", "4"]);
    assert_eq!(run_ok(&dir, &["config", "get", "defaults.count"]).trim(), "4");

    add_template(&dir, &["Squats"]);
    let list = json(&run_ok(&dir, &["template", "list", "--json"]));
    assert_eq!(list[0]["count"], 4);

    let (_, _, code) = run_cli(&dir, &["config", "set", "defaults.count", "0"]);
    assert_eq!(code, 1);
    let (_, _, code) = run_cli(&dir, &["config", "get", "nope.key"]);
    assert_eq!(code, 1);

    run_ok(&dir, &["config", "reset"]);
    assert_eq!(run_ok(&dir, &["config", "get", "defaults.count"]).trim(), "1");
}

#[test]
fn test_completions() {
    let dir = TempDir::new().unwrap();
    let out = run_ok(&dir, &["completions", "bash"]);
    assert!(out.contains("routina"));
}

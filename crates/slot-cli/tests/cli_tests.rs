//! Integration tests for the `studio-slots` binary.
//!
//! These run the `check` subcommand end to end against payload fixtures and
//! exercise the start-up validation of `monitor`, which fails before the loop
//! starts.

// `Command::cargo_bin` was deprecated in assert_cmd 2.1.2 in favor of
// `cargo::cargo_bin_cmd!`. Allow it until we migrate.
#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;

/// Helper: path to the wednesday.json fixture (2026-03-18, Europe/Helsinki).
fn wednesday_path() -> &'static str {
    concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/wednesday.json")
}

fn studio_slots() -> Command {
    Command::cargo_bin("studio-slots").unwrap()
}

fn check_json(args: &[&str], stdin: Option<&str>) -> serde_json::Value {
    let mut cmd = studio_slots();
    cmd.arg("check").args(args).arg("--json");
    if let Some(input) = stdin {
        cmd.write_stdin(input);
    }
    let output = cmd.output().unwrap();
    assert!(
        output.status.success(),
        "check failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("check --json must print JSON")
}

// ─────────────────────────────────────────────────────────────────────────────
// check
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn check_json_for_fixed_date() {
    let report = check_json(
        &[
            "-i",
            wednesday_path(),
            "--date",
            "2026-03-18",
            "--now",
            "2026-03-18T07:00",
        ],
        None,
    );

    assert_eq!(report["resource_id"], 193);
    assert_eq!(report["date"], "2026-03-18");
    // Cancelled, other-unit and other-day entries are dropped.
    assert_eq!(report["reservations_count"], 2);
    assert_eq!(report["total_available_slots"], 2);

    let slots = report["available_slots"].as_array().unwrap();
    assert_eq!(slots[0]["start"], "2026-03-18T08:00:00");
    assert_eq!(slots[0]["end"], "2026-03-18T09:00:00");
    assert_eq!(slots[0]["duration_minutes"], 60);
    assert_eq!(slots[1]["start"], "2026-03-18T11:00:00");
    assert_eq!(slots[1]["end"], "2026-03-18T15:00:00");
    assert_eq!(slots[1]["raw_end"], "2026-03-18T20:30:00");
    assert_eq!(slots[1]["duration_minutes"], 240);
}

#[test]
fn check_text_report() {
    studio_slots()
        .args([
            "check",
            "-i",
            wednesday_path(),
            "--now",
            "2026-03-18T07:00",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("STUDIO AVAILABILITY - TODAY"))
        .stdout(predicate::str::contains("Available slots: 2"))
        .stdout(predicate::str::contains("08:00-09:00 (1.0h)"))
        .stdout(predicate::str::contains(
            "11:00-15:00 (4.0h) (free until 20:30)",
        ))
        .stdout(predicate::str::contains("09:30-11:00"));
}

#[test]
fn check_text_report_names_weekday_for_other_dates() {
    studio_slots()
        .args([
            "check",
            "-i",
            wednesday_path(),
            "--date",
            "2026-03-18",
            "--now",
            "2026-03-16T12:00",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("2026-03-18 (Wednesday)"));
}

#[test]
fn check_reads_stdin_and_trims_elapsed_time() {
    let report = check_json(&["--now", "2026-03-17T14:30"], Some("[]"));
    assert_eq!(report["date"], "2026-03-17");
    assert_eq!(report["reservations_count"], 0);

    let slots = report["available_slots"].as_array().unwrap();
    assert_eq!(slots.len(), 1);
    assert_eq!(slots[0]["start"], "2026-03-17T14:30:00");
    assert_eq!(slots[0]["end"], "2026-03-17T18:30:00");
    assert_eq!(slots[0]["raw_end"], "2026-03-17T20:30:00");
}

#[test]
fn check_other_resource() {
    let report = check_json(
        &[
            "-i",
            wednesday_path(),
            "--resource",
            "194",
            "--now",
            "2026-03-18T07:00",
        ],
        None,
    );
    assert_eq!(report["resource_id"], 194);
    assert_eq!(report["reservations_count"], 1);
}

#[test]
fn check_no_slots_message() {
    // Monday opens 16:00-20:00; by 19:30 less than an hour is left.
    studio_slots()
        .args(["check", "--now", "2026-03-16T19:30"])
        .write_stdin("[]")
        .assert()
        .success()
        .stdout(predicate::str::contains("No available slots"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Error handling
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn check_rejects_invalid_date() {
    studio_slots()
        .args(["check", "--date", "2026-02-30"])
        .write_stdin("[]")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid date"));
}

#[test]
fn check_rejects_malformed_payload() {
    studio_slots()
        .args(["check", "--now", "2026-03-18T07:00"])
        .write_stdin("not json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to decode reservation data"));
}

#[test]
fn check_surfaces_service_errors() {
    studio_slots()
        .args(["check", "--now", "2026-03-18T07:00"])
        .write_stdin(r#"{"errors":[{"message":"Not authorized"}]}"#)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not authorized"));
}

#[test]
fn check_missing_file() {
    studio_slots()
        .args(["check", "-i", "/nonexistent/reservations.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read file"));
}

#[test]
fn check_rejects_unknown_timezone() {
    studio_slots()
        .args(["check", "--timezone", "Mars/Olympus"])
        .write_stdin("[]")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid timezone"));
}

#[test]
fn monitor_rejects_zero_interval() {
    studio_slots()
        .args(["monitor", "-i", wednesday_path(), "--interval", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("positive number of minutes"));
}

#[test]
fn monitor_rejects_unknown_target() {
    studio_slots()
        .args(["monitor", "-i", wednesday_path(), "--notify", "telegram"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown notification target"));
}

#[test]
fn help_lists_subcommands() {
    studio_slots()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("check"))
        .stdout(predicate::str::contains("monitor"));
}

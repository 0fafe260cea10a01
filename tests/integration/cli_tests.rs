//! End-to-end checks for the platcheck binary.

use assert_cmd::Command;
use predicates::prelude::*;

fn platcheck() -> Command {
    Command::cargo_bin("platcheck").expect("binary builds")
}

#[test]
fn passing_run_exits_zero_with_summary() {
    platcheck()
        .args(["--seed", "42"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ok:").and(predicate::str::contains("trials")));
}

#[test]
fn robot_mode_emits_a_json_report() {
    let assert = platcheck().args(["--robot", "--seed", "42"]).assert().success();

    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).into_owned();
    let report: serde_json::Value =
        serde_json::from_str(stdout.trim()).expect("robot output is JSON");
    assert_eq!(report["status"], "passed");
    assert!(report["trials_run"].as_u64().unwrap_or(0) > 0);
}

#[test]
fn quiet_mode_suppresses_the_summary() {
    platcheck()
        .args(["--quiet", "--seed", "42"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn seeded_runs_report_identical_counts() {
    let run = |seed: &str| {
        let assert = platcheck().args(["--robot", "--seed", seed]).assert().success();
        String::from_utf8_lossy(&assert.get_output().stdout).into_owned()
    };

    let first: serde_json::Value =
        serde_json::from_str(run("7").trim()).expect("robot output is JSON");
    let second: serde_json::Value =
        serde_json::from_str(run("7").trim()).expect("robot output is JSON");
    assert_eq!(first["trials_run"], second["trials_run"]);
    assert_eq!(first["discarded"], second["discarded"]);
}

// Regression tests for the runner: drive the self-test binary end to end.
// Requires: assert_cmd, predicates crates in [dev-dependencies]

use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::{prelude::PredicateBooleanExt, str::contains};

fn report_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("unitprobe-cli-{}-{}.json", name, std::process::id()))
}

fn selftest(report: &PathBuf) -> Command {
    let mut cmd = Command::cargo_bin("unitprobe-selftest").unwrap();
    cmd.arg("--nopdf").arg("--report").arg(report);
    cmd
}

#[test]
fn selftest_fails_with_summary() {
    let report = report_path("full");
    selftest(&report)
        .assert()
        .code(1)
        .stdout(
            contains("SUMMARY:")
                .and(contains("B A D"))
                .and(contains("/4-Except/e-10"))
                .and(contains("/3-Big/t03/DISABLE (DISABLED)")),
        );

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&report).unwrap()).unwrap();
    assert_eq!(json["title"], "divide");
    assert_eq!(json["testcases_total"]["disabled"], 1);
    let _ = fs::remove_file(&report);
}

#[test]
fn filter_selects_passing_testcases() {
    let report = report_path("filter");
    selftest(&report)
        .args(["-f", "1-Basic/t0"])
        .assert()
        .code(1)
        .stdout(contains("FAIL: /1-Basic/t05"));

    selftest(&report)
        .args(["--filter", "e-10"])
        .assert()
        .success()
        .stdout(contains("======  O K").and(contains("✓ /4-Except/e-10")));
    let _ = fs::remove_file(&report);
}

#[test]
fn all_steps_reports_passing_steps() {
    let report = report_path("all");
    selftest(&report)
        .args(["-a", "-f", "e-10", "--sticky-expect"])
        .assert()
        .success();

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&report).unwrap()).unwrap();
    assert_eq!(json["expectation_policy"], "sticky");
    let suite = json["suites"]
        .as_array()
        .unwrap()
        .iter()
        .find(|s| s["name"] == "4-Except")
        .unwrap();
    assert_eq!(suite["verdict"], "OK");
    let steps = suite["testcases"]
        .as_array()
        .unwrap()
        .iter()
        .find(|tc| tc["name"] == "e-10")
        .unwrap()["steps"]
        .as_array()
        .unwrap()
        .clone();
    assert_eq!(steps.len(), 1);
    assert_eq!(steps[0]["ok"], true);
    let _ = fs::remove_file(&report);
}

#[test]
fn debug_dump_ignores_the_log_level() {
    let report = report_path("dump");
    selftest(&report)
        .env("UNITPROBE_LOG", "error")
        .args(["-d", "-f", "e-10"])
        .assert()
        .success()
        .stdout(contains(" === probes ").and(contains(" === suites ")));
    let _ = fs::remove_file(&report);
}

#[test]
fn unwritable_report_is_a_fatal_error() {
    Command::cargo_bin("unitprobe-selftest")
        .unwrap()
        .args(["--nopdf", "-f", "e-10", "--report", "/nonexistent-dir/unitprobe/results.json"])
        .assert()
        .code(2)
        .stderr(contains("unitprobe::report::write").or(contains("failed to write report")));
}

#[test]
fn help_lists_the_runner_flags() {
    Command::cargo_bin("unitprobe-selftest")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("--filter").and(contains("--all-steps")).and(contains("--nopdf")));
}

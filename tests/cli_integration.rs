//! Integration tests for the loopcheck CLI

use assert_cmd::cargo;
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get a Command for the loopcheck binary
fn loopcheck() -> Command {
    Command::new(cargo::cargo_bin!("loopcheck"))
}

fn write_settings(temp: &TempDir, content: &str) {
    let dir = temp.path().join(".loopcheck");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("settings.json"), content).unwrap();
}

#[test]
fn test_help() {
    loopcheck()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("re-verifying their invariants"));
}

#[test]
fn test_version() {
    loopcheck()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("0.1.0"));
}

#[test]
fn test_run_prefix_sum() {
    loopcheck()
        .args(["run", "--values", "1,2,3", "--mode", "prefix-sum", "--delay-ms", "0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("j=3, res=6, t=0"))
        .stdout(predicate::str::contains("Loop completed"));
}

#[test]
fn test_run_count_reports_found_elements() {
    loopcheck()
        .args([
            "run",
            "--values",
            "1, 5, 3, 6, 2",
            "--mode",
            "count",
            "--threshold",
            "3",
            "--delay-ms",
            "0",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("j=5, res=2, t=0"))
        .stdout(predicate::str::contains("found [5, 6]"));
}

#[test]
fn test_run_json_lines() {
    let output = loopcheck()
        .args([
            "run", "--values", "1 5 3 6 2", "--mode", "prefix-max", "--delay-ms", "0", "--json",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let snapshots: Vec<serde_json::Value> = stdout
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(snapshots.len(), 6);
    assert_eq!(snapshots[0]["accumulator"], i64::MIN);
    assert_eq!(snapshots[5]["accumulator"], 6);
    assert_eq!(snapshots[5]["completed"], true);
    let variants: Vec<u64> = snapshots
        .iter()
        .map(|s| s["variant"].as_u64().unwrap())
        .collect();
    assert_eq!(variants, vec![5, 4, 3, 2, 1, 0]);
}

#[test]
fn test_run_empty_sequence() {
    loopcheck()
        .args(["run", "--values", "", "--delay-ms", "0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("j=0, res=0, t=0"))
        .stdout(predicate::str::contains("after 0 steps"));
}

#[test]
fn test_run_prints_log() {
    loopcheck()
        .args(["run", "--values", "4", "--delay-ms", "0", "--log"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Run log:"))
        .stdout(predicate::str::contains("Variant function: 1 -> 0"));
}

#[test]
fn test_step_stops_at_count() {
    loopcheck()
        .args(["step", "--values", "1,2,3", "--count", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("j=2, res=3, t=1"))
        .stdout(predicate::str::contains("j=3").not());
}

#[test]
fn test_step_negative_values_and_threshold() {
    loopcheck()
        .args([
            "step",
            "--values",
            "-5,-1,-7",
            "--mode",
            "count",
            "--threshold",
            "-3",
            "--count",
            "5",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("j=3, res=1, t=0"));
}

#[test]
fn test_invalid_sequence_exit_code() {
    loopcheck()
        .args(["step", "--values", "1,x,3"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Invalid sequence element 'x'"));
}

#[test]
fn test_invalid_mode_rejected_by_parser() {
    loopcheck()
        .args(["describe", "--mode", "prefix-product"])
        .assert()
        .failure();
}

#[test]
fn test_describe_prefix_sum() {
    loopcheck()
        .args(["describe", "--mode", "sum"])
        .assert()
        .success()
        .stdout(predicate::str::contains("t = n − j"))
        .stdout(predicate::str::contains("res + a[j] = Σ_{i=0}^{j} a[i]"));
}

#[test]
fn test_describe_json() {
    let output = loopcheck()
        .args(["describe", "--mode", "prefix-max", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["descriptor"]["mode"], "PrefixMax");
    assert!(value["wp"]["symbolic_formula"]
        .as_str()
        .unwrap()
        .contains("max(res, a[j])"));
}

#[test]
fn test_config_defaults_from_settings() {
    let temp = TempDir::new().unwrap();
    write_settings(
        &temp,
        r#"{ "stepDelayMs": 0, "defaultMode": "CountAboveThreshold", "defaultThreshold": 2 }"#,
    );

    loopcheck()
        .arg("--project")
        .arg(temp.path())
        .args(["run", "--values", "1,2,3,4"])
        .assert()
        .success()
        .stdout(predicate::str::contains("found [3, 4]"));
}

#[test]
fn test_config_show_json() {
    let temp = TempDir::new().unwrap();
    loopcheck()
        .arg("--project")
        .arg(temp.path())
        .args(["config", "show", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"stepDelayMs\": 500"));
}

#[test]
fn test_config_validate_rejects_zero_capacity() {
    let temp = TempDir::new().unwrap();
    write_settings(&temp, r#"{ "logCapacity": 0 }"#);

    loopcheck()
        .arg("--project")
        .arg(temp.path())
        .args(["config", "validate"])
        .assert()
        .code(7)
        .stderr(predicate::str::contains("logCapacity"));
}

#[test]
fn test_config_paths() {
    let temp = TempDir::new().unwrap();
    loopcheck()
        .arg("--project")
        .arg(temp.path())
        .args(["config", "paths"])
        .assert()
        .success()
        .stdout(predicate::str::contains(".loopcheck/settings.json"))
        .stdout(predicate::str::contains("not found"));
}

#[test]
fn test_log_json_keeps_stdout_clean() {
    let output = loopcheck()
        .args(["--log-json", "step", "--values", "1,2", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    for line in stdout.lines() {
        let value: serde_json::Value = serde_json::from_str(line).unwrap();
        assert!(value.get("position").is_some());
    }
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.lines().all(|l| l.trim_start().starts_with('{')));
}

#[test]
fn test_step_validates_config() {
    let temp = TempDir::new().unwrap();
    write_settings(&temp, r#"{ "stepDelayMs": 600000 }"#);

    loopcheck()
        .arg("--project")
        .arg(temp.path())
        .args(["step", "--values", "1,2"])
        .assert()
        .code(7)
        .stderr(predicate::str::contains("stepDelayMs"));
}

#[test]
fn test_invalid_sequence_reports_context() {
    loopcheck()
        .args(["run", "--values", "1;2", "--delay-ms", "0"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Failed to parse --values"))
        .stderr(predicate::str::contains("Invalid sequence element '1;2'"));
}

#[test]
fn test_missing_project_directory() {
    let temp = TempDir::new().unwrap();
    loopcheck()
        .arg("--project")
        .arg(temp.path().join("absent"))
        .args(["config", "show"])
        .assert()
        .code(7)
        .stderr(predicate::str::contains("Project directory does not exist"));
}

//! CLI integration tests for ScriptSweep
//!
//! These tests verify the command-line interface works correctly.

mod common;

use assert_cmd::Command;
use common::*;
use predicates::prelude::*;

fn scriptsweep() -> Command {
    Command::cargo_bin("scriptsweep").unwrap()
}

#[test]
fn test_help_flag() {
    scriptsweep()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("unused MonoBehaviour scripts"))
        .stdout(predicate::str::contains("--policy"));
}

#[test]
fn test_version_flag() {
    scriptsweep()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("scriptsweep"));
}

#[test]
fn test_missing_arguments_prints_usage() {
    scriptsweep()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));

    scriptsweep()
        .arg("OnlyProject")
        .assert()
        .failure()
        .stderr(predicate::str::contains("<OUTPUT>"));
}

#[test]
fn test_nonexistent_project() {
    let temp_dir = tempfile::tempdir().unwrap();

    scriptsweep()
        .arg(temp_dir.path().join("does-not-exist"))
        .arg(temp_dir.path().join("out"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_invalid_policy_is_rejected() {
    let temp_dir = tempfile::tempdir().unwrap();

    scriptsweep()
        .arg(temp_dir.path())
        .arg(temp_dir.path().join("out"))
        .args(["--policy", "lenient"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn test_run_writes_dump_and_csv() {
    let temp_dir = tempfile::tempdir().unwrap();
    let root = temp_dir.path().join("Project");
    let out = temp_dir.path().join("out");
    mover_project(&root, "m_Speed");

    scriptsweep().arg(&root).arg(&out).arg("--quiet").assert().success();

    assert_eq!(std::fs::read_to_string(out.join("Main.unity.dump")).unwrap(), "Root\n");
    assert_eq!(
        std::fs::read_to_string(out.join("UnusedScripts.csv")).unwrap(),
        "Relative Path,GUID\n"
    );
}

#[test]
fn test_policy_flag_overrides_default() {
    let temp_dir = tempfile::tempdir().unwrap();
    let root = temp_dir.path().join("Project");
    mover_project(&root, "m_Health");

    let strict_out = temp_dir.path().join("strict");
    scriptsweep().arg(&root).arg(&strict_out).arg("-q").assert().success();
    let csv = std::fs::read_to_string(strict_out.join("UnusedScripts.csv")).unwrap();
    assert!(csv.contains("Assets/Scripts/Mover.cs,abc123"));

    let preserve_out = temp_dir.path().join("preserve");
    scriptsweep()
        .arg(&root)
        .arg(&preserve_out)
        .args(["-q", "--policy", "preserve"])
        .assert()
        .success();
    let csv = std::fs::read_to_string(preserve_out.join("UnusedScripts.csv")).unwrap();
    assert!(!csv.contains("abc123"));
}

#[test]
fn test_policy_from_config_file() {
    let temp_dir = tempfile::tempdir().unwrap();
    let root = temp_dir.path().join("Project");
    let out = temp_dir.path().join("out");
    mover_project(&root, "m_Health");
    write(&root, ".scriptsweep.yml", "usage:\n  policy: preserve\n");

    scriptsweep().arg(&root).arg(&out).arg("-q").assert().success();

    let csv = std::fs::read_to_string(out.join("UnusedScripts.csv")).unwrap();
    assert!(!csv.contains("abc123"));
}

#[test]
fn test_json_output() {
    let temp_dir = tempfile::tempdir().unwrap();
    let root = temp_dir.path().join("Project");
    let out = temp_dir.path().join("out");
    let json_path = temp_dir.path().join("report.json");
    mover_project(&root, "m_Speed");

    scriptsweep()
        .arg(&root)
        .arg(&out)
        .arg("-q")
        .arg("--json")
        .arg(&json_path)
        .assert()
        .success();

    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(json_path).unwrap()).unwrap();
    assert_eq!(value["summary"]["scenes_processed"], 1);
    assert_eq!(value["summary"]["scripts_unused"], 0);
    assert_eq!(value["scenes"][0]["scene"], "Assets/Scenes/Main.unity");
}

#[test]
fn test_summary_printed_when_not_quiet() {
    let temp_dir = tempfile::tempdir().unwrap();
    let root = temp_dir.path().join("Project");
    mover_project(&root, "m_Speed");

    scriptsweep()
        .arg(&root)
        .arg(temp_dir.path().join("out"))
        .assert()
        .success()
        .stdout(predicate::str::contains("UnusedScripts.csv"));
}

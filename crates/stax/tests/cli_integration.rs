//! CLI integration tests.
//!
//! These drive the real binary against a fake stacking tool: a config file
//! points `tool.command` at `cat` with an NDJSON fixture, so no actual
//! branch tooling is needed.

use assert_cmd::Command;
use predicates::prelude::*;

const STACK: &str = concat!(
    r#"{"name":"main"}"#,
    "\n",
    r#"{"name":"child","down":{"name":"main"}}"#,
    "\n",
    r#"{"name":"feature","down":{"name":"main"},"isCurrent":true}"#,
    "\n",
);

/// A fake repo: a `.git` marker, an NDJSON fixture, and a config that makes
/// `cat` the stacking tool.
fn setup_repo(ndjson: &str) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join(".git")).unwrap();

    let fixture = dir.path().join("stack.ndjson");
    std::fs::write(&fixture, ndjson).unwrap();

    let config_dir = dir.path().join(".config/stax");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(
        config_dir.join("config.toml"),
        format!(
            "[tool]\ncommand = \"cat\"\nargs = [{:?}]\n",
            fixture.display().to_string()
        ),
    )
    .unwrap();

    dir
}

fn stax() -> Command {
    Command::cargo_bin("stax").unwrap()
}

#[test]
fn test_help_lists_serve() {
    stax()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("serve"));
}

#[test]
fn test_renders_stack_to_stdout() {
    let repo = setup_repo(STACK);

    stax()
        .current_dir(repo.path())
        .arg("--no-color")
        .assert()
        .success()
        .stdout(predicate::str::contains("│ ◉ feature"))
        .stdout(predicate::str::contains("○─╯ main"));
}

#[test]
fn test_json_output_is_well_formed() {
    let repo = setup_repo(STACK);

    let output = stax()
        .current_dir(repo.path())
        .args(["-f", "json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let graph: serde_json::Value = serde_json::from_slice(&output).unwrap();
    let rows = graph["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[2]["name"], "main");
    assert_eq!(graph["maxLane"], 1);
}

#[test]
fn test_repo_flag_selects_repository() {
    let repo = setup_repo(STACK);

    stax()
        .arg("-C")
        .arg(repo.path())
        .arg("--no-color")
        .assert()
        .success()
        .stdout(predicate::str::contains("child"));
}

#[test]
fn test_outside_a_repository_fails() {
    let dir = tempfile::tempdir().unwrap();

    stax()
        .arg("-C")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("No git repository"));
}

#[test]
fn test_failing_tool_is_a_clean_error() {
    let repo = setup_repo(STACK);
    std::fs::write(
        repo.path().join(".config/stax/config.toml"),
        "[tool]\ncommand = \"false\"\nargs = []\n",
    )
    .unwrap();

    stax()
        .current_dir(repo.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("exited with"));
}

#[test]
fn test_unknown_format_rejected() {
    let repo = setup_repo(STACK);

    stax()
        .current_dir(repo.path())
        .args(["-f", "xml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown format"));
}

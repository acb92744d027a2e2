use std::fs;
use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::str::contains;
use serde_json::Value;
use tempfile::TempDir;

const RULE_FILE: &str = ".action-notify-on-change.yaml";

fn notify_cmd(workspace: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("notify-on-change"));
    cmd.arg("--workspace")
        .arg(workspace)
        .env_remove("GITHUB_WORKSPACE")
        .env("RUST_LOG", "warn");
    cmd
}

fn write_rule(root: &Path, dir: &str, yaml: &str) {
    let dir = root.join(dir);
    fs::create_dir_all(&dir).expect("create rule dir");
    fs::write(dir.join(RULE_FILE), yaml).expect("write rule file");
}

fn repo() -> TempDir {
    let root = TempDir::new().expect("workspace");
    fs::create_dir_all(root.path().join(".git")).expect("marker");
    write_rule(
        root.path(),
        "a",
        "commit:\n  destination: '#team'\n  messageTemplate: '{{ pretty_name | join(sep=\", \") }}'\nprettyName: [Alpha]\n",
    );
    write_rule(root.path(), "a/b", "commit:\n  users: [alice]\n");
    root
}

#[test]
fn resolve_json_groups_files_by_destination() {
    let root = repo();
    let output = notify_cmd(root.path())
        .args(["resolve", "a/b/f1.txt", "a/f2.txt", "zzz/none.txt", "--kind", "commit", "--sha", "abc", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let parsed: Value = serde_json::from_slice(&output).expect("json stdout");
    let destinations = parsed.as_array().expect("array");
    assert_eq!(destinations.len(), 1);
    assert_eq!(destinations[0]["destination"], "#team");
    assert_eq!(destinations[0]["files"], serde_json::json!(["a/b/f1.txt", "a/f2.txt"]));
    assert_eq!(destinations[0]["recipients"]["users"], serde_json::json!(["alice"]));
    assert_eq!(destinations[0]["messages"], serde_json::json!(["Alpha", "Alpha"]));
    assert_eq!(destinations[0]["source"]["kind"], "commit");
}

#[test]
fn resolve_works_when_changed_files_exist_on_disk() {
    let root = repo();
    fs::write(root.path().join("a/b/f1.txt"), "one\n").expect("write f1");
    fs::write(root.path().join("a/f2.txt"), "two\n").expect("write f2");
    let output = notify_cmd(root.path())
        .args(["resolve", "a/b/f1.txt", "a/f2.txt", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let parsed: Value = serde_json::from_slice(&output).expect("json stdout");
    assert_eq!(parsed[0]["destination"], "#team");
    assert_eq!(parsed[0]["files"], serde_json::json!(["a/b/f1.txt", "a/f2.txt"]));
}

#[test]
fn resolve_table_mentions_destination() {
    let root = repo();
    notify_cmd(root.path())
        .args(["resolve", "a/f2.txt"])
        .assert()
        .success()
        .stdout(contains("#team"))
        .stdout(contains("1 destination(s)"));
}

#[test]
fn stop_marker_hides_outer_rules() {
    let root = repo();
    fs::create_dir_all(root.path().join("a/b/.git")).expect("nested marker");
    let output = notify_cmd(root.path())
        .args(["resolve", "a/b/f1.txt", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let parsed: Value = serde_json::from_slice(&output).expect("json stdout");
    assert_eq!(parsed, serde_json::json!([]));
}

#[test]
fn pull_request_without_number_fails() {
    let root = repo();
    notify_cmd(root.path())
        .args(["resolve", "a/f2.txt", "--kind", "pull-request"])
        .assert()
        .failure()
        .stderr(contains("pull request number is required"));
}

#[test]
fn broken_template_names_the_file() {
    let root = repo();
    write_rule(root.path(), "c", "messageTemplate: '{{ nope'\ncommit:\n  destination: '#c'\n");
    notify_cmd(root.path())
        .args(["resolve", "a/f2.txt", "c/x.txt"])
        .assert()
        .failure()
        .stderr(contains("c/x.txt"));
}

#[test]
fn unknown_kind_is_rejected_by_the_parser() {
    let root = repo();
    notify_cmd(root.path())
        .args(["resolve", "a/f2.txt", "--kind", "merge"])
        .assert()
        .failure()
        .stderr(contains("unknown change kind"));
}

#[test]
fn run_without_tokens_fails_early() {
    let root = repo();
    notify_cmd(root.path())
        .arg("run")
        .env_remove("INPUT_GITHUB-TOKEN")
        .env_remove("GITHUB_TOKEN")
        .assert()
        .failure()
        .stderr(contains("GitHub token is required"));
}

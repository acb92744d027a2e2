//! Rule files read back from disk, as a checkout would provide them.

use assert_fs::prelude::*;
use notify_core::{ChangeKind, ConfigError, RuleFile};

// ---------------------------------------------------------------------------
// 1. Well-formed files
// ---------------------------------------------------------------------------

#[test]
fn nested_rule_file_round_trips_through_disk() {
    let repo = assert_fs::TempDir::new().expect("tempdir");
    let file = repo.child("services/api/.action-notify-on-change.yaml");
    file.write_str(
        "pullRequest:\n  destination: '#api-prs'\n  users:\n    - alice@example.com\n    - bob@example.com\ncommit:\n  destination: '#api'\n  groups: [api-oncall]\nprettyName:\n  - API\n  - Backend\n",
    )
    .expect("write");

    let bytes = std::fs::read(file.path()).expect("read");
    let rule = RuleFile::parse(file.path(), &bytes).expect("parse");

    assert_eq!(rule.rule(ChangeKind::PullRequest).destination, "#api-prs");
    assert_eq!(
        rule.rule(ChangeKind::PullRequest).users,
        vec!["alice@example.com", "bob@example.com"]
    );
    assert_eq!(rule.rule(ChangeKind::Commit).groups, vec!["api-oncall"]);
    assert_eq!(rule.pretty_name, vec!["API", "Backend"]);
    assert!(rule.template(ChangeKind::Commit).is_none());
}

#[test]
fn unknown_keys_are_ignored() {
    let rule = RuleFile::parse(
        std::path::Path::new("x.yaml"),
        b"commit:\n  destination: '#x'\n  unfurl: false\nowner: someone\n",
    )
    .expect("parse");
    assert_eq!(rule.commit.destination, "#x");
}

// ---------------------------------------------------------------------------
// 2. Malformed files
// ---------------------------------------------------------------------------

#[test]
fn wrong_shape_is_a_parse_error_with_path() {
    let repo = assert_fs::TempDir::new().expect("tempdir");
    let file = repo.child("web/.action-notify-on-change.yaml");
    file.write_str("- this is a list, not a mapping\n").expect("write");

    let bytes = std::fs::read(file.path()).expect("read");
    let err = RuleFile::parse(file.path(), &bytes).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }), "got: {err}");
    assert!(err.to_string().contains(".action-notify-on-change.yaml"));
}

#[test]
fn users_must_be_a_list() {
    let err = RuleFile::parse(
        std::path::Path::new("x.yaml"),
        b"commit:\n  users: { alice: true }\n",
    )
    .unwrap_err();
    let ConfigError::Parse { source, .. } = &err;
    assert!(!source.to_string().is_empty());
}

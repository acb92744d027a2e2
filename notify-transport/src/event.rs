//! The triggering event, as described by the GitHub Actions environment.

use notify_core::ChangeKind;

use crate::error::EventError;

/// Event facts available before any API call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventContext {
    /// `owner/name`.
    pub repository: String,
    pub event_name: String,
    pub kind: ChangeKind,
    pub pull_request_number: Option<u64>,
    pub sha: String,
    /// `GITHUB_BASE_REF` for pull requests, `GITHUB_REF_NAME` otherwise.
    pub branch: Option<String>,
}

impl EventContext {
    pub fn from_env() -> Result<Self, EventError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source.
    ///
    /// `pull_request` and `pull_request_target` events select
    /// [`ChangeKind::PullRequest`] and need `GITHUB_REF` shaped like
    /// `refs/pull/<n>/merge`; everything else is a commit.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, EventError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.is_empty());
        let require = |key: &'static str| var(key).ok_or(EventError::Missing(key));

        let repository = require("GITHUB_REPOSITORY")?;
        if !matches!(repository.split_once('/'), Some((o, n)) if !o.is_empty() && !n.is_empty()) {
            return Err(EventError::Repository(repository));
        }
        let event_name = require("GITHUB_EVENT_NAME")?;
        let sha = require("GITHUB_SHA")?;

        let (kind, pull_request_number, branch) =
            if matches!(event_name.as_str(), "pull_request" | "pull_request_target") {
                let git_ref = require("GITHUB_REF")?;
                let number = pull_request_number(&git_ref)
                    .ok_or_else(|| EventError::PullRequestRef(git_ref.clone()))?;
                (ChangeKind::PullRequest, Some(number), var("GITHUB_BASE_REF"))
            } else {
                (ChangeKind::Commit, None, var("GITHUB_REF_NAME"))
            };

        Ok(Self {
            repository,
            event_name,
            kind,
            pull_request_number,
            sha,
            branch,
        })
    }
}

/// `refs/pull/<n>/merge` → `n`.
pub fn pull_request_number(git_ref: &str) -> Option<u64> {
    let digits = git_ref.strip_prefix("refs/pull/")?.strip_suffix("/merge")?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use rstest::rstest;

    use super::*;

    fn ctx(vars: &[(&str, &str)]) -> Result<EventContext, EventError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        EventContext::from_lookup(|key| map.get(key).cloned())
    }

    #[rstest]
    #[case("refs/pull/42/merge", Some(42))]
    #[case("refs/pull/0/merge", Some(0))]
    #[case("refs/pull//merge", None)]
    #[case("refs/pull/4x/merge", None)]
    #[case("refs/pull/42/head", None)]
    #[case("refs/heads/main", None)]
    fn parses_pull_request_refs(#[case] git_ref: &str, #[case] expected: Option<u64>) {
        assert_eq!(pull_request_number(git_ref), expected);
    }

    #[test]
    fn pull_request_event() {
        let event = ctx(&[
            ("GITHUB_REPOSITORY", "acme/web"),
            ("GITHUB_EVENT_NAME", "pull_request"),
            ("GITHUB_REF", "refs/pull/7/merge"),
            ("GITHUB_SHA", "abc"),
            ("GITHUB_BASE_REF", "main"),
            ("GITHUB_REF_NAME", "7/merge"),
        ])
        .unwrap();
        assert_eq!(event.kind, ChangeKind::PullRequest);
        assert_eq!(event.pull_request_number, Some(7));
        assert_eq!(event.branch.as_deref(), Some("main"));
    }

    #[test]
    fn push_event_is_a_commit() {
        let event = ctx(&[
            ("GITHUB_REPOSITORY", "acme/web"),
            ("GITHUB_EVENT_NAME", "push"),
            ("GITHUB_REF", "refs/heads/main"),
            ("GITHUB_SHA", "abc"),
            ("GITHUB_BASE_REF", ""),
            ("GITHUB_REF_NAME", "main"),
        ])
        .unwrap();
        assert_eq!(event.kind, ChangeKind::Commit);
        assert_eq!(event.pull_request_number, None);
        assert_eq!(event.branch.as_deref(), Some("main"));
    }

    #[test]
    fn pull_request_with_odd_ref_fails() {
        let err = ctx(&[
            ("GITHUB_REPOSITORY", "acme/web"),
            ("GITHUB_EVENT_NAME", "pull_request"),
            ("GITHUB_REF", "refs/heads/feature"),
            ("GITHUB_SHA", "abc"),
        ])
        .unwrap_err();
        assert_eq!(err, EventError::PullRequestRef("refs/heads/feature".into()));
    }

    #[test]
    fn missing_variables_are_named() {
        assert_eq!(
            ctx(&[("GITHUB_REPOSITORY", "acme/web")]).unwrap_err(),
            EventError::Missing("GITHUB_EVENT_NAME")
        );
        assert_eq!(
            ctx(&[("GITHUB_REPOSITORY", "acme")]).unwrap_err(),
            EventError::Repository("acme".into())
        );
    }
}

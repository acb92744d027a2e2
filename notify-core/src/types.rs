//! Domain types shared by the routing engine and its transports.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::dedup::dedup_extend;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Which sub-rule of every rule file applies to the current run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChangeKind {
    PullRequest,
    Commit,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeKind::PullRequest => write!(f, "pull-request"),
            ChangeKind::Commit => write!(f, "commit"),
        }
    }
}

/// Kind-specific identifiers of the change being announced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ChangeSource {
    PullRequest {
        number: u64,
    },
    Commit {
        #[serde(skip_serializing_if = "Option::is_none")]
        branch: Option<String>,
        sha: String,
    },
}

impl fmt::Display for ChangeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeSource::PullRequest { number } => write!(f, "Pull request #{number}"),
            ChangeSource::Commit {
                branch: Some(branch),
                ..
            } if !branch.is_empty() => write!(f, "Branch {branch}"),
            ChangeSource::Commit { sha, .. } => write!(f, "Commit {sha}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Caller-supplied metadata
// ---------------------------------------------------------------------------

/// The person who opened the pull request or authored the commit.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Author {
    pub login: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Event-level facts copied into every [`Change`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChangeMetadata {
    /// Required when the run is for [`ChangeKind::PullRequest`].
    pub pull_request_number: Option<u64>,
    /// Base branch of the pull request, or the pushed branch.
    pub branch: Option<String>,
    /// Revision rule files are read at.
    pub commit_sha: String,
    pub author: Author,
    pub link_to_change: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Recipients
// ---------------------------------------------------------------------------

/// Users and groups to mention, each list duplicate-free.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Recipients {
    pub users: Vec<String>,
    pub groups: Vec<String>,
}

impl Recipients {
    pub fn is_empty(&self) -> bool {
        self.users.is_empty() && self.groups.is_empty()
    }

    /// Union with `other`, keeping entries already present first.
    pub fn merge(&mut self, other: Recipients) {
        dedup_extend(&mut self.users, other.users);
        dedup_extend(&mut self.groups, other.groups);
    }
}

// ---------------------------------------------------------------------------
// Change records
// ---------------------------------------------------------------------------

/// The routing decision for one changed file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change {
    pub destination: String,
    pub recipients: Recipients,
    pub file: String,
    pub source: ChangeSource,
    pub author: Author,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_to_change: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    pub message: String,
}

/// Everything bound for one destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatedChange {
    pub destination: String,
    pub files: Vec<String>,
    pub recipients: Recipients,
    /// One entry per contributing [`Change`], in input order. Never deduplicated.
    pub messages: Vec<String>,
    pub source: ChangeSource,
    pub author: Author,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_to_change: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl From<Change> for AggregatedChange {
    fn from(change: Change) -> Self {
        Self {
            destination: change.destination,
            files: vec![change.file],
            recipients: change.recipients,
            messages: vec![change.message],
            source: change.source,
            author: change.author,
            link_to_change: change.link_to_change,
            timestamp: change.timestamp,
        }
    }
}

impl AggregatedChange {
    /// Fold a later change for the same destination into this one.
    pub fn absorb(&mut self, change: Change) {
        debug_assert_eq!(self.destination, change.destination);
        dedup_extend(&mut self.files, [change.file]);
        self.recipients.merge(change.recipients);
        self.messages.push(change.message);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

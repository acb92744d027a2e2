//! Per-directory rule file schema.
//!
//! ```yaml
//! pullRequest:
//!   destination: "#web-reviews"
//!   users: [alice@example.com]
//!   groups: [web-team]
//!   messageTemplate: "PR touching {{ pretty_name | join(sep=', ') }}"
//! commit:
//!   destination: "#web-deploys"
//! prettyName: [Web frontend]
//! messageTemplate: "{{ changed_file }}"
//! ```
//!
//! Every key is optional. A missing file and an empty document both parse to
//! [`RuleFile::default`].

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::ChangeKind;

/// The sub-rule applied for one [`ChangeKind`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KindRule {
    /// Channel to notify. Empty means "inherit from the parent directory".
    #[serde(alias = "channel")]
    pub destination: String,
    pub users: Vec<String>,
    pub groups: Vec<String>,
    pub message_template: String,
}

/// One parsed rule file.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RuleFile {
    pub pull_request: KindRule,
    pub commit: KindRule,
    pub pretty_name: Vec<String>,
    /// Fallback used when the per-kind template is empty.
    pub message_template: String,
}

impl RuleFile {
    /// Parse a rule file. `path` is only used to annotate errors.
    pub fn parse(path: &Path, contents: &[u8]) -> Result<Self, ConfigError> {
        if contents.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        let parsed: Option<RuleFile> =
            serde_yaml::from_slice(contents).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(parsed.unwrap_or_default())
    }

    pub fn rule(&self, kind: ChangeKind) -> &KindRule {
        match kind {
            ChangeKind::PullRequest => &self.pull_request,
            ChangeKind::Commit => &self.commit,
        }
    }

    /// The template this file contributes for `kind`, if any.
    pub fn template(&self, kind: ChangeKind) -> Option<&str> {
        let own = self.rule(kind).message_template.as_str();
        if !own.is_empty() {
            return Some(own);
        }
        if !self.message_template.is_empty() {
            return Some(self.message_template.as_str());
        }
        None
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

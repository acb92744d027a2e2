//! Template context: the variables a node's `messageTemplate` may reference.
//!
//! | variable          | value                                             |
//! |-------------------|---------------------------------------------------|
//! | `pretty_name`     | the node's `prettyName` list                      |
//! | `changed_file`    | the file whose resolution produced this node      |
//! | `directory`       | the directory the rule file was loaded for        |
//! | `kind`            | `pull-request` or `commit`                        |
//! | `destination`     | the node's own destination for `kind` (may be "") |
//! | `users`, `groups` | the node's own recipients for `kind`              |
//! | `pull_request`    | the node's whole `pullRequest` sub-rule           |
//! | `commit`          | the node's whole `commit` sub-rule                |
//!
//! Only the node's own fields are visible; inherited values are not.

use serde::Serialize;

use notify_core::{ChangeKind, KindRule, RuleFile};

use crate::error::TemplateError;

#[derive(Debug, Clone, Serialize)]
pub struct MessageContext<'a> {
    pub pretty_name: &'a [String],
    pub changed_file: &'a str,
    pub directory: &'a str,
    pub kind: ChangeKind,
    pub destination: &'a str,
    pub users: &'a [String],
    pub groups: &'a [String],
    pub pull_request: &'a KindRule,
    pub commit: &'a KindRule,
}

impl<'a> MessageContext<'a> {
    pub fn new(
        rule: &'a RuleFile,
        directory: &'a str,
        changed_file: &'a str,
        kind: ChangeKind,
    ) -> Self {
        let own = rule.rule(kind);
        Self {
            pretty_name: &rule.pretty_name,
            changed_file,
            directory,
            kind,
            destination: &own.destination,
            users: &own.users,
            groups: &own.groups,
            pull_request: &rule.pull_request,
            commit: &rule.commit,
        }
    }

    pub fn to_tera_context(&self) -> Result<tera::Context, TemplateError> {
        tera::Context::from_serialize(self).map_err(TemplateError::Context)
    }
}

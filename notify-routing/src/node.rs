//! Resolved rule chains and their inheritance queries.
//!
//! A [`ConfigChain`] owns one [`ConfigNode`] per ancestor level of a changed
//! file, index 0 being the file's own path. Each node's parent is the node
//! one level further out, towards the stop boundary, so `parent(i) == i + 1`
//! and the last node has none. Queries go through the borrowed [`NodeRef`].

use std::path::{Path, PathBuf};

use notify_core::{dedup, ChangeKind, Recipients, RuleFile};
use notify_renderer::{MessageContext, MessageRenderer};

use crate::error::RoutingError;

/// The rule loaded for one directory level. Empty when no rule file exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigNode {
    /// Directory this level stands for (`""` is the top of a relative path).
    pub directory: PathBuf,
    /// Where the rule file was looked up.
    pub rule_path: PathBuf,
    pub rule: RuleFile,
    parent: Option<usize>,
}

impl ConfigNode {
    pub fn new(directory: PathBuf, rule_path: PathBuf, rule: RuleFile) -> Self {
        Self {
            directory,
            rule_path,
            rule,
            parent: None,
        }
    }
}

/// The rule inheritance chain of one changed file.
#[derive(Debug, Clone)]
pub struct ConfigChain {
    changed_file: String,
    nodes: Vec<ConfigNode>,
}

impl ConfigChain {
    /// Link `levels` (already sorted innermost first) into a chain.
    ///
    /// An empty `levels` yields a single empty node for `changed_file`, so a
    /// chain always has a head.
    pub fn from_levels(changed_file: impl Into<String>, levels: Vec<ConfigNode>) -> Self {
        let changed_file = changed_file.into();
        let mut nodes = levels;
        if nodes.is_empty() {
            let dir = PathBuf::from(&changed_file);
            nodes.push(ConfigNode::new(dir.clone(), dir, RuleFile::default()));
        }
        let len = nodes.len();
        for (index, node) in nodes.iter_mut().enumerate() {
            node.parent = (index + 1 < len).then_some(index + 1);
        }
        Self {
            changed_file,
            nodes,
        }
    }

    pub fn changed_file(&self) -> &str {
        &self.changed_file
    }

    pub fn head(&self) -> NodeRef<'_> {
        NodeRef {
            chain: self,
            index: 0,
        }
    }

    /// Nodes innermost first.
    pub fn nodes(&self) -> &[ConfigNode] {
        &self.nodes
    }
}

/// A node inside a [`ConfigChain`], with access to its ancestors.
#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'a> {
    chain: &'a ConfigChain,
    index: usize,
}

impl<'a> NodeRef<'a> {
    pub fn node(&self) -> &'a ConfigNode {
        &self.chain.nodes[self.index]
    }

    pub fn parent(&self) -> Option<NodeRef<'a>> {
        self.node().parent.map(|index| NodeRef {
            chain: self.chain,
            index,
        })
    }

    /// Nearest non-empty destination for `kind`, or `""` if no level sets one.
    pub fn destination(&self, kind: ChangeKind) -> &'a str {
        let own = self.node().rule.rule(kind).destination.as_str();
        if !own.is_empty() {
            return own;
        }
        self.parent().map_or("", |parent| parent.destination(kind))
    }

    /// Own users for `kind` followed by every ancestor's, deduplicated.
    pub fn all_users(&self, kind: ChangeKind) -> Vec<String> {
        let mut users = self.node().rule.rule(kind).users.clone();
        if let Some(parent) = self.parent() {
            users.extend(parent.all_users(kind));
        }
        dedup(users)
    }

    /// Own groups for `kind` followed by every ancestor's, deduplicated.
    pub fn all_groups(&self, kind: ChangeKind) -> Vec<String> {
        let mut groups = self.node().rule.rule(kind).groups.clone();
        if let Some(parent) = self.parent() {
            groups.extend(parent.all_groups(kind));
        }
        dedup(groups)
    }

    pub fn recipients(&self, kind: ChangeKind) -> Recipients {
        Recipients {
            users: self.all_users(kind),
            groups: self.all_groups(kind),
        }
    }

    /// Compose the message for `kind`, outermost level first.
    ///
    /// A level without a template passes its parent's text through untouched.
    /// A level with one renders it against its own fields and appends it as
    /// `"{parent} - {local}"`, or alone when the parent text is empty.
    pub fn rendered_message(&self, kind: ChangeKind) -> Result<String, RoutingError> {
        let inherited = match self.parent() {
            Some(parent) => parent.rendered_message(kind)?,
            None => String::new(),
        };

        let node = self.node();
        let Some(template) = node.rule.template(kind) else {
            return Ok(inherited);
        };

        let directory = display_path(&node.directory);
        let name = display_path(&node.rule_path);
        let ctx = MessageContext::new(&node.rule, &directory, self.chain.changed_file(), kind);
        let local = MessageRenderer::render(&name, template, &ctx).map_err(|source| {
            RoutingError::Template {
                level: self.index,
                source,
            }
        })?;

        if inherited.is_empty() {
            Ok(local)
        } else {
            Ok(format!("{inherited} - {local}"))
        }
    }
}

pub(crate) fn display_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! Error types for notify-routing.

use std::path::PathBuf;

use thiserror::Error;

use notify_core::{ConfigError, TransportError};
use notify_renderer::TemplateError;

/// All errors that can abort a routing run.
///
/// Every variant names where it happened: the rule file and level, the
/// changed file, or the destination.
#[derive(Debug, Error)]
pub enum RoutingError {
    /// A content reader failed for one ancestor level.
    #[error("failed to fetch {path} (level {level}): {source}")]
    Fetch {
        path: PathBuf,
        level: usize,
        #[source]
        source: TransportError,
    },

    /// A rule file was fetched but is not valid.
    #[error("invalid rule file at level {level}: {source}")]
    Config {
        level: usize,
        #[source]
        source: ConfigError,
    },

    /// A message template failed to compile or render.
    #[error("template error at level {level}: {source}")]
    Template {
        level: usize,
        #[source]
        source: TemplateError,
    },

    /// Any of the above, attributed to the changed file being processed.
    #[error("failed to create change for file {file}: {source}")]
    File {
        file: String,
        #[source]
        source: Box<RoutingError>,
    },

    /// A message sender failed for one destination.
    #[error("failed to send message to {destination}: {source}")]
    Send {
        destination: String,
        #[source]
        source: TransportError,
    },

    /// A pull-request run was started without a pull-request number.
    #[error("pull request number is required for pull-request changes")]
    MissingPullRequestNumber,

    /// A spawned task panicked or was cancelled from outside.
    #[error("concurrent task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl RoutingError {
    pub(crate) fn for_file(self, file: impl Into<String>) -> Self {
        RoutingError::File {
            file: file.into(),
            source: Box::new(self),
        }
    }

    /// The innermost routing error, looking through [`RoutingError::File`].
    pub fn root(&self) -> &RoutingError {
        match self {
            RoutingError::File { source, .. } => source.root(),
            other => other,
        }
    }
}

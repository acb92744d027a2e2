//! Error types for notify-transport.

use thiserror::Error;

use notify_core::TransportError;

/// Failures talking to GitHub or Slack.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),

    #[error("invalid URL {url}: {message}")]
    Url { url: String, message: String },

    #[error("request to {target} failed: {source}")]
    Http {
        target: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{target} returned HTTP {status}: {body}")]
    Status {
        target: String,
        status: u16,
        body: String,
    },

    /// Slack answered `ok: false`.
    #[error("slack {method} failed: {error}")]
    Slack { method: &'static str, error: String },

    #[error("could not decode response from {target}: {message}")]
    Decode { target: String, message: String },

    #[error("invalid repository {0:?}, expected owner/name")]
    Repository(String),
}

impl From<ClientError> for TransportError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Status {
                target,
                status,
                body,
            } => TransportError::Status {
                target,
                status,
                body,
            },
            ClientError::Slack { method, error } => TransportError::Api {
                target: method.to_string(),
                reason: error,
            },
            ClientError::Decode { target, message } => TransportError::Decode { target, message },
            ClientError::Http { target, source } => TransportError::Request {
                target,
                message: source.to_string(),
            },
            other => TransportError::Request {
                target: "client".to_string(),
                message: other.to_string(),
            },
        }
    }
}

/// The GitHub Actions environment did not describe a usable event.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EventError {
    #[error("environment variable {0} is not set")]
    Missing(&'static str),

    #[error("cannot read a pull request number from ref {0:?}")]
    PullRequestRef(String),

    #[error("invalid repository {0:?}, expected owner/name")]
    Repository(String),
}

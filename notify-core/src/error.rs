//! Error types for notify-core.

use std::path::PathBuf;

use thiserror::Error;

/// A rule file existed but could not be understood.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// YAML parse error with the file path and serde_yaml's line context.
    #[error("failed to parse rule file at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Failure reported by a content-reader or message-sender collaborator.
///
/// Transport implementations map their client errors into this type so the
/// routing engine stays independent of any HTTP stack.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request never produced a usable response (DNS, TLS, timeout, ...).
    #[error("request to {target} failed: {message}")]
    Request { target: String, message: String },

    /// The remote answered with an unexpected HTTP status.
    #[error("{target} returned HTTP {status}: {body}")]
    Status {
        target: String,
        status: u16,
        body: String,
    },

    /// The remote answered successfully but reported an API-level error.
    #[error("{target} rejected the call: {reason}")]
    Api { target: String, reason: String },

    /// The response body could not be decoded.
    #[error("could not decode response from {target}: {message}")]
    Decode { target: String, message: String },

    /// Local I/O failure (filesystem reader).
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

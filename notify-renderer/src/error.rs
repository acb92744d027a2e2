//! Error types for notify-renderer.

use thiserror::Error;

/// A message template could not be turned into text.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// The template is not valid Tera syntax.
    #[error("malformed template '{name}': {source}")]
    Syntax {
        name: String,
        #[source]
        source: tera::Error,
    },

    /// The template parsed but referenced something the context lacks.
    #[error("failed to render template '{name}': {source}")]
    Render {
        name: String,
        #[source]
        source: tera::Error,
    },

    /// The rendering payload could not be converted into a tera context.
    #[error("context serialization error: {0}")]
    Context(#[source] tera::Error),
}

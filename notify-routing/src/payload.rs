//! Transport-neutral message content built from an [`AggregatedChange`].

use serde::Serialize;

use notify_core::AggregatedChange;

pub const NOTIFICATION_TITLE: &str = "Content change notification";

/// Display text with an optional hyperlink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// What a sender renders for one destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessagePayload {
    pub title: String,
    pub source: Link,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<Link>,
    pub files: Vec<String>,
    /// Contributing messages joined by newlines; empty ones are skipped.
    pub message: String,
}

impl MessagePayload {
    pub fn compose(change: &AggregatedChange) -> Self {
        let author = (!change.author.login.is_empty()).then(|| Link {
            text: change.author.login.clone(),
            url: change.author.url.clone(),
        });
        let message = change
            .messages
            .iter()
            .filter(|m| !m.is_empty())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("\n");
        Self {
            title: NOTIFICATION_TITLE.to_string(),
            source: Link {
                text: change.source.to_string(),
                url: change.link_to_change.clone(),
            },
            author,
            files: change.files.clone(),
            message,
        }
    }
}

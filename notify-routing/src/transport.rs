//! Collaborator seams: where rule files come from and where messages go.

use async_trait::async_trait;

use notify_core::{Recipients, TransportError};

use crate::payload::MessagePayload;

/// Reads repository content at a given revision.
#[async_trait]
pub trait ContentReader: Send + Sync {
    /// Returns `Ok(None)` when nothing exists at `path`; that is not an error.
    ///
    /// `path` is repository-relative with `/` separators.
    async fn get_contents(&self, path: &str, revision: &str)
        -> Result<Option<Vec<u8>>, TransportError>;
}

/// Delivers one composed notification to one destination.
#[async_trait]
pub trait MessageSender: Send + Sync {
    async fn send_message(
        &self,
        destination: &str,
        payload: &MessagePayload,
        recipients: &Recipients,
    ) -> Result<(), TransportError>;
}

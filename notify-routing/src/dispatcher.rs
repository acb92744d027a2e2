//! Concurrent delivery of aggregated changes.

use std::sync::Arc;

use tracing::{info, warn};

use notify_core::AggregatedChange;

use crate::error::RoutingError;
use crate::fan_out;
use crate::payload::MessagePayload;
use crate::transport::MessageSender;

pub struct Dispatcher {
    sender: Arc<dyn MessageSender>,
}

impl Dispatcher {
    pub fn new(sender: Arc<dyn MessageSender>) -> Self {
        Self { sender }
    }

    /// Send one message per destination, all at once.
    ///
    /// Every send runs to completion; the first failure observed is returned
    /// and later ones are only logged.
    pub async fn send_all(&self, changes: Vec<AggregatedChange>) -> Result<(), RoutingError> {
        let total = changes.len();
        fan_out::settle(changes, |_, change| {
            let sender = self.sender.clone();
            async move {
                let payload = MessagePayload::compose(&change);
                sender
                    .send_message(&change.destination, &payload, &change.recipients)
                    .await
                    .map_err(|source| {
                        warn!(destination = %change.destination, error = %source, "send failed");
                        RoutingError::Send {
                            destination: change.destination.clone(),
                            source,
                        }
                    })?;
                info!(
                    destination = %change.destination,
                    files = change.files.len(),
                    "notification sent"
                );
                Ok::<(), RoutingError>(())
            }
        })
        .await?;
        info!(destinations = total, "all notifications sent");
        Ok(())
    }
}

//! End-to-end routing: build, aggregate, dispatch.
//!
//! Each stage is awaited in full before the next starts.

use tracing::info;

use notify_core::{dedup, AggregatedChange, ChangeKind, ChangeMetadata};

use crate::aggregator::merge_common;
use crate::builder::ChangeBuilder;
use crate::dispatcher::Dispatcher;
use crate::error::RoutingError;

/// Drop blank entries and duplicates, keeping first-seen order.
pub fn prepare_changed_files<I, S>(files: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    dedup(
        files
            .into_iter()
            .map(|f| f.as_ref().trim().to_string())
            .filter(|f| !f.is_empty()),
    )
}

/// Resolve and aggregate without sending anything.
pub async fn plan(
    builder: &ChangeBuilder,
    files: &[String],
    kind: ChangeKind,
    metadata: &ChangeMetadata,
) -> Result<Vec<AggregatedChange>, RoutingError> {
    let changes = builder.create_changes(files, kind, metadata).await?;
    Ok(merge_common(changes))
}

/// The routing entry point used by the surrounding tool.
pub struct Notifier {
    builder: ChangeBuilder,
    dispatcher: Dispatcher,
}

impl Notifier {
    pub fn new(builder: ChangeBuilder, dispatcher: Dispatcher) -> Self {
        Self {
            builder,
            dispatcher,
        }
    }

    pub fn builder(&self) -> &ChangeBuilder {
        &self.builder
    }

    /// Route `changed_files` and send one message per destination.
    ///
    /// Returns what was sent. Zero destinations is a successful no-op; any
    /// failure before dispatch means nothing is sent.
    pub async fn resolve_destinations_and_send(
        &self,
        changed_files: &[String],
        kind: ChangeKind,
        metadata: &ChangeMetadata,
    ) -> Result<Vec<AggregatedChange>, RoutingError> {
        let files = prepare_changed_files(changed_files);
        if files.is_empty() {
            info!("no changed files");
            return Ok(Vec::new());
        }

        let aggregated = plan(&self.builder, &files, kind, metadata).await?;
        if aggregated.is_empty() {
            info!(files = files.len(), "no destinations matched");
            return Ok(aggregated);
        }

        self.dispatcher.send_all(aggregated.clone()).await?;
        Ok(aggregated)
    }
}

//! Per-file routing decisions.

use std::sync::Arc;

use tracing::{debug, info};

use notify_core::{Change, ChangeKind, ChangeMetadata, ChangeSource, ResolverSettings};

use crate::error::RoutingError;
use crate::fan_out;
use crate::resolver::ConfigResolver;
use crate::transport::ContentReader;

/// Turns changed file paths into [`Change`] records, one resolution per file.
#[derive(Clone)]
pub struct ChangeBuilder {
    reader: Arc<dyn ContentReader>,
    settings: Arc<ResolverSettings>,
}

impl ChangeBuilder {
    pub fn new(reader: Arc<dyn ContentReader>, settings: ResolverSettings) -> Self {
        Self {
            reader,
            settings: Arc::new(settings),
        }
    }

    pub fn settings(&self) -> &ResolverSettings {
        &self.settings
    }

    /// A resolver reading rule files at `revision`.
    pub fn resolver(&self, revision: &str) -> ConfigResolver {
        ConfigResolver::new(self.reader.clone(), self.settings.clone(), revision)
    }

    /// Resolve every file concurrently and return one [`Change`] per file that
    /// has a destination, in input order.
    ///
    /// The first failing file cancels the rest; no partial list is returned.
    pub async fn create_changes(
        &self,
        files: &[String],
        kind: ChangeKind,
        metadata: &ChangeMetadata,
    ) -> Result<Vec<Change>, RoutingError> {
        let source = source_for(kind, metadata)?;
        let resolver = self.resolver(&metadata.commit_sha);

        let per_file = fan_out::ordered(files.iter().cloned(), |_, file| {
            let resolver = resolver.clone();
            let source = source.clone();
            let metadata = metadata.clone();
            async move {
                build_change(&resolver, &file, kind, source, &metadata)
                    .await
                    .map_err(|err| err.for_file(file))
            }
        })
        .await?;

        let changes: Vec<Change> = per_file.into_iter().flatten().collect();
        info!(
            files = files.len(),
            changes = changes.len(),
            %kind,
            "routing decisions made"
        );
        Ok(changes)
    }
}

async fn build_change(
    resolver: &ConfigResolver,
    file: &str,
    kind: ChangeKind,
    source: ChangeSource,
    metadata: &ChangeMetadata,
) -> Result<Option<Change>, RoutingError> {
    let chain = resolver.resolve(file).await?;
    let head = chain.head();

    let message = head.rendered_message(kind)?;
    let destination = head.destination(kind);
    if destination.is_empty() {
        debug!(file, %kind, "no destination configured");
        return Ok(None);
    }

    debug!(file, destination, "file routed");
    Ok(Some(Change {
        destination: destination.to_string(),
        recipients: head.recipients(kind),
        file: file.to_string(),
        source,
        author: metadata.author.clone(),
        link_to_change: metadata.link_to_change.clone(),
        timestamp: metadata.timestamp,
        message,
    }))
}

/// Kind-specific identifiers taken from `metadata`.
pub fn source_for(kind: ChangeKind, metadata: &ChangeMetadata) -> Result<ChangeSource, RoutingError> {
    match kind {
        ChangeKind::PullRequest => metadata
            .pull_request_number
            .map(|number| ChangeSource::PullRequest { number })
            .ok_or(RoutingError::MissingPullRequestNumber),
        ChangeKind::Commit => Ok(ChangeSource::Commit {
            branch: metadata.branch.clone(),
            sha: metadata.commit_sha.clone(),
        }),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

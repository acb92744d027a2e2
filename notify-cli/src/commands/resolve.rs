//! `notify-on-change resolve`: local dry run against the working tree.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;

use notify_core::ChangeMetadata;
use notify_routing::{plan, prepare_changed_files, ChangeBuilder};
use notify_transport::FsContentReader;

use super::output::{print_json, print_table};
use crate::{ChangeKindArg, GlobalArgs};

/// Arguments for `notify-on-change resolve`.
#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Changed paths, relative to the workspace.
    #[arg(required = true)]
    pub files: Vec<String>,

    /// Which sub-rule applies: pull-request or commit.
    #[arg(long, default_value = "commit")]
    pub kind: ChangeKindArg,

    /// Pull request number (required with --kind pull-request).
    #[arg(long)]
    pub pr: Option<u64>,

    /// Commit the change belongs to.
    #[arg(long, default_value = "")]
    pub sha: String,

    /// Branch name shown as the change source.
    #[arg(long)]
    pub branch: Option<String>,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl ResolveArgs {
    pub async fn run(self, global: &GlobalArgs) -> Result<()> {
        let settings = global.settings();
        let reader = FsContentReader::new(settings.workspace_root.clone());
        let builder = ChangeBuilder::new(Arc::new(reader), settings);

        let files = prepare_changed_files(&self.files);
        let metadata = ChangeMetadata {
            pull_request_number: self.pr,
            branch: self.branch,
            commit_sha: self.sha,
            ..ChangeMetadata::default()
        };

        let aggregated = plan(&builder, &files, self.kind.0, &metadata)
            .await
            .with_context(|| format!("failed to resolve {} {} change(s)", files.len(), self.kind))?;

        if self.json {
            return print_json(&aggregated);
        }
        print_table(&aggregated, files.len());
        Ok(())
    }
}

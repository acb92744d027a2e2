//! `notify-on-change run`: handle the current GitHub Actions event.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use secrecy::SecretString;
use tracing::info;

use notify_core::{ChangeKind, ChangeMetadata};
use notify_routing::{ChangeBuilder, Dispatcher, Notifier};
use notify_transport::{github, slack, ChangeInfo, EventContext, GithubClient, SlackSender};

use super::output::print_table;
use crate::GlobalArgs;

/// Arguments for `notify-on-change run`.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// GitHub token; falls back to GITHUB_TOKEN.
    #[arg(long, env = "INPUT_GITHUB-TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    /// Slack bot token.
    #[arg(long, env = "INPUT_SLACK-TOKEN", hide_env_values = true)]
    pub slack_token: Option<String>,

    /// GitHub REST API root.
    #[arg(long, env = "GITHUB_API_URL", default_value = github::DEFAULT_API_URL)]
    pub github_api_url: String,

    /// Slack Web API root.
    #[arg(long, default_value = slack::DEFAULT_API_URL)]
    pub slack_api_url: String,
}

impl RunArgs {
    pub async fn run(self, global: &GlobalArgs) -> Result<()> {
        let github_token = self
            .github_token
            .filter(|t| !t.is_empty())
            .or_else(|| std::env::var("GITHUB_TOKEN").ok().filter(|t| !t.is_empty()))
            .map(SecretString::from)
            .context("a GitHub token is required (--github-token or GITHUB_TOKEN)")?;
        let slack_token = self
            .slack_token
            .filter(|t| !t.is_empty())
            .map(SecretString::from)
            .context("a Slack token is required (--slack-token)")?;

        let event = EventContext::from_env().context("failed to read the GitHub Actions event")?;
        info!(
            repository = %event.repository,
            event = %event.event_name,
            kind = %event.kind,
            "handling event"
        );

        let github = GithubClient::new(github_token, &event.repository)
            .and_then(|c| c.with_api_url(&self.github_api_url))
            .context("failed to create GitHub client")?;
        let change = fetch_change_info(&github, &event).await?;
        let metadata = ChangeMetadata {
            pull_request_number: event.pull_request_number,
            branch: event.branch.clone().or(change.base_ref.clone()),
            commit_sha: event.sha.clone(),
            author: change.author.clone(),
            link_to_change: change.link_to_change.clone(),
            timestamp: change.timestamp,
        };

        let slack = SlackSender::new(slack_token)
            .and_then(|s| s.with_api_url(&self.slack_api_url))
            .context("failed to create Slack client")?
            .authenticate()
            .await
            .context("Slack token was rejected")?;

        let notifier = Notifier::new(
            ChangeBuilder::new(Arc::new(github), global.settings()),
            Dispatcher::new(Arc::new(slack)),
        );
        let sent = notifier
            .resolve_destinations_and_send(&change.changed_files, event.kind, &metadata)
            .await
            .context("failed to notify")?;

        print_table(&sent, change.changed_files.len());
        Ok(())
    }
}

async fn fetch_change_info(github: &GithubClient, event: &EventContext) -> Result<ChangeInfo> {
    match (event.kind, event.pull_request_number) {
        (ChangeKind::PullRequest, Some(number)) => github
            .pull_request_info(number)
            .await
            .with_context(|| format!("failed to fetch pull request #{number}")),
        (ChangeKind::PullRequest, None) => {
            anyhow::bail!("pull request event without a pull request number")
        }
        (ChangeKind::Commit, _) => github
            .commit_info(&event.sha)
            .await
            .with_context(|| format!("failed to fetch commit {}", event.sha)),
    }
}

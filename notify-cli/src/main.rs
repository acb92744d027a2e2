//! notify-on-change: route repository changes to chat channels.
//!
//! # Usage
//!
//! ```text
//! notify-on-change run
//! notify-on-change resolve <files>... [--kind pull-request|commit] [--pr N] [--sha S] [--branch B] [--json]
//! ```
//!
//! Global flags: `--workspace`, `--config-file-name`, `--stop-marker`,
//! `--log-format text|json`.

mod commands;

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use commands::{resolve::ResolveArgs, run::RunArgs};
use notify_core::settings::{DEFAULT_CONFIG_FILE_NAME, DEFAULT_STOP_MARKER};
use notify_core::{ChangeKind, ResolverSettings};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "notify-on-change",
    version,
    about = "Notify chat channels about changed files, routed by per-directory rule files",
    long_about = None,
)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Flags shared by every subcommand.
#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Repository checkout; stop markers are looked up here.
    #[arg(long, global = true, env = "GITHUB_WORKSPACE", default_value = ".")]
    pub workspace: PathBuf,

    /// Rule file name looked up in every directory.
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE_NAME)]
    pub config_file_name: String,

    /// Entry whose presence stops the upward walk.
    #[arg(long, global = true, default_value = DEFAULT_STOP_MARKER)]
    pub stop_marker: String,

    /// Log output format: text or json.
    #[arg(long, global = true, default_value = "text")]
    pub log_format: LogFormat,
}

impl GlobalArgs {
    pub fn settings(&self) -> ResolverSettings {
        ResolverSettings::new(&self.workspace)
            .with_config_file_name(&self.config_file_name)
            .with_stop_marker(&self.stop_marker)
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Handle the current GitHub Actions event and send notifications.
    Run(RunArgs),

    /// Show where changed files would be routed, reading rule files locally.
    Resolve(ResolveArgs),
}

// ---------------------------------------------------------------------------
// Argument wrappers
// ---------------------------------------------------------------------------

/// Thin wrapper so clap can parse `ChangeKind` from CLI args.
#[derive(Debug, Clone, Copy)]
pub struct ChangeKindArg(pub ChangeKind);

impl FromStr for ChangeKindArg {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pull-request" | "pull_request" | "pr" => Ok(Self(ChangeKind::PullRequest)),
            "commit" | "push" => Ok(Self(ChangeKind::Commit)),
            other => Err(format!(
                "unknown change kind '{other}'; expected: pull-request, commit"
            )),
        }
    }
}

impl fmt::Display for ChangeKindArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format '{other}'; expected: text, json")),
        }
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.global.log_format);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    runtime.block_on(async move {
        match cli.command {
            Commands::Run(args) => args.run(&cli.global).await,
            Commands::Resolve(args) => args.run(&cli.global).await,
        }
    })
}

/// Logs go to stderr so stdout stays machine-readable.
fn init_tracing(format: LogFormat) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    let _ = match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}

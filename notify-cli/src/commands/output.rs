//! Rendering of routing results for humans and machines.

use anyhow::{Context, Result};
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use notify_core::AggregatedChange;

#[derive(Tabled)]
struct DestinationRow {
    #[tabled(rename = "destination")]
    destination: String,
    #[tabled(rename = "files")]
    files: String,
    #[tabled(rename = "users")]
    users: String,
    #[tabled(rename = "groups")]
    groups: String,
    #[tabled(rename = "message")]
    message: String,
}

pub fn print_json(changes: &[AggregatedChange]) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(changes).context("failed to serialize routing result")?
    );
    Ok(())
}

pub fn print_table(changes: &[AggregatedChange], files_considered: usize) {
    if changes.is_empty() {
        println!(
            "{} {} file(s) matched no destination.",
            "∅".bright_black(),
            files_considered
        );
        return;
    }

    let rows: Vec<DestinationRow> = changes
        .iter()
        .map(|change| DestinationRow {
            destination: change.destination.clone(),
            files: change.files.join("\n"),
            users: change.recipients.users.join(", "),
            groups: change.recipients.groups.join(", "),
            message: change
                .messages
                .iter()
                .filter(|m| !m.is_empty())
                .cloned()
                .collect::<Vec<_>>()
                .join("\n"),
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
    println!(
        "{} {} destination(s) for {} file(s)",
        "✓".green(),
        changes.len(),
        files_considered
    );
}

//! Per-destination folding of per-file changes.

use std::collections::BTreeMap;

use notify_core::{AggregatedChange, Change};

/// Fold `changes` in input order into one [`AggregatedChange`] per
/// destination, sorted by destination name.
///
/// Files and recipients are unioned without duplicates; messages are appended
/// as they come, duplicates included. Changes without a destination are
/// dropped.
pub fn merge_common(changes: Vec<Change>) -> Vec<AggregatedChange> {
    let mut by_destination: BTreeMap<String, AggregatedChange> = BTreeMap::new();
    for change in changes {
        if change.destination.is_empty() {
            continue;
        }
        match by_destination.get_mut(&change.destination) {
            Some(existing) => existing.absorb(change),
            None => {
                by_destination.insert(change.destination.clone(), AggregatedChange::from(change));
            }
        }
    }
    by_destination.into_values().collect()
}

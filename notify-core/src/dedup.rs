//! Order-preserving deduplication used for files, users and groups.

use std::collections::HashSet;

/// Returns `items` with every repeated value removed, keeping the first
/// occurrence of each value in its original position.
pub fn dedup<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut out = Vec::new();
    dedup_extend(&mut out, items);
    out
}

/// Appends the values of `items` not already present in `target`.
///
/// `target` is assumed to be duplicate-free already; the result stays so.
pub fn dedup_extend<I, S>(target: &mut Vec<String>, items: I)
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut seen: HashSet<String> = target.iter().cloned().collect();
    for item in items {
        let item = item.into();
        if seen.insert(item.clone()) {
            target.push(item);
        }
    }
}

//! Snapshot Views
//!
//! Turns snapshots into readable change descriptions and serializable summaries.
//! A description compares a snapshot with the one before it in the same chain:
//! the first capture reads `create "<name>"`, later ones `edit "<previous name>"`
//! followed by one indented line per difference, or `no change to "<name>"`.

use crate::history::{HistoryView, Snapshot};
use crate::tag::TagSet;
use crate::tree::{DirectoryState, ItemState};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};

const TIMESTAMP: &str = "%a %b %d %H:%M:%S %Z %Y";

fn stamp(at: DateTime<Utc>) -> String {
    at.format(TIMESTAMP).to_string()
}

fn folder(path: &Path) -> String {
    path.parent()
        .map(|p| p.display().to_string())
        .unwrap_or_default()
}

fn tag_list(tags: &[&String]) -> String {
    let quoted: Vec<String> = tags.iter().map(|t| format!("\"{}\"", t)).collect();
    format!("[{}]", quoted.join(", "))
}

fn tag_change(verb: &str, tags: Vec<&String>) -> Option<String> {
    match tags.as_slice() {
        [] => None,
        [one] => Some(format!("\n\t{} tag \"{}\"", verb, one)),
        many => Some(format!("\n\t{} tags {}", verb, tag_list(many))),
    }
}

fn diff<'a>(from: &'a TagSet, to: &'a TagSet) -> Vec<&'a String> {
    from.difference(to).collect()
}

/// Describe what changed in an image snapshot.
///
/// Lines appear in a fixed order: move, base-name change, added tags,
/// removed tags, final tagged name.
pub fn describe_item(snap: &Snapshot<ItemState>) -> String {
    let current = snap.state();
    let Some(previous) = snap.previous().map(|p| p.state()) else {
        return format!("{} create \"{}\"", stamp(snap.taken_at()), current.base);
    };

    let mut out = format!("{} edit \"{}\"", stamp(snap.taken_at()), previous.base);
    let mut changed = false;

    if previous.parent != current.parent {
        out.push_str(&format!(
            "\n\tMove from:\t{}\n\tto:\t\t{}",
            folder(&previous.path),
            folder(&current.path)
        ));
        changed = true;
    }

    if previous.base != current.base {
        out.push_str(&format!(
            "\n\tRe-name from \"{}\" to \"{}\"",
            previous.base, current.base
        ));
        changed = true;
    }

    if previous.tags != current.tags {
        changed = true;
        if let Some(line) = tag_change("Add", diff(&current.tags, &previous.tags)) {
            out.push_str(&line);
        }
        if let Some(line) = tag_change("Remove", diff(&previous.tags, &current.tags)) {
            out.push_str(&line);
        }
    }

    let tagged = current.tagged_name();
    if previous.tagged_name() != tagged {
        out.push_str(&format!("\n\t\tFinal tagged name \"{}\"", tagged));
        changed = true;
    }

    if changed {
        out
    } else {
        format!("{} no change to \"{}\"", stamp(snap.taken_at()), previous.base)
    }
}

fn names<K>(children: &std::collections::BTreeMap<K, String>) -> String {
    let mut names: Vec<&str> = children.values().map(String::as_str).collect();
    names.sort_unstable();
    format!("[{}]", names.join(", "))
}

/// Describe what changed in a directory snapshot.
pub fn describe_directory(snap: &Snapshot<DirectoryState>) -> String {
    let current = snap.state();
    let Some(previous) = snap.previous().map(|p| p.state()) else {
        return format!("{} create \"{}\"", stamp(snap.taken_at()), current.name);
    };

    let mut out = format!("{} edit \"{}\"", stamp(snap.taken_at()), previous.name);

    if previous.parent != current.parent {
        out.push_str(&format!(
            "\n\tMove from:\t{}\n\tto:\t\t{}",
            folder(&previous.path),
            folder(&current.path)
        ));
    }
    if previous.name != current.name {
        out.push_str(&format!(
            "\n\tRe-name from \"{}\" to \"{}\"",
            previous.name, current.name
        ));
    }
    if previous.subdirectories != current.subdirectories {
        out.push_str(&format!(
            "\n\tChange subdirectories from {} to {}",
            names(&previous.subdirectories),
            names(&current.subdirectories)
        ));
    }
    if previous.items != current.items {
        out.push_str(&format!(
            "\n\tChange images from {} to {}",
            names(&previous.items),
            names(&current.items)
        ));
    }
    out
}

/// One history row, ready for tables or JSON.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct HistoryEntry {
    /// Rank for `revert --rank`; `None` for the latest snapshot.
    pub rank: Option<usize>,
    pub sequence: u64,
    pub taken_at: DateTime<Utc>,
    pub path: PathBuf,
    pub description: String,
}

/// Latest first. The latest snapshot has no rank; the one before it is rank 0.
pub fn item_history(view: HistoryView<'_, ItemState>) -> Vec<HistoryEntry> {
    entries(view, |s| s.path.clone(), describe_item)
}

pub fn directory_history(view: HistoryView<'_, DirectoryState>) -> Vec<HistoryEntry> {
    entries(view, |s| s.path.clone(), describe_directory)
}

fn entries<S>(
    view: HistoryView<'_, S>,
    path: impl Fn(&S) -> PathBuf,
    describe: impl Fn(&Snapshot<S>) -> String,
) -> Vec<HistoryEntry> {
    view.iter()
        .enumerate()
        .map(|(position, snap)| HistoryEntry {
            rank: position.checked_sub(1),
            sequence: snap.sequence(),
            taken_at: snap.taken_at(),
            path: path(snap.state()),
            description: describe(snap),
        })
        .collect()
}

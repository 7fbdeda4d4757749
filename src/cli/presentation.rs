//! CLI presentation: text and json formatters per command.

use crate::error::ApiError;
use crate::views::HistoryEntry;
use comfy_table::presets::{UTF8_BORDERS_ONLY, UTF8_FULL};
use comfy_table::Table;
use owo_colors::OwoColorize;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Outcome of scanning one root.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ScanRow {
    pub root: PathBuf,
    pub directories: usize,
    pub images: usize,
    pub skipped: usize,
    pub absorbed_roots: usize,
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, ApiError> {
    Ok(serde_json::to_string_pretty(value)?)
}

pub fn format_scan_result(rows: &[ScanRow], format: &str) -> Result<String, ApiError> {
    if format == "json" {
        return to_json(rows);
    }
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Root", "Folders", "Images", "Skipped"]);
    for row in rows {
        table.add_row(vec![
            row.root.display().to_string(),
            row.directories.to_string(),
            row.images.to_string(),
            row.skipped.to_string(),
        ]);
    }
    Ok(table.to_string())
}

pub fn format_tags_result(tags: &[String], format: &str) -> Result<String, ApiError> {
    if format == "json" {
        return to_json(tags);
    }
    if tags.is_empty() {
        return Ok("No tags yet.".to_string());
    }
    Ok(tags
        .iter()
        .map(|t| format!("@{}", t))
        .collect::<Vec<_>>()
        .join("\n"))
}

pub fn format_history_result(entries: &[HistoryEntry], format: &str) -> Result<String, ApiError> {
    if format == "json" {
        return to_json(entries);
    }
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Rank", "Change"]);
    for entry in entries {
        let rank = entry
            .rank
            .map(|r| r.to_string())
            .unwrap_or_else(|| "latest".to_string());
        table.add_row(vec![rank, entry.description.clone()]);
    }
    Ok(table.to_string())
}

/// One line per logged image change, blank line between entries.
pub fn format_log_result(lines: &[String]) -> String {
    if lines.is_empty() {
        return "No changes.".to_string();
    }
    lines.join("\n\n")
}

pub fn format_change(verb: &str, path: &Path) -> String {
    format!("{} {}", verb.green().bold(), path.display())
}

//! Directory listing for scans: one level at a time, sorted, with ignore rules.

use crate::error::ModelError;
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

/// Which directory entries a scan skips.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Entry names to skip (matched against the entry's own name)
    #[serde(default = "default_ignore_patterns")]
    pub ignore_patterns: Vec<String>,

    /// Skip names starting with a dot
    #[serde(default = "default_true")]
    pub skip_hidden: bool,
}

fn default_ignore_patterns() -> Vec<String> {
    vec![".git".to_string(), ".thumbnails".to_string()]
}

fn default_true() -> bool {
    true
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            ignore_patterns: default_ignore_patterns(),
            skip_hidden: default_true(),
        }
    }
}

impl ScanConfig {
    /// Check if an entry should be ignored based on its own name.
    pub fn should_ignore(&self, path: &Path) -> bool {
        let name = match path.components().next_back() {
            Some(Component::Normal(name)) => name.to_string_lossy(),
            _ => return false,
        };

        if self.skip_hidden && name.starts_with('.') {
            return true;
        }

        self.ignore_patterns
            .iter()
            .any(|pattern| name == pattern.as_str())
    }
}

/// List the entries directly inside `dir`, sorted by file name.
pub fn list_children(dir: &Path) -> Result<Vec<PathBuf>, ModelError> {
    let mut children = Vec::new();

    let walker = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(false)
        .sort_by_file_name();

    for entry in walker {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(dir).to_path_buf();
            let source = e
                .into_io_error()
                .unwrap_or_else(|| std::io::Error::new(std::io::ErrorKind::Other, "walk loop"));
            ModelError::io(path, source)
        })?;
        children.push(entry.into_path());
    }

    Ok(children)
}

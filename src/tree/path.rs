//! Path canonicalization and file-kind helpers

use crate::error::ModelError;
use std::path::{Path, PathBuf};
use unicode_normalization::UnicodeNormalization;

/// Canonicalize and normalize a path so that equal locations compare equal
///
/// This function:
/// 1. Canonicalizes the path (resolves symlinks, `..`, `.`)
/// 2. Normalizes Unicode to NFC
/// 3. Removes trailing slashes (except root)
pub fn canonicalize_path(path: &Path) -> Result<PathBuf, ModelError> {
    // Use dunce for cross-platform canonicalization
    let canonical = dunce::canonicalize(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ModelError::not_found(path),
        _ => ModelError::io(path, e),
    })?;

    Ok(PathBuf::from(normalize_path_string(&canonical.to_string_lossy())))
}

/// Normalize a path string (without filesystem access)
pub fn normalize_path_string(path: &str) -> String {
    // Normalize Unicode to NFC
    let mut result: String = path.nfc().collect();

    // Remove trailing slashes (except root)
    if result.len() > 1 {
        while result.ends_with('/') || result.ends_with('\\') {
            result.pop();
        }
    }

    result
}

/// True if the file name maps to an `image/*` media type.
pub fn is_image(path: &Path) -> bool {
    mime_guess::from_path(path)
        .first()
        .map(|mime| mime.type_() == mime_guess::mime::IMAGE)
        .unwrap_or(false)
}

/// Final component of `path` as UTF-8.
pub fn file_name(path: &Path) -> Result<&str, ModelError> {
    path.file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| ModelError::InvalidName(path.display().to_string()))
}

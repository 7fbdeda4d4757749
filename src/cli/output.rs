//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::{ApiError, ModelError};

/// Map domain/service errors to a string for CLI output.
pub fn map_error(e: &ApiError) -> String {
    match e {
        ApiError::Model(ModelError::Io { path, source }) => {
            format!("Filesystem error on {}: {}. Nothing was changed.", path.display(), source)
        }
        other => other.to_string(),
    }
}

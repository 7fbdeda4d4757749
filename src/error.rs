//! Error types for the tagtree model and its command surface.

use chrono::{DateTime, Utc};
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the entity model, the tag codec and the accessor.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("Not an image: {0}")]
    NotAnImage(PathBuf),

    #[error("Invalid name: {0:?}")]
    InvalidName(String),

    #[error("Invalid tag: {0:?}")]
    InvalidTag(String),

    #[error("Cannot move {subject} under itself ({target})")]
    CyclicMove { subject: PathBuf, target: PathBuf },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("History went backwards: latest snapshot at {previous}, new snapshot at {attempted}")]
    NonMonotonicTime {
        previous: DateTime<Utc>,
        attempted: DateTime<Utc>,
    },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl ModelError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ModelError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn not_found(path: &std::path::Path) -> Self {
        ModelError::NotFound(path.display().to_string())
    }

    /// True for the errors that leave the model in its previous state after a rollback.
    pub fn is_io(&self) -> bool {
        matches!(self, ModelError::Io { .. })
    }
}

/// Errors surfaced by configuration, logging and the CLI.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Model(#[from] ModelError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Output error: {0}")]
    OutputError(String),

    #[error("Path not tracked: {0}. Add its folder with `tagtree --root <dir> scan`.")]
    PathNotTracked(PathBuf),

    #[error("Batch line {line}: {message}")]
    InvalidCommand { line: usize, message: String },
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::OutputError(err.to_string())
    }
}

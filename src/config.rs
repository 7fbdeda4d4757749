//! Configuration System
//!
//! Layered configuration loaded with the `config` crate: built-in defaults,
//! a per-user file, workspace files and `TAGTREE__` environment overrides.

use crate::logging::LoggingConfig;
use crate::tree::walker::ScanConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

mod facade;
mod merge;
mod sources;

pub use facade::ConfigLoader;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TagtreeConfig {
    /// Which folders to track and how to scan them
    #[serde(default)]
    pub library: LibraryConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LibraryConfig {
    /// Folders scanned when no `--root` is given
    #[serde(default)]
    pub roots: Vec<PathBuf>,

    #[serde(default)]
    pub scan: ScanConfig,
}

/// Configuration validation errors
#[derive(Debug, Clone)]
pub enum ValidationError {
    Library(String),
    Logging(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Library(msg) => write!(f, "Library: {}", msg),
            ValidationError::Logging(msg) => write!(f, "Logging: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl LibraryConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.roots.iter().any(|root| root.as_os_str().is_empty()) {
            return Err("Root path cannot be empty".to_string());
        }
        if self.scan.ignore_patterns.iter().any(|p| p.trim().is_empty()) {
            return Err("Ignore patterns cannot be empty".to_string());
        }
        Ok(())
    }
}

impl TagtreeConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(e) = self.library.validate() {
            errors.push(ValidationError::Library(e));
        }
        if let Err(e) = self.logging.validate() {
            errors.push(ValidationError::Logging(e));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

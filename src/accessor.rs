//! Filesystem access capability.
//!
//! The model never touches the filesystem itself; every read, move and mkdir
//! goes through an [`Accessor`]. [`FsAccessor`] is the real implementation.

use crate::error::ModelError;
use crate::tree::{path, walker};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

pub trait Accessor: Send + Sync {
    fn exists(&self, path: &Path) -> bool;

    fn is_directory(&self, path: &Path) -> bool;

    /// Canonical, NFC-normalized form of an existing path. Fails with `NotFound`.
    fn to_real_path(&self, path: &Path) -> Result<PathBuf, ModelError>;

    /// Move or rename `from` to `to`. Never replaces an existing `to`.
    fn move_path(&self, from: &Path, to: &Path) -> Result<(), ModelError>;

    fn new_input_stream(&self, path: &Path) -> Result<Box<dyn Read + Send>, ModelError>;

    fn new_output_stream(&self, path: &Path) -> Result<Box<dyn Write + Send>, ModelError>;

    fn create_directory(&self, path: &Path) -> Result<(), ModelError>;

    /// Entries directly inside `path`, sorted by name.
    fn list_children(&self, path: &Path) -> Result<Vec<PathBuf>, ModelError>;
}

/// Accessor backed by `std::fs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsAccessor;

impl FsAccessor {
    pub fn new() -> Self {
        Self
    }

    /// A case-only rename on a case-insensitive filesystem sees `to` as existing.
    fn same_file(from: &Path, to: &Path) -> bool {
        match (dunce::canonicalize(from), dunce::canonicalize(to)) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    }
}

impl Accessor for FsAccessor {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_directory(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn to_real_path(&self, path: &Path) -> Result<PathBuf, ModelError> {
        path::canonicalize_path(path)
    }

    #[instrument(skip(self), fields(from = %from.display(), to = %to.display()))]
    fn move_path(&self, from: &Path, to: &Path) -> Result<(), ModelError> {
        if to.exists() && !Self::same_file(from, to) {
            return Err(ModelError::io(
                to,
                io::Error::new(io::ErrorKind::AlreadyExists, "destination already exists"),
            ));
        }
        fs::rename(from, to).map_err(|e| ModelError::io(from, e))?;
        debug!("Moved");
        Ok(())
    }

    fn new_input_stream(&self, path: &Path) -> Result<Box<dyn Read + Send>, ModelError> {
        let file = fs::File::open(path).map_err(|e| ModelError::io(path, e))?;
        Ok(Box::new(io::BufReader::new(file)))
    }

    fn new_output_stream(&self, path: &Path) -> Result<Box<dyn Write + Send>, ModelError> {
        let file = fs::File::create(path).map_err(|e| ModelError::io(path, e))?;
        Ok(Box::new(io::BufWriter::new(file)))
    }

    fn create_directory(&self, path: &Path) -> Result<(), ModelError> {
        fs::create_dir(path).map_err(|e| ModelError::io(path, e))
    }

    fn list_children(&self, path: &Path) -> Result<Vec<PathBuf>, ModelError> {
        walker::list_children(path)
    }
}

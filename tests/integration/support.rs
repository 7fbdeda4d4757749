//! Shared fixtures: a temporary library on disk, a stepping clock and an
//! accessor whose moves can be made to fail on demand.

use chrono::{DateTime, Duration, TimeZone, Utc};
use parking_lot::Mutex;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tagtree::accessor::{Accessor, FsAccessor};
use tagtree::context::Context;
use tagtree::error::ModelError;
use tagtree::history::ManualClock;
use tagtree::registry::Registry;
use tagtree::tree::path::canonicalize_path;
use tagtree::types::{DirectoryId, ItemId};
use tempfile::TempDir;

/// Switches shared between a test and its [`FaultyAccessor`].
#[derive(Debug, Clone, Default)]
pub struct Faults {
    fail_all: Arc<AtomicBool>,
    fail_into: Arc<Mutex<Option<PathBuf>>>,
}

impl Faults {
    /// Every move fails.
    pub fn fail_all_moves(&self) {
        self.fail_all.store(true, Ordering::SeqCst);
    }

    /// Moves whose destination is `path` or lies under it fail.
    pub fn fail_moves_into(&self, path: &Path) {
        *self.fail_into.lock() = Some(path.to_path_buf());
    }

    pub fn clear(&self) {
        self.fail_all.store(false, Ordering::SeqCst);
        *self.fail_into.lock() = None;
    }

    fn should_fail(&self, to: &Path) -> bool {
        if self.fail_all.load(Ordering::SeqCst) {
            return true;
        }
        match &*self.fail_into.lock() {
            Some(prefix) => to.starts_with(prefix),
            None => false,
        }
    }
}

/// Real filesystem access with injectable move failures.
#[derive(Debug, Clone, Default)]
pub struct FaultyAccessor {
    inner: FsAccessor,
    faults: Faults,
}

impl Accessor for FaultyAccessor {
    fn exists(&self, path: &Path) -> bool {
        self.inner.exists(path)
    }

    fn is_directory(&self, path: &Path) -> bool {
        self.inner.is_directory(path)
    }

    fn to_real_path(&self, path: &Path) -> Result<PathBuf, ModelError> {
        self.inner.to_real_path(path)
    }

    fn move_path(&self, from: &Path, to: &Path) -> Result<(), ModelError> {
        if self.faults.should_fail(to) {
            return Err(ModelError::io(
                to,
                io::Error::new(io::ErrorKind::PermissionDenied, "injected failure"),
            ));
        }
        self.inner.move_path(from, to)
    }

    fn new_input_stream(&self, path: &Path) -> Result<Box<dyn Read + Send>, ModelError> {
        self.inner.new_input_stream(path)
    }

    fn new_output_stream(&self, path: &Path) -> Result<Box<dyn Write + Send>, ModelError> {
        self.inner.new_output_stream(path)
    }

    fn create_directory(&self, path: &Path) -> Result<(), ModelError> {
        self.inner.create_directory(path)
    }

    fn list_children(&self, path: &Path) -> Result<Vec<PathBuf>, ModelError> {
        self.inner.list_children(path)
    }
}

pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2020, 1, 1, 12, 0, 0).unwrap()
}

/// A library folder in a temp dir plus a context over it. Every clock
/// reading is one second after the previous one.
pub struct Fixture {
    _temp_dir: TempDir,
    pub root: PathBuf,
    pub clock: Arc<ManualClock>,
    pub faults: Faults,
    pub ctx: Context,
}

impl Fixture {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("library");
        fs::create_dir(&root).unwrap();
        let root = canonicalize_path(&root).unwrap();

        let faults = Faults::default();
        let accessor = FaultyAccessor {
            inner: FsAccessor::new(),
            faults: faults.clone(),
        };
        let clock = Arc::new(ManualClock::stepping(start_time(), Duration::seconds(1)));
        let ctx = Context::with_clock(accessor, clock.clone());

        Self {
            _temp_dir: temp_dir,
            root,
            clock,
            faults,
            ctx,
        }
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    pub fn mkdir(&self, relative: &str) -> PathBuf {
        let path = self.path(relative);
        fs::create_dir_all(&path).unwrap();
        path
    }

    pub fn touch(&self, relative: &str) -> PathBuf {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, relative.as_bytes()).unwrap();
        path
    }

    pub fn exists(&self, relative: &str) -> bool {
        self.path(relative).exists()
    }

    /// Track the library folder as the only root.
    pub fn scan(&self) -> Registry {
        let mut registry = Registry::new();
        registry.add_root(&self.ctx, &self.root).unwrap();
        registry
    }

    pub fn item(&self, registry: &Registry, relative: &str) -> ItemId {
        registry.resolve_item(&self.ctx, &self.path(relative)).unwrap()
    }

    pub fn dir(&self, registry: &Registry, relative: &str) -> DirectoryId {
        registry.resolve_dir(&self.ctx, &self.path(relative)).unwrap()
    }
}

//! Registry
//!
//! Owns the entity tree, the set of roots and the tag vocabulary. Roots never
//! overlap: adding a folder that lies inside an existing root is rejected,
//! and adding a folder that encloses existing roots absorbs them.

use crate::context::Context;
use crate::error::ModelError;
use crate::tree::path::is_image;
use crate::tree::walker::ScanConfig;
use crate::tree::Tree;
use crate::types::{DirectoryId, EntityId, ItemId, Parent};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, trace, warn};

#[derive(Debug, Default)]
pub struct Registry {
    tree: Tree,
    vocabulary: BTreeSet<String>,
    scan: ScanConfig,
}

/// Counts from one `add_root` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanReport {
    pub directories: usize,
    pub images: usize,
    pub skipped: usize,
    pub absorbed_roots: usize,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scan_config(scan: ScanConfig) -> Self {
        Self {
            scan,
            ..Self::default()
        }
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// Mutable access for the entity operations.
    pub fn tree_mut(&mut self) -> &mut Tree {
        &mut self.tree
    }

    pub fn roots(&self) -> Vec<DirectoryId> {
        self.tree.roots()
    }

    pub fn root_paths(&self) -> Result<Vec<PathBuf>, ModelError> {
        self.roots()
            .into_iter()
            .map(|root| self.tree.directory_path(root))
            .collect()
    }

    /// Track `path` as a root and scan everything beneath it.
    ///
    /// Existing roots inside `path` are hung under the new tree instead of
    /// being scanned again.
    #[instrument(skip(self, ctx, path), fields(path = %path.display()))]
    pub fn add_root(&mut self, ctx: &Context, path: &Path) -> Result<(DirectoryId, ScanReport), ModelError> {
        if !ctx.accessor().is_directory(path) {
            return Err(ModelError::NotADirectory(path.to_path_buf()));
        }
        let real = ctx.accessor().to_real_path(path)?;

        let mut enclosed = BTreeMap::new();
        for root in self.roots() {
            let root_path = self.tree.directory_path(root)?;
            if real.starts_with(&root_path) {
                return Err(ModelError::InvalidArgument(format!(
                    "{} is already tracked under root {}",
                    real.display(),
                    root_path.display()
                )));
            }
            if root_path.starts_with(&real) {
                enclosed.insert(root_path, root);
            }
        }

        let id = self.tree.track_root(ctx, &real)?;
        let mut report = ScanReport {
            directories: 1,
            ..ScanReport::default()
        };
        self.scan_directory(ctx, id, &real, &mut enclosed, &mut report);

        // Enclosed roots the scan never reached (ignored or unreadable folders on the way).
        for root_path in enclosed.keys() {
            warn!(root = %root_path.display(), "Enclosed root not reached by scan, left as a separate root");
        }

        info!(
            root = %id,
            directories = report.directories,
            images = report.images,
            skipped = report.skipped,
            absorbed = report.absorbed_roots,
            "Root added"
        );
        Ok((id, report))
    }

    fn scan_directory(
        &mut self,
        ctx: &Context,
        dir: DirectoryId,
        dir_path: &Path,
        enclosed: &mut BTreeMap<PathBuf, DirectoryId>,
        report: &mut ScanReport,
    ) {
        let children = match ctx.accessor().list_children(dir_path) {
            Ok(children) => children,
            Err(err) => {
                warn!(path = %dir_path.display(), error = %err, "Could not list directory");
                report.skipped += 1;
                return;
            }
        };

        for child in children {
            if self.scan.should_ignore(&child) {
                trace!(path = %child.display(), "Ignored");
                continue;
            }

            if ctx.accessor().is_directory(&child) {
                if let Some(root) = enclosed.remove(&child) {
                    match self.tree.adopt_root(ctx, root, dir) {
                        Ok(()) => report.absorbed_roots += 1,
                        Err(err) => {
                            warn!(path = %child.display(), error = %err, "Could not absorb root");
                            report.skipped += 1;
                        }
                    }
                    continue;
                }
                match self.tree.track_directory(ctx, &child, Parent::Directory(dir)) {
                    Ok(sub) => {
                        report.directories += 1;
                        self.scan_directory(ctx, sub, &child, enclosed, report);
                    }
                    Err(err) => {
                        warn!(path = %child.display(), error = %err, "Skipping directory");
                        report.skipped += 1;
                    }
                }
            } else if is_image(&child) {
                match self.tree.track_item(ctx, &child, dir) {
                    Ok(item) => {
                        report.images += 1;
                        if let Ok(found) = self.tree.item(item) {
                            self.vocabulary.extend(found.tags());
                        }
                    }
                    Err(err) => {
                        warn!(path = %child.display(), error = %err, "Skipping image");
                        report.skipped += 1;
                    }
                }
            } else {
                trace!(path = %child.display(), "Not an image");
            }
        }
    }

    /// The tracked entity at `path`, looked up through the root containing it.
    pub fn resolve(&self, ctx: &Context, path: &Path) -> Result<EntityId, ModelError> {
        let real = ctx.accessor().to_real_path(path)?;
        for root in self.roots() {
            let root_path = self.tree.directory_path(root)?;
            if real == root_path {
                return Ok(EntityId::Directory(root));
            }
            if real.starts_with(&root_path) {
                return self.tree.get_descendant(root, &real);
            }
        }
        Err(ModelError::not_found(&real))
    }

    pub fn resolve_dir(&self, ctx: &Context, path: &Path) -> Result<DirectoryId, ModelError> {
        match self.resolve(ctx, path)? {
            EntityId::Directory(id) => Ok(id),
            EntityId::Item(_) => Err(ModelError::NotADirectory(path.to_path_buf())),
        }
    }

    pub fn resolve_item(&self, ctx: &Context, path: &Path) -> Result<ItemId, ModelError> {
        match self.resolve(ctx, path)? {
            EntityId::Item(id) => Ok(id),
            EntityId::Directory(_) => Err(ModelError::NotAnImage(path.to_path_buf())),
        }
    }

    /// Add tags to an image in one rename, and to the vocabulary.
    pub fn add_tags(&mut self, ctx: &Context, item: ItemId, tags: &[&str]) -> Result<(), ModelError> {
        self.tree.add_tags(ctx, item, tags)?;
        for tag in tags {
            self.record_tag(tag);
        }
        Ok(())
    }

    /// Rename an image from a tagged stem, adding its tags to the vocabulary.
    pub fn rename_item(&mut self, ctx: &Context, item: ItemId, tagged: &str) -> Result<(), ModelError> {
        self.tree.rename_item(ctx, item, tagged)?;
        for tag in self.tree.item(item)?.tags() {
            self.record_tag(&tag);
        }
        Ok(())
    }

    /// Move an image into the tracked directory at `dir_path`.
    pub fn move_item_to_path(&mut self, ctx: &Context, item: ItemId, dir_path: &Path) -> Result<(), ModelError> {
        let target = self.resolve_dir(ctx, dir_path)?;
        self.tree.move_item(ctx, item, target)
    }

    pub fn record_tag(&mut self, tag: &str) {
        if self.vocabulary.insert(tag.to_string()) {
            debug!(tag, "New tag in vocabulary");
        }
    }

    /// Every tag ever seen, sorted.
    pub fn tags(&self) -> Vec<String> {
        self.vocabulary.iter().cloned().collect()
    }
}

//! Entity Tree
//!
//! Directories and images live in one arena keyed by typed ids. Parent links
//! and child sets are ids resolved through the arena, and paths are derived:
//! an entity's path is always its parent's path joined with its own name.
//!
//! Mutations are methods on [`Tree`] that take the [`Context`](crate::context::Context)
//! carrying the filesystem accessor, clock and audit log.

pub mod directory;
pub mod entity;
pub mod item;
pub mod path;
pub mod revert;
pub mod sync;
pub mod walker;

pub use directory::{Directory, DirectoryState};
pub use entity::{Entity, SnapshotState};
pub use item::{Item, ItemState};

use crate::error::ModelError;
use crate::types::{DirectoryId, EntityId, ItemId, Parent};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Arena of every tracked directory and image.
#[derive(Debug, Default)]
pub struct Tree {
    directories: BTreeMap<DirectoryId, Directory>,
    items: BTreeMap<ItemId, Item>,
    next_id: u64,
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn allocate(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn directory(&self, id: DirectoryId) -> Result<&Directory, ModelError> {
        self.directories
            .get(&id)
            .ok_or_else(|| ModelError::NotFound(id.to_string()))
    }

    pub fn item(&self, id: ItemId) -> Result<&Item, ModelError> {
        self.items
            .get(&id)
            .ok_or_else(|| ModelError::NotFound(id.to_string()))
    }

    pub(crate) fn directory_mut(&mut self, id: DirectoryId) -> Result<&mut Directory, ModelError> {
        self.directories
            .get_mut(&id)
            .ok_or_else(|| ModelError::NotFound(id.to_string()))
    }

    pub(crate) fn item_mut(&mut self, id: ItemId) -> Result<&mut Item, ModelError> {
        self.items
            .get_mut(&id)
            .ok_or_else(|| ModelError::NotFound(id.to_string()))
    }

    pub(crate) fn insert_directory(&mut self, directory: Directory) {
        self.directories.insert(directory.id(), directory);
    }

    pub(crate) fn insert_item(&mut self, item: Item) {
        self.items.insert(item.id(), item);
    }

    pub fn directory_count(&self) -> usize {
        self.directories.len()
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Directories whose parent is an untracked location, sorted by id.
    pub fn roots(&self) -> Vec<DirectoryId> {
        self.directories
            .values()
            .filter(|dir| matches!(dir.parent(), Parent::Root(_)))
            .map(|dir| dir.id())
            .collect()
    }

    /// Location of whatever `parent` designates.
    pub fn parent_path(&self, parent: &Parent) -> Result<PathBuf, ModelError> {
        match parent {
            Parent::Directory(id) => self.directory_path(*id),
            Parent::Root(location) => Ok(location.clone()),
        }
    }

    /// The path `name` would have under `parent`.
    pub fn resolve(&self, parent: &Parent, name: &str) -> Result<PathBuf, ModelError> {
        Ok(self.parent_path(parent)?.join(name))
    }

    pub fn directory_path(&self, id: DirectoryId) -> Result<PathBuf, ModelError> {
        let mut names = Vec::new();
        let mut current = id;
        // A well-formed tree never needs more steps than it has directories.
        for _ in 0..=self.directories.len() {
            let dir = self.directory(current)?;
            names.push(dir.name());
            match dir.parent() {
                Parent::Directory(parent) => current = *parent,
                Parent::Root(location) => {
                    let mut path = location.clone();
                    for name in names.iter().rev() {
                        path.push(name);
                    }
                    return Ok(path);
                }
            }
        }
        Err(ModelError::InvalidArgument(format!(
            "parent chain of {} does not end at a root",
            id
        )))
    }

    pub fn item_path(&self, id: ItemId) -> Result<PathBuf, ModelError> {
        let item = self.item(id)?;
        Ok(self.directory_path(item.directory())?.join(item.file_name()))
    }

    pub fn path_of(&self, id: impl Into<EntityId>) -> Result<PathBuf, ModelError> {
        match id.into() {
            EntityId::Directory(id) => self.directory_path(id),
            EntityId::Item(id) => self.item_path(id),
        }
    }

    /// True if `candidate` is `dir` or lies anywhere beneath it.
    pub fn is_within(&self, dir: DirectoryId, candidate: DirectoryId) -> bool {
        let mut current = Some(candidate);
        for _ in 0..=self.directories.len() {
            match current {
                Some(id) if id == dir => return true,
                Some(id) => {
                    current = self
                        .directories
                        .get(&id)
                        .and_then(|d| d.parent().directory())
                }
                None => return false,
            }
        }
        false
    }

    /// True if `path` is `dir`'s path or starts with it.
    pub fn contains(&self, dir: DirectoryId, path: &Path) -> Result<bool, ModelError> {
        Ok(path.starts_with(self.directory_path(dir)?))
    }

    pub fn contains_entity(&self, dir: DirectoryId, entity: impl Into<EntityId>) -> Result<bool, ModelError> {
        let path = self.path_of(entity)?;
        self.contains(dir, &path)
    }

    /// The tracked entity at exactly `path` below `dir`. Images are checked
    /// before descending into subdirectories.
    pub fn get_descendant(&self, dir: DirectoryId, path: &Path) -> Result<EntityId, ModelError> {
        let directory = self.directory(dir)?;
        for item in directory.item_ids() {
            if self.item_path(*item)? == path {
                return Ok(EntityId::Item(*item));
            }
        }
        for sub in directory.subdirectory_ids() {
            let sub_path = self.directory_path(*sub)?;
            if sub_path == path {
                return Ok(EntityId::Directory(*sub));
            }
            if path.starts_with(&sub_path) {
                return self.get_descendant(*sub, path);
            }
        }
        Err(ModelError::not_found(path))
    }

    /// Direct child image whose tagged stem, file name or base name equals `reference`.
    pub fn item_by_reference(&self, dir: DirectoryId, reference: &str) -> Result<ItemId, ModelError> {
        let directory = self.directory(dir)?;
        for id in directory.item_ids() {
            let item = self.item(*id)?;
            if item.tagged_name() == reference
                || item.file_name() == reference
                || item.base() == reference
            {
                return Ok(*id);
            }
        }
        Err(ModelError::NotFound(reference.to_string()))
    }

    pub fn subdirectory_by_name(&self, dir: DirectoryId, name: &str) -> Result<DirectoryId, ModelError> {
        let directory = self.directory(dir)?;
        for id in directory.subdirectory_ids() {
            if self.directory(*id)?.name() == name {
                return Ok(*id);
            }
        }
        Err(ModelError::NotFound(name.to_string()))
    }

    /// Every image under `dir`, at any depth.
    pub fn items_recursive(&self, dir: DirectoryId) -> Result<Vec<ItemId>, ModelError> {
        let mut found = Vec::new();
        let mut pending = vec![dir];
        while let Some(current) = pending.pop() {
            let directory = self.directory(current)?;
            found.extend(directory.item_ids().iter().copied());
            pending.extend(directory.subdirectory_ids().iter().copied());
        }
        found.sort();
        Ok(found)
    }

    /// Direct children of `dir`, images and subdirectories together, sorted by path.
    pub fn contents(&self, dir: DirectoryId) -> Result<Vec<EntityId>, ModelError> {
        let directory = self.directory(dir)?;
        let mut entries = Vec::new();
        for id in directory.item_ids() {
            entries.push((self.item_path(*id)?, EntityId::Item(*id)));
        }
        for id in directory.subdirectory_ids() {
            entries.push((self.directory_path(*id)?, EntityId::Directory(*id)));
        }
        entries.sort();
        Ok(entries.into_iter().map(|(_, id)| id).collect())
    }
}

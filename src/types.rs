//! Identifiers shared across the model.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Arena key of a tracked directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DirectoryId(pub(crate) u64);

/// Arena key of a tracked image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(pub(crate) u64);

/// Either kind of tracked entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityId {
    Directory(DirectoryId),
    Item(ItemId),
}

impl DirectoryId {
    /// Ids only mean something to the tree that issued them.
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl ItemId {
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl From<DirectoryId> for EntityId {
    fn from(id: DirectoryId) -> Self {
        EntityId::Directory(id)
    }
}

impl From<ItemId> for EntityId {
    fn from(id: ItemId) -> Self {
        EntityId::Item(id)
    }
}

impl fmt::Display for DirectoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "dir#{}", self.0)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "item#{}", self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityId::Directory(id) => id.fmt(f),
            EntityId::Item(id) => id.fmt(f),
        }
    }
}

/// Where an entity hangs: under a tracked directory, or, for a root, at a fixed
/// location on disk that is not itself tracked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Parent {
    Directory(DirectoryId),
    Root(PathBuf),
}

impl Parent {
    pub fn directory(&self) -> Option<DirectoryId> {
        match self {
            Parent::Directory(id) => Some(*id),
            Parent::Root(_) => None,
        }
    }

    pub fn root_location(&self) -> Option<&Path> {
        match self {
            Parent::Directory(_) => None,
            Parent::Root(location) => Some(location),
        }
    }
}

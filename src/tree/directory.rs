//! Directory entities: tracking, rename, move, mkdir.

use crate::context::Context;
use crate::error::ModelError;
use crate::history::{History, HistoryView};
use crate::tag;
use crate::tree::entity::{Entity, SnapshotState};
use crate::tree::path::file_name;
use crate::tree::{sync, Tree};
use crate::types::{DirectoryId, EntityId, ItemId, Parent};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

#[derive(Debug)]
pub struct Directory {
    id: DirectoryId,
    name: String,
    parent: Parent,
    subdirectories: BTreeSet<DirectoryId>,
    items: BTreeSet<ItemId>,
    history: History<DirectoryState>,
}

/// Captured state of a directory, children listed by the names they had at
/// capture time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectoryState {
    pub name: String,
    pub parent: Parent,
    pub path: PathBuf,
    pub subdirectories: BTreeMap<DirectoryId, String>,
    pub items: BTreeMap<ItemId, String>,
}

impl SnapshotState for DirectoryState {
    fn parent(&self) -> Parent {
        self.parent.clone()
    }

    fn file_name(&self) -> String {
        self.name.clone()
    }
}

impl Directory {
    pub fn id(&self) -> DirectoryId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> &Parent {
        &self.parent
    }

    pub fn subdirectory_ids(&self) -> &BTreeSet<DirectoryId> {
        &self.subdirectories
    }

    pub fn item_ids(&self) -> &BTreeSet<ItemId> {
        &self.items
    }

    pub fn history(&self) -> HistoryView<'_, DirectoryState> {
        self.history.view()
    }
}

impl Entity for Directory {
    type Id = DirectoryId;
    type State = DirectoryState;

    fn id(&self) -> DirectoryId {
        self.id
    }

    fn parent(&self) -> Parent {
        self.parent.clone()
    }

    fn file_name(&self) -> String {
        self.name.clone()
    }

    fn history(&self) -> &History<DirectoryState> {
        &self.history
    }

    fn history_mut(&mut self) -> &mut History<DirectoryState> {
        &mut self.history
    }

    fn capture(&self, tree: &Tree, path: PathBuf) -> DirectoryState {
        let subdirectories = self
            .subdirectories
            .iter()
            .filter_map(|id| tree.directory(*id).ok().map(|d| (*id, d.name.clone())))
            .collect();
        let items = self
            .items
            .iter()
            .filter_map(|id| tree.item(*id).ok().map(|i| (*id, i.file_name())))
            .collect();
        DirectoryState {
            name: self.name.clone(),
            parent: self.parent.clone(),
            path,
            subdirectories,
            items,
        }
    }

    fn restore(&mut self, state: &DirectoryState) {
        self.name = state.name.clone();
        self.parent = state.parent.clone();
    }

    fn lookup(tree: &Tree, id: DirectoryId) -> Result<&Self, ModelError> {
        tree.directory(id)
    }

    fn lookup_mut(tree: &mut Tree, id: DirectoryId) -> Result<&mut Self, ModelError> {
        tree.directory_mut(id)
    }

    fn link(dir: &mut Directory, id: DirectoryId, present: bool) {
        if present {
            dir.subdirectories.insert(id);
        } else {
            dir.subdirectories.remove(&id);
        }
    }
}

impl Directory {
    pub(crate) fn link_item(&mut self, id: ItemId, present: bool) {
        if present {
            self.items.insert(id);
        } else {
            self.items.remove(&id);
        }
    }
}

impl Tree {
    /// Start tracking an existing directory under `parent`.
    ///
    /// The real path's parent must be exactly where `parent` lives. The new
    /// directory gets one snapshot; a tracked parent and its ancestors each
    /// log one as well.
    #[instrument(skip(self, ctx, path), fields(path = %path.display()))]
    pub fn track_directory(
        &mut self,
        ctx: &Context,
        path: &Path,
        parent: Parent,
    ) -> Result<DirectoryId, ModelError> {
        let accessor = ctx.accessor();
        if !accessor.exists(path) {
            return Err(ModelError::not_found(path));
        }
        if !accessor.is_directory(path) {
            return Err(ModelError::NotADirectory(path.to_path_buf()));
        }
        let real = accessor.to_real_path(path)?;
        let name = file_name(&real)?.to_string();

        let expected = self.parent_path(&parent)?;
        if real.parent() != Some(expected.as_path()) {
            return Err(ModelError::InvalidArgument(format!(
                "{} is not directly inside {}",
                real.display(),
                expected.display()
            )));
        }
        self.ensure_untracked(&parent, &real)?;
        let at = ctx.now();
        sync::ensure_not_before(self, at, None, &[&parent])?;

        let id = DirectoryId(self.allocate());
        let state = DirectoryState {
            name: name.clone(),
            parent: parent.clone(),
            path: real.clone(),
            subdirectories: BTreeMap::new(),
            items: BTreeMap::new(),
        };
        self.insert_directory(Directory {
            id,
            name,
            parent: parent.clone(),
            subdirectories: BTreeSet::new(),
            items: BTreeSet::new(),
            history: History::new(EntityId::Directory(id), state, at),
        });

        if let Parent::Directory(parent_id) = parent {
            Directory::link(self.directory_mut(parent_id)?, id, true);
            sync::cascade(self, ctx, &Parent::Directory(parent_id), at)?;
        }

        debug!(directory = %id, path = %real.display(), "Directory tracked");
        Ok(id)
    }

    /// Track `path` as a root: its parent is the untracked location it sits in.
    pub fn track_root(&mut self, ctx: &Context, path: &Path) -> Result<DirectoryId, ModelError> {
        let real = ctx.accessor().to_real_path(path)?;
        let location = real
            .parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| ModelError::InvalidArgument(format!("{} has no parent", real.display())))?;
        self.track_directory(ctx, &real, Parent::Root(location))
    }

    /// Hang an existing root under `parent`, for when a newly added root
    /// encloses it. Only valid if the root already sits directly inside `parent`.
    #[instrument(skip(self, ctx))]
    pub fn adopt_root(
        &mut self,
        ctx: &Context,
        root: DirectoryId,
        parent: DirectoryId,
    ) -> Result<(), ModelError> {
        let location = match self.directory(root)?.parent() {
            Parent::Root(location) => location.clone(),
            Parent::Directory(_) => {
                return Err(ModelError::InvalidArgument(format!("{} is not a root", root)))
            }
        };
        let parent_path = self.directory_path(parent)?;
        if location != parent_path {
            return Err(ModelError::InvalidArgument(format!(
                "{} does not sit inside {}",
                root,
                parent_path.display()
            )));
        }
        let root_path = self.directory_path(root)?;
        self.ensure_untracked(&Parent::Directory(parent), &root_path)?;
        let at = ctx.now();
        let floor = Entity::history(self.directory(root)?).last().taken_at();
        sync::ensure_not_before(self, at, Some(floor), &[&Parent::Directory(parent)])?;

        self.directory_mut(root)?.parent = Parent::Directory(parent);
        Directory::link(self.directory_mut(parent)?, root, true);
        sync::log::<Directory>(self, ctx, root, at)?;
        sync::cascade(self, ctx, &Parent::Directory(parent), at)?;

        info!(root = %root, parent = %parent, "Root adopted");
        Ok(())
    }

    /// Rename a directory in place.
    #[instrument(skip(self, ctx))]
    pub fn rename_directory(&mut self, ctx: &Context, id: DirectoryId, name: &str) -> Result<(), ModelError> {
        if !tag::is_legal_filename(name) {
            return Err(ModelError::InvalidName(name.to_string()));
        }
        self.directory_mut(id)?.name = name.to_string();
        sync::sync::<Directory>(self, ctx, id)?;
        info!(directory = %id, name, "Directory renamed");
        Ok(())
    }

    /// Move a directory under `target`. Fails with `CyclicMove` if `target`
    /// is the directory itself or lies beneath it.
    #[instrument(skip(self, ctx))]
    pub fn move_directory(
        &mut self,
        ctx: &Context,
        id: DirectoryId,
        target: DirectoryId,
    ) -> Result<(), ModelError> {
        self.directory(target)?;
        if self.is_within(id, target) {
            return Err(ModelError::CyclicMove {
                subject: self.directory_path(id)?,
                target: self.directory_path(target)?,
            });
        }
        self.directory_mut(id)?.parent = Parent::Directory(target);
        sync::sync::<Directory>(self, ctx, id)?;
        info!(directory = %id, target = %target, "Directory moved");
        Ok(())
    }

    /// Create `name` on disk inside `parent` and track it.
    #[instrument(skip(self, ctx))]
    pub fn create_subdirectory(
        &mut self,
        ctx: &Context,
        parent: DirectoryId,
        name: &str,
    ) -> Result<DirectoryId, ModelError> {
        if !tag::is_legal_filename(name) {
            return Err(ModelError::InvalidName(name.to_string()));
        }
        let path = self.directory_path(parent)?.join(name);
        if ctx.accessor().exists(&path) {
            return Err(ModelError::io(
                &path,
                io::Error::new(io::ErrorKind::AlreadyExists, "directory already exists"),
            ));
        }
        ctx.accessor().create_directory(&path)?;
        let id = self.track_directory(ctx, &path, Parent::Directory(parent))?;
        info!(directory = %id, path = %path.display(), "Directory created");
        Ok(id)
    }

    /// Refuse to track a second entity at a path that is already tracked.
    fn ensure_untracked(&self, parent: &Parent, path: &Path) -> Result<(), ModelError> {
        let taken = match parent {
            Parent::Directory(id) => self.get_descendant(*id, path).is_ok(),
            Parent::Root(_) => self
                .roots()
                .into_iter()
                .any(|root| self.directory_path(root).map(|p| p == path).unwrap_or(false)),
        };
        if taken {
            Err(ModelError::InvalidArgument(format!(
                "{} is already tracked",
                path.display()
            )))
        } else {
            Ok(())
        }
    }
}

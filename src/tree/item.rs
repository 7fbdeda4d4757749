//! Image entities: tracking and the tag/name/location mutations.

use crate::context::Context;
use crate::error::ModelError;
use crate::history::{History, HistoryView, Snapshot};
use crate::tag::{self, TagSet, TaggedName};
use crate::tree::entity::{Entity, SnapshotState};
use crate::tree::path::{file_name, is_image};
use crate::tree::{sync, Directory, Tree};
use crate::types::{DirectoryId, EntityId, ItemId, Parent};
use serde::Serialize;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// A tracked image. Its file name is always `encode(base, tags) + extension`.
#[derive(Debug)]
pub struct Item {
    id: ItemId,
    base: String,
    tags: TagSet,
    extension: String,
    parent: DirectoryId,
    history: History<ItemState>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemState {
    pub base: String,
    pub tags: TagSet,
    pub extension: String,
    pub parent: DirectoryId,
    pub path: PathBuf,
}

impl ItemState {
    /// Stem without extension, e.g. `photo - @beach`.
    pub fn tagged_name(&self) -> String {
        tag::encode(&self.base, &self.tags)
    }
}

impl SnapshotState for ItemState {
    fn parent(&self) -> Parent {
        Parent::Directory(self.parent)
    }

    fn file_name(&self) -> String {
        format!("{}{}", self.tagged_name(), self.extension)
    }
}

impl Item {
    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// Copy of the current tags.
    pub fn tags(&self) -> TagSet {
        self.tags.clone()
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn tagged_name(&self) -> String {
        tag::encode(&self.base, &self.tags)
    }

    pub fn file_name(&self) -> String {
        format!("{}{}", self.tagged_name(), self.extension)
    }

    pub fn directory(&self) -> DirectoryId {
        self.parent
    }

    pub fn history(&self) -> HistoryView<'_, ItemState> {
        self.history.view()
    }
}

impl Entity for Item {
    type Id = ItemId;
    type State = ItemState;

    fn id(&self) -> ItemId {
        self.id
    }

    fn parent(&self) -> Parent {
        Parent::Directory(self.parent)
    }

    fn file_name(&self) -> String {
        Item::file_name(self)
    }

    fn history(&self) -> &History<ItemState> {
        &self.history
    }

    fn history_mut(&mut self) -> &mut History<ItemState> {
        &mut self.history
    }

    fn capture(&self, _tree: &Tree, path: PathBuf) -> ItemState {
        ItemState {
            base: self.base.clone(),
            tags: self.tags.clone(),
            extension: self.extension.clone(),
            parent: self.parent,
            path,
        }
    }

    fn restore(&mut self, state: &ItemState) {
        self.base = state.base.clone();
        self.tags = state.tags.clone();
        self.extension = state.extension.clone();
        self.parent = state.parent;
    }

    fn lookup(tree: &Tree, id: ItemId) -> Result<&Self, ModelError> {
        tree.item(id)
    }

    fn lookup_mut(tree: &mut Tree, id: ItemId) -> Result<&mut Self, ModelError> {
        tree.item_mut(id)
    }

    fn link(dir: &mut Directory, id: ItemId, present: bool) {
        dir.link_item(id, present);
    }

    fn on_logged(ctx: &Context, snapshot: &Arc<Snapshot<ItemState>>) {
        ctx.audit_log().record(Arc::clone(snapshot));
    }
}

impl Tree {
    /// Start tracking an existing image directly inside `parent`.
    ///
    /// The file is renamed on disk to its canonical form (tags sorted and
    /// deduplicated) before it is tracked; if that rename fails nothing is
    /// tracked.
    #[instrument(skip(self, ctx, path), fields(path = %path.display()))]
    pub fn track_item(&mut self, ctx: &Context, path: &Path, parent: DirectoryId) -> Result<ItemId, ModelError> {
        let accessor = ctx.accessor();
        if !accessor.exists(path) {
            return Err(ModelError::not_found(path));
        }
        if accessor.is_directory(path) || !is_image(path) {
            return Err(ModelError::NotAnImage(path.to_path_buf()));
        }
        let real = accessor.to_real_path(path)?;
        let name = TaggedName::parse(file_name(&real)?)?;

        let dir_path = self.directory_path(parent)?;
        if real.parent() != Some(dir_path.as_path()) {
            return Err(ModelError::InvalidArgument(format!(
                "{} is not directly inside {}",
                real.display(),
                dir_path.display()
            )));
        }

        let canonical = dir_path.join(name.to_string());
        if self.get_descendant(parent, &real).is_ok() || self.get_descendant(parent, &canonical).is_ok() {
            return Err(ModelError::InvalidArgument(format!(
                "{} is already tracked",
                canonical.display()
            )));
        }
        let at = ctx.now();
        sync::ensure_not_before(self, at, None, &[&Parent::Directory(parent)])?;
        if canonical != real {
            accessor.move_path(&real, &canonical)?;
            debug!(from = %real.display(), to = %canonical.display(), "Normalized image name");
        }

        let id = ItemId(self.allocate());
        let state = ItemState {
            base: name.base.clone(),
            tags: name.tags.clone(),
            extension: name.extension.clone(),
            parent,
            path: canonical.clone(),
        };
        let item = Item {
            id,
            base: name.base,
            tags: name.tags,
            extension: name.extension,
            parent,
            history: History::new(EntityId::Item(id), state, at),
        };
        ctx.audit_log().record(Arc::clone(item.history.last()));
        self.insert_item(item);

        Item::link(self.directory_mut(parent)?, id, true);
        sync::cascade(self, ctx, &Parent::Directory(parent), at)?;

        debug!(item = %id, path = %canonical.display(), "Image tracked");
        Ok(id)
    }

    /// Add one tag. Adding a tag the image already has does nothing.
    pub fn add_tag(&mut self, ctx: &Context, id: ItemId, tag: &str) -> Result<(), ModelError> {
        self.add_tags(ctx, id, &[tag])
    }

    /// Add several tags in one rename. Every tag is validated before anything
    /// changes; if none of them is new, nothing happens.
    #[instrument(skip(self, ctx))]
    pub fn add_tags(&mut self, ctx: &Context, id: ItemId, tags: &[&str]) -> Result<(), ModelError> {
        for tag in tags {
            tag::validate_tag(tag)?;
        }
        let item = self.item_mut(id)?;
        let mut added = false;
        for tag in tags {
            added |= item.tags.insert(tag.to_string());
        }
        if !added {
            debug!(item = %id, ?tags, "Tags already present");
            return Ok(());
        }
        sync::sync::<Item>(self, ctx, id)?;
        info!(item = %id, ?tags, "Tags added");
        Ok(())
    }

    /// Remove one tag. Removing a tag the image does not have does nothing.
    pub fn remove_tag(&mut self, ctx: &Context, id: ItemId, tag: &str) -> Result<(), ModelError> {
        self.remove_tags(ctx, id, &[tag])
    }

    #[instrument(skip(self, ctx))]
    pub fn remove_tags(&mut self, ctx: &Context, id: ItemId, tags: &[&str]) -> Result<(), ModelError> {
        let item = self.item_mut(id)?;
        let mut removed = false;
        for tag in tags {
            removed |= item.tags.remove(*tag);
        }
        if !removed {
            debug!(item = %id, ?tags, "Tags not present");
            return Ok(());
        }
        sync::sync::<Item>(self, ctx, id)?;
        info!(item = %id, ?tags, "Tags removed");
        Ok(())
    }

    /// Replace base name and tag set together from a tagged stem such as
    /// `holiday - @beach @family`.
    #[instrument(skip(self, ctx))]
    pub fn rename_item(&mut self, ctx: &Context, id: ItemId, tagged: &str) -> Result<(), ModelError> {
        let (base, tags) = tag::decode(tagged)?;
        tag::validate_base_name(&base)?;
        for t in &tags {
            tag::validate_tag(t)?;
        }
        let item = self.item_mut(id)?;
        item.base = base;
        item.tags = tags;
        sync::sync::<Item>(self, ctx, id)?;
        info!(item = %id, tagged, "Image renamed");
        Ok(())
    }

    /// Change only the untagged part of the name.
    #[instrument(skip(self, ctx))]
    pub fn set_base_name(&mut self, ctx: &Context, id: ItemId, base: &str) -> Result<(), ModelError> {
        tag::validate_base_name(base)?;
        self.item_mut(id)?.base = base.to_string();
        sync::sync::<Item>(self, ctx, id)?;
        info!(item = %id, base, "Image base name changed");
        Ok(())
    }

    #[instrument(skip(self, ctx))]
    pub fn move_item(&mut self, ctx: &Context, id: ItemId, target: DirectoryId) -> Result<(), ModelError> {
        self.directory(target)?;
        self.item_mut(id)?.parent = target;
        sync::sync::<Item>(self, ctx, id)?;
        info!(item = %id, target = %target, "Image moved");
        Ok(())
    }

    /// Read the image's bytes.
    pub fn open_item(&self, ctx: &Context, id: ItemId) -> Result<Box<dyn Read + Send>, ModelError> {
        let path = self.item_path(id)?;
        ctx.accessor().new_input_stream(&path)
    }
}

//! Recursive revert.
//!
//! Reverting a directory first reverts every current child image and every
//! current subdirectory (recursively) to its own latest snapshot taken at or
//! before the target time, then restores the directory's own name and parent.
//! A subdirectory tracked after the target time keeps its own name and place,
//! but its contents are still reverted.
//! Each step is a normal sync round. If any step fails, the steps already
//! taken are undone in reverse order and the error is returned.

use crate::context::Context;
use crate::error::ModelError;
use crate::history::Snapshot;
use crate::tree::entity::Entity;
use crate::tree::sync;
use crate::tree::{Directory, DirectoryState, Item, ItemState, Tree};
use crate::types::{DirectoryId, EntityId, ItemId, Parent};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

/// A completed step and the snapshot that was latest before it.
enum Undo {
    Item(ItemId, Arc<Snapshot<ItemState>>),
    Directory(DirectoryId, Arc<Snapshot<DirectoryState>>),
}

impl Tree {
    /// Put an image back to the name, tags and directory `snapshot` recorded.
    #[instrument(skip(self, ctx, snapshot), fields(sequence = snapshot.sequence()))]
    pub fn revert_item(
        &mut self,
        ctx: &Context,
        id: ItemId,
        snapshot: &Snapshot<ItemState>,
    ) -> Result<(), ModelError> {
        if snapshot.subject() != EntityId::Item(id) {
            return Err(ModelError::InvalidArgument(format!(
                "snapshot of {} cannot revert {}",
                snapshot.subject(),
                id
            )));
        }
        self.directory(snapshot.state().parent)?;
        restore_and_sync::<Item>(self, ctx, id, snapshot.state())?;
        info!(item = %id, at = %snapshot.taken_at(), "Image reverted");
        Ok(())
    }

    /// Revert a directory and everything currently beneath it to how it was
    /// when `snapshot` was taken.
    ///
    /// Images tracked after that time have no such snapshot and are left
    /// alone. Subdirectories tracked after it keep their name and place while
    /// their contents are reverted. Child membership is not copied from the snapshot; it follows
    /// from where the reverted children end up.
    #[instrument(skip(self, ctx, snapshot), fields(sequence = snapshot.sequence()))]
    pub fn revert_directory(
        &mut self,
        ctx: &Context,
        id: DirectoryId,
        snapshot: &Snapshot<DirectoryState>,
    ) -> Result<(), ModelError> {
        if snapshot.subject() != EntityId::Directory(id) {
            return Err(ModelError::InvalidArgument(format!(
                "snapshot of {} cannot revert {}",
                snapshot.subject(),
                id
            )));
        }

        let mut journal = Vec::new();
        match self.revert_tree(ctx, id, snapshot.taken_at(), Some(snapshot.state()), &mut journal) {
            Ok(()) => {
                info!(directory = %id, at = %snapshot.taken_at(), steps = journal.len() + 1, "Directory reverted");
                Ok(())
            }
            Err(err) => {
                warn!(directory = %id, error = %err, steps = journal.len(), "Revert failed, undoing completed steps");
                self.compensate(ctx, journal);
                Err(err)
            }
        }
    }

    fn revert_tree(
        &mut self,
        ctx: &Context,
        id: DirectoryId,
        at: DateTime<Utc>,
        target: Option<&DirectoryState>,
        journal: &mut Vec<Undo>,
    ) -> Result<(), ModelError> {
        let items: Vec<ItemId> = self.directory(id)?.item_ids().iter().copied().collect();
        for item in items {
            let history = self.item(item)?.history();
            let Some(snap) = history.snap_before(at) else {
                continue;
            };
            let before = history.last();
            restore_and_sync::<Item>(self, ctx, item, snap.state())?;
            journal.push(Undo::Item(item, before));
        }

        let subdirectories: Vec<DirectoryId> =
            self.directory(id)?.subdirectory_ids().iter().copied().collect();
        for sub in subdirectories {
            let history = self.directory(sub)?.history();
            let snap = history.snap_before(at);
            let before = history.last();
            self.revert_tree(ctx, sub, at, snap.as_ref().map(|s| s.state()), journal)?;
            if snap.is_some() {
                journal.push(Undo::Directory(sub, before));
            }
        }

        let Some(target) = target else {
            return Ok(());
        };
        if let Parent::Directory(parent) = &target.parent {
            self.directory(*parent)?;
            if self.is_within(id, *parent) {
                return Err(ModelError::CyclicMove {
                    subject: self.directory_path(id)?,
                    target: self.directory_path(*parent)?,
                });
            }
        }
        restore_and_sync::<Directory>(self, ctx, id, target)
    }

    /// Undo completed steps, newest first. Best effort: a failure is logged
    /// and the remaining steps are still attempted.
    fn compensate(&mut self, ctx: &Context, journal: Vec<Undo>) {
        for undo in journal.into_iter().rev() {
            let result = match &undo {
                Undo::Item(id, before) => self.undo_step::<Item>(ctx, *id, before),
                Undo::Directory(id, before) => self.undo_step::<Directory>(ctx, *id, before),
            };
            if let Err(err) = result {
                let entity = match undo {
                    Undo::Item(id, _) => EntityId::Item(id),
                    Undo::Directory(id, _) => EntityId::Directory(id),
                };
                error!(%entity, error = %err, "Could not undo revert step");
            }
        }
    }

    fn undo_step<E: Entity>(
        &mut self,
        ctx: &Context,
        id: E::Id,
        before: &Arc<Snapshot<E::State>>,
    ) -> Result<(), ModelError> {
        if Arc::ptr_eq(E::lookup(self, id)?.history().last(), before) {
            return Ok(());
        }
        restore_and_sync::<E>(self, ctx, id, before.state())
    }
}

fn restore_and_sync<E: Entity>(
    tree: &mut Tree,
    ctx: &Context,
    id: E::Id,
    state: &E::State,
) -> Result<(), ModelError> {
    E::lookup_mut(tree, id)?.restore(state);
    sync::sync::<E>(tree, ctx, id)
}

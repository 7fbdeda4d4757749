//! Sync Protocol
//!
//! Every mutation edits an entity's fields in memory and then calls [`sync`],
//! which replays the change on disk:
//!
//! 1. `from` is where the latest snapshot put the entity (its recorded parent's
//!    current path plus its recorded file name); `to` is where the edited
//!    fields put it.
//! 2. If they differ, the accessor moves `from` to `to`. On failure the fields
//!    are restored from the latest snapshot and the error is returned; nothing
//!    else has changed.
//! 3. If the parent changed, the entity leaves the old parent's child set and
//!    joins the new one.
//! 4. The entity logs a snapshot, then every affected ancestor chain logs one,
//!    so ancestors are never older than the change that touched them.
//!
//! The clock is read once per round. A reading older than any snapshot the
//! round would extend is rejected in step 1, before the disk is touched.

use crate::context::Context;
use crate::error::ModelError;
use crate::tree::entity::{Entity, SnapshotState};
use crate::tree::{Directory, Tree};
use crate::types::{DirectoryId, Parent};
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, trace};

pub(crate) fn sync<E: Entity>(tree: &mut Tree, ctx: &Context, id: E::Id) -> Result<(), ModelError> {
    let last = Arc::clone(E::lookup(tree, id)?.history().last());
    let old_parent = last.state().parent();
    let at = ctx.now();

    let (from, to) = match prepare::<E>(tree, id, last.state(), &old_parent, at, last.taken_at()) {
        Ok(paths) => paths,
        Err(err) => {
            E::lookup_mut(tree, id)?.restore(last.state());
            return Err(err);
        }
    };

    if from != to {
        debug!(entity = %id, from = %from.display(), to = %to.display(), "Syncing to filesystem");
        if let Err(err) = ctx.accessor().move_path(&from, &to) {
            error!(
                entity = %id,
                from = %from.display(),
                to = %to.display(),
                error = %err,
                "Filesystem sync failed, restoring last snapshot"
            );
            E::lookup_mut(tree, id)?.restore(last.state());
            return Err(err);
        }
    } else {
        trace!(entity = %id, path = %to.display(), "Nothing to move");
    }

    let new_parent = E::lookup(tree, id)?.parent();
    if new_parent != old_parent {
        if let Parent::Directory(old) = &old_parent {
            E::link(tree.directory_mut(*old)?, id, false);
        }
        if let Parent::Directory(new) = &new_parent {
            E::link(tree.directory_mut(*new)?, id, true);
        }
        log::<E>(tree, ctx, id, at)?;
        cascade(tree, ctx, &old_parent, at)?;
        cascade(tree, ctx, &new_parent, at)
    } else {
        log::<E>(tree, ctx, id, at)?;
        cascade(tree, ctx, &new_parent, at)
    }
}

/// Everything that can fail before the disk is touched: the move's source
/// and destination, and a clock reading no older than any snapshot the
/// round will extend.
fn prepare<E: Entity>(
    tree: &Tree,
    id: E::Id,
    last: &E::State,
    old_parent: &Parent,
    at: DateTime<Utc>,
    floor: DateTime<Utc>,
) -> Result<(PathBuf, PathBuf), ModelError> {
    let from = tree.resolve(&last.parent(), &last.file_name())?;
    let entity = E::lookup(tree, id)?;
    let new_parent = entity.parent();
    let to = tree.resolve(&new_parent, &entity.file_name())?;
    ensure_not_before(tree, at, Some(floor), &[old_parent, &new_parent])?;
    Ok((from, to))
}

/// Fail with `NonMonotonicTime` if `at` is older than `floor` or than the
/// latest snapshot of any tracked directory on the given parent chains.
pub(crate) fn ensure_not_before(
    tree: &Tree,
    at: DateTime<Utc>,
    floor: Option<DateTime<Utc>>,
    chains: &[&Parent],
) -> Result<(), ModelError> {
    let mut newest = floor;
    for start in chains {
        let mut next = start.directory();
        let mut remaining = tree.directory_count();
        while let Some(dir) = next {
            if remaining == 0 {
                return Err(broken_chain(dir));
            }
            remaining -= 1;
            let directory = tree.directory(dir)?;
            let taken_at = Entity::history(directory).last().taken_at();
            newest = Some(newest.map_or(taken_at, |n| n.max(taken_at)));
            next = directory.parent().directory();
        }
    }
    match newest {
        Some(previous) if at < previous => {
            error!(%previous, attempted = %at, "Clock is behind the history, refusing change");
            Err(ModelError::NonMonotonicTime {
                previous,
                attempted: at,
            })
        }
        _ => Ok(()),
    }
}

/// Append a snapshot of the entity's current state taken at `at`.
pub(crate) fn log<E: Entity>(
    tree: &mut Tree,
    ctx: &Context,
    id: E::Id,
    at: DateTime<Utc>,
) -> Result<(), ModelError> {
    let path = tree.path_of(id)?;
    let state = E::lookup(tree, id)?.capture(tree, path);
    let snapshot = E::lookup_mut(tree, id)?.history_mut().log(state, at)?;
    E::on_logged(ctx, &snapshot);
    Ok(())
}

/// Log a snapshot for `start` and every tracked directory above it.
pub(crate) fn cascade(
    tree: &mut Tree,
    ctx: &Context,
    start: &Parent,
    at: DateTime<Utc>,
) -> Result<(), ModelError> {
    let mut next = start.directory();
    let mut remaining = tree.directory_count();
    while let Some(dir) = next {
        if remaining == 0 {
            return Err(broken_chain(dir));
        }
        remaining -= 1;
        log::<Directory>(tree, ctx, dir, at)?;
        next = tree.directory(dir)?.parent().directory();
    }
    Ok(())
}

fn broken_chain(dir: DirectoryId) -> ModelError {
    ModelError::InvalidArgument(format!("parent chain of {} does not end at a root", dir))
}

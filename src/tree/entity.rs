//! The capability contract shared by directories and images.
//!
//! Sync, logging and revert are written once against [`Entity`]; the two
//! concrete kinds only say how to capture and restore their own fields and
//! where they live in the arena.

use crate::context::Context;
use crate::error::ModelError;
use crate::history::{History, Snapshot};
use crate::tree::{Directory, Tree};
use crate::types::{EntityId, Parent};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// What every captured state must answer for the sync protocol to locate the
/// entity on disk as of that capture.
pub trait SnapshotState: Clone + fmt::Debug {
    fn parent(&self) -> Parent;

    /// Name on disk, including any extension.
    fn file_name(&self) -> String;
}

pub trait Entity: Sized {
    type Id: Copy + Eq + Into<EntityId> + fmt::Display;
    type State: SnapshotState;

    fn id(&self) -> Self::Id;

    fn parent(&self) -> Parent;

    fn file_name(&self) -> String;

    fn history(&self) -> &History<Self::State>;

    fn history_mut(&mut self) -> &mut History<Self::State>;

    /// Full current state; `path` is where the entity lives right now.
    fn capture(&self, tree: &Tree, path: PathBuf) -> Self::State;

    /// Put back name and parent as `state` recorded them. Child membership is
    /// never restored from a snapshot.
    fn restore(&mut self, state: &Self::State);

    fn lookup(tree: &Tree, id: Self::Id) -> Result<&Self, ModelError>;

    fn lookup_mut(tree: &mut Tree, id: Self::Id) -> Result<&mut Self, ModelError>;

    /// Insert (`present`) or remove `id` from the matching child set of `dir`.
    fn link(dir: &mut Directory, id: Self::Id, present: bool);

    /// Called with every snapshot this entity logs.
    fn on_logged(_ctx: &Context, _snapshot: &Arc<Snapshot<Self::State>>) {}
}

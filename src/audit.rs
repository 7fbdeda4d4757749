//! Process-wide log of every image snapshot, in creation order.

use crate::history::Snapshot;
use crate::tree::ItemState;
use crate::views;
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Debug, Default)]
pub struct AuditLog {
    entries: Mutex<Vec<Arc<Snapshot<ItemState>>>>,
}

impl AuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record(&self, snapshot: Arc<Snapshot<ItemState>>) {
        self.entries.lock().push(snapshot);
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Copy of the log; later records do not show up in it.
    pub fn snapshots(&self) -> Vec<Arc<Snapshot<ItemState>>> {
        self.entries.lock().clone()
    }

    /// One change description per snapshot.
    pub fn render(&self) -> Vec<String> {
        self.entries
            .lock()
            .iter()
            .map(|snap| views::describe_item(snap))
            .collect()
    }
}

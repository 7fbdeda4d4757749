//! Entity History
//!
//! Every tracked entity owns one `History`: a pointer to the latest snapshot of
//! an append-only chain. Snapshots are immutable and timestamped; a history
//! refuses a new snapshot that is older than its latest one.
//!
//! Readers get a [`HistoryView`], which can walk, rank and date-search the
//! chain but has no way to append to it.

pub mod clock;
pub mod snapshot;

pub use clock::{Clock, ManualClock, SystemClock};
pub use snapshot::{Chain, Snapshot};

use crate::error::ModelError;
use crate::types::EntityId;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{error, trace};

#[derive(Debug)]
pub struct History<S> {
    latest: Arc<Snapshot<S>>,
    count: usize,
}

impl<S> History<S> {
    /// Start a history seeded with the entity's initial state.
    pub fn new(subject: EntityId, state: S, taken_at: DateTime<Utc>) -> Self {
        Self {
            latest: Snapshot::first(subject, state, taken_at),
            count: 1,
        }
    }

    /// Append a capture of the entity's current state.
    ///
    /// Fails with `NonMonotonicTime` if `taken_at` is before the latest
    /// snapshot; the chain is left untouched in that case.
    pub fn log(&mut self, state: S, taken_at: DateTime<Utc>) -> Result<Arc<Snapshot<S>>, ModelError> {
        let previous = self.latest.taken_at();
        if taken_at < previous {
            error!(
                subject = %self.latest.subject(),
                %previous,
                attempted = %taken_at,
                "Refusing snapshot older than history head"
            );
            return Err(ModelError::NonMonotonicTime {
                previous,
                attempted: taken_at,
            });
        }

        self.latest = Snapshot::after(&self.latest, state, taken_at);
        self.count += 1;
        trace!(subject = %self.latest.subject(), sequence = self.latest.sequence(), "Snapshot logged");
        Ok(Arc::clone(&self.latest))
    }

    pub fn last(&self) -> &Arc<Snapshot<S>> {
        &self.latest
    }

    pub fn subject(&self) -> EntityId {
        self.latest.subject()
    }

    pub fn view(&self) -> HistoryView<'_, S> {
        HistoryView { history: self }
    }
}

/// Read-only access to a history.
#[derive(Debug)]
pub struct HistoryView<'a, S> {
    history: &'a History<S>,
}

impl<'a, S> Clone for HistoryView<'a, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, S> Copy for HistoryView<'a, S> {}

impl<'a, S> HistoryView<'a, S> {
    /// Number of snapshots ever taken, including the initial one.
    pub fn count(&self) -> usize {
        self.history.count
    }

    pub fn last(&self) -> Arc<Snapshot<S>> {
        Arc::clone(&self.history.latest)
    }

    /// Latest first.
    pub fn iter(&self) -> Chain<'a, S> {
        Chain::from_latest(&self.history.latest)
    }

    /// The snapshot `rank + 1` links behind the latest: rank 0 is the state
    /// just before the most recent change.
    pub fn snap(&self, rank: usize) -> Option<Arc<Snapshot<S>>> {
        self.iter().nth(rank.checked_add(1)?).cloned()
    }

    /// The most recent snapshot taken at or before `at`.
    pub fn snap_before(&self, at: DateTime<Utc>) -> Option<Arc<Snapshot<S>>> {
        self.iter().find(|snap| snap.taken_at() <= at).cloned()
    }

    /// True if `snap` is a link of this chain (pointer identity).
    pub fn contains(&self, snap: &Snapshot<S>) -> bool {
        self.iter().any(|link| std::ptr::eq(Arc::as_ptr(link), snap))
    }
}

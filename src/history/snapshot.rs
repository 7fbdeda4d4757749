//! Immutable, backward-linked snapshot chain.

use crate::types::EntityId;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// One capture of an entity's state. Never edited after creation; shared by
/// `Arc` between the owning history, the audit log and any caller holding it.
#[derive(Debug)]
pub struct Snapshot<S> {
    subject: EntityId,
    sequence: u64,
    taken_at: DateTime<Utc>,
    state: S,
    previous: Option<Arc<Snapshot<S>>>,
}

impl<S> Snapshot<S> {
    pub(crate) fn first(subject: EntityId, state: S, taken_at: DateTime<Utc>) -> Arc<Self> {
        Arc::new(Snapshot {
            subject,
            sequence: 0,
            taken_at,
            state,
            previous: None,
        })
    }

    pub(crate) fn after(previous: &Arc<Self>, state: S, taken_at: DateTime<Utc>) -> Arc<Self> {
        Arc::new(Snapshot {
            subject: previous.subject,
            sequence: previous.sequence + 1,
            taken_at,
            state,
            previous: Some(Arc::clone(previous)),
        })
    }

    /// The entity this snapshot was taken of.
    pub fn subject(&self) -> EntityId {
        self.subject
    }

    /// Position in the chain, 0 for the capture taken at construction.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn taken_at(&self) -> DateTime<Utc> {
        self.taken_at
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    /// The snapshot immediately before this one, if any.
    pub fn previous(&self) -> Option<&Arc<Snapshot<S>>> {
        self.previous.as_ref()
    }
}

impl<S> Drop for Snapshot<S> {
    fn drop(&mut self) {
        // Unlink iteratively; a recursive drop of a long chain overflows the stack.
        let mut next = self.previous.take();
        while let Some(snap) = next {
            match Arc::try_unwrap(snap) {
                Ok(mut inner) => next = inner.previous.take(),
                Err(_) => break,
            }
        }
    }
}

/// Walks a chain from a snapshot back to the first capture.
pub struct Chain<'a, S> {
    next: Option<&'a Arc<Snapshot<S>>>,
}

impl<'a, S> Chain<'a, S> {
    pub fn from_latest(latest: &'a Arc<Snapshot<S>>) -> Self {
        Chain { next: Some(latest) }
    }
}

impl<'a, S> Iterator for Chain<'a, S> {
    type Item = &'a Arc<Snapshot<S>>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.previous.as_ref();
        Some(current)
    }
}

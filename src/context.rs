//! Collaborators shared by every model operation.

use crate::accessor::{Accessor, FsAccessor};
use crate::audit::AuditLog;
use crate::history::{Clock, SystemClock};
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Filesystem access, time source and audit log, handed explicitly to every
/// operation that mutates the tree.
pub struct Context {
    accessor: Box<dyn Accessor>,
    clock: Arc<dyn Clock>,
    audit: AuditLog,
}

impl Context {
    pub fn new(accessor: impl Accessor + 'static) -> Self {
        Self::with_clock(accessor, Arc::new(SystemClock))
    }

    pub fn with_clock(accessor: impl Accessor + 'static, clock: Arc<dyn Clock>) -> Self {
        Self {
            accessor: Box::new(accessor),
            clock,
            audit: AuditLog::new(),
        }
    }

    /// Real filesystem, wall clock.
    pub fn filesystem() -> Self {
        Self::new(FsAccessor::new())
    }

    pub fn accessor(&self) -> &dyn Accessor {
        self.accessor.as_ref()
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn audit_log(&self) -> &AuditLog {
        &self.audit
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("audit_entries", &self.audit.len())
            .finish_non_exhaustive()
    }
}

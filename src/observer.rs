//! Change notification for whoever drives the model (a UI, the CLI).
//!
//! An [`Observable`] holds a value and a list of listeners; every update
//! notifies each listener once, in registration order, with the observable
//! itself.

use crate::types::{DirectoryId, ItemId};
use serde::Serialize;
use std::sync::Arc;

pub trait Listener<T>: Send + Sync {
    fn notify(&self, changed: &Observable<T>);
}

pub struct Observable<T> {
    value: T,
    listeners: Vec<Arc<dyn Listener<T>>>,
}

impl<T> Observable<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            listeners: Vec::new(),
        }
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    /// Registering the same listener twice has no effect.
    pub fn add_listener(&mut self, listener: Arc<dyn Listener<T>>) {
        if !self.listeners.iter().any(|l| same(l, &listener)) {
            self.listeners.push(listener);
        }
    }

    pub fn remove_listener(&mut self, listener: &Arc<dyn Listener<T>>) {
        self.listeners.retain(|l| !same(l, listener));
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Replace the value and notify.
    pub fn update(&mut self, value: T) {
        self.value = value;
        self.touch();
    }

    /// Notify without changing the value, e.g. after the referenced entity mutated.
    pub fn touch(&self) {
        for listener in &self.listeners {
            listener.notify(self);
        }
    }
}

impl<T: Default> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observable")
            .field("value", &self.value)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

fn same<T>(a: &Arc<dyn Listener<T>>, b: &Arc<dyn Listener<T>>) -> bool {
    std::ptr::eq(Arc::as_ptr(a) as *const (), Arc::as_ptr(b) as *const ())
}

/// The active directory and the selected image within it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Reference {
    pub directory: Option<DirectoryId>,
    pub item: Option<ItemId>,
}

impl Reference {
    pub fn directory(directory: DirectoryId) -> Self {
        Self {
            directory: Some(directory),
            item: None,
        }
    }

    pub fn item(directory: DirectoryId, item: ItemId) -> Self {
        Self {
            directory: Some(directory),
            item: Some(item),
        }
    }

    /// Keep the directory, select another image.
    pub fn with_item(self, item: ItemId) -> Self {
        Self {
            item: Some(item),
            ..self
        }
    }
}

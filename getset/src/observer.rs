//! Change and rejection notifications.

use std::rc::Rc;

use crate::error::PropertyError;
use crate::value::Value;

/// A committed change. `name` is a dotted path relative to the observer's container.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyChange {
    pub name: String,
    pub old_value: Value,
    pub new_value: Value,
}

impl PropertyChange {
    pub fn new(name: impl Into<String>, old_value: Value, new_value: Value) -> Self {
        Self {
            name: name.into(),
            old_value,
            new_value,
        }
    }

    /// The same change as seen from the parent container.
    pub(crate) fn nested_under(self, parent_entry: &str) -> Self {
        Self {
            name: format!("{}.{}", parent_entry, self.name),
            ..self
        }
    }
}

/// A rejected write. `name` is a dotted path relative to the observer's container.
#[derive(Debug, Clone)]
pub struct PropertyRejection {
    pub name: String,
    pub reason: PropertyError,
}

impl PropertyRejection {
    pub fn new(name: impl Into<String>, reason: PropertyError) -> Self {
        Self {
            name: name.into(),
            reason,
        }
    }

    pub(crate) fn nested_under(self, parent_entry: &str) -> Self {
        Self {
            name: format!("{}.{}", parent_entry, self.name),
            ..self
        }
    }
}

/// Hooks a container calls after a commit or a rejection.
///
/// Both methods default to no-ops. Hooks run after the container has
/// released its internal state, so they may read or write the container.
pub trait PropertyObserver {
    fn property_changed(&self, change: &PropertyChange) {
        let _ = change;
    }

    fn property_rejected(&self, rejection: &PropertyRejection) {
        let _ = rejection;
    }
}

/// Observer that ignores every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl PropertyObserver for NoopObserver {}

impl<T: PropertyObserver + ?Sized> PropertyObserver for Rc<T> {
    fn property_changed(&self, change: &PropertyChange) {
        (**self).property_changed(change);
    }

    fn property_rejected(&self, rejection: &PropertyRejection) {
        (**self).property_rejected(rejection);
    }
}

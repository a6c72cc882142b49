//! The access layer between named reads/writes and entries.
//!
//! Every external read or write of a container's property goes through
//! the [`Interceptor`]: undeclared names are errors, callable members
//! pass through untouched, and rejected writes are either returned or
//! routed to observers depending on the configured [`RejectionMode`].

use std::collections::HashMap;
use std::fmt;

use crate::entry::{Entry, Outcome};
use crate::error::{Access, DefinitionError, PropertyError};
use crate::options::{IdentityPolicy, Options, RejectionMode};
use crate::schema::Method;
use crate::value::Value;

/// Result of reading a slot.
#[derive(Clone)]
pub enum Member {
    Value(Value),
    Method(Method),
}

impl fmt::Debug for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Member::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Member::Method(_) => write!(f, "Method(<fn>)"),
        }
    }
}

/// Reflection view of a declared property: plain data, never the entry itself.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDescriptor {
    pub value: Value,
    pub configurable: bool,
    pub enumerable: bool,
    pub writable: bool,
}

/// The slot table of a container: entries in declaration order plus methods.
#[derive(Default)]
pub(crate) struct Slots {
    entries: Vec<Entry>,
    index: HashMap<String, usize>,
    methods: HashMap<String, Method>,
}

impl Slots {
    pub(crate) fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name) || self.methods.contains_key(name)
    }

    pub(crate) fn insert_entry(&mut self, entry: Entry) -> Result<(), DefinitionError> {
        if self.contains(entry.name()) {
            return Err(DefinitionError::duplicate_property(entry.name()));
        }
        self.index.insert(entry.name().to_string(), self.entries.len());
        self.entries.push(entry);
        Ok(())
    }

    pub(crate) fn insert_method(
        &mut self,
        name: String,
        method: Method,
    ) -> Result<(), DefinitionError> {
        if self.contains(&name) {
            return Err(DefinitionError::duplicate_property(name));
        }
        self.methods.insert(name, method);
        Ok(())
    }

    pub(crate) fn entry(&self, name: &str) -> Option<&Entry> {
        self.index.get(name).map(|&i| &self.entries[i])
    }

    fn entry_mut(&mut self, name: &str) -> Option<&mut Entry> {
        match self.index.get(name) {
            Some(&i) => self.entries.get_mut(i),
            None => None,
        }
    }

    pub(crate) fn entries(&self) -> &[Entry] {
        &self.entries
    }
}

/// Trap policy for a container.
#[derive(Debug, Clone, Copy)]
pub struct Interceptor {
    rejection: RejectionMode,
    identity: IdentityPolicy,
    extensible: bool,
}

impl Interceptor {
    pub fn new(options: &Options) -> Self {
        Self {
            rejection: options.rejection,
            identity: options.identity,
            extensible: options.extensible,
        }
    }

    pub fn rejection_mode(&self) -> RejectionMode {
        self.rejection
    }

    pub fn is_extensible(&self) -> bool {
        self.extensible
    }

    /// Read a slot: methods are returned unchanged, entries yield their value.
    pub(crate) fn read(&self, slots: &Slots, name: &str) -> Result<Member, PropertyError> {
        if let Some(method) = slots.methods.get(name) {
            return Ok(Member::Method(method.clone()));
        }
        slots
            .entry(name)
            .map(|entry| Member::Value(entry.value().clone()))
            .ok_or_else(|| PropertyError::undeclared(Access::Get, name))
    }

    /// Route a write to its entry.
    pub(crate) fn write(
        &self,
        slots: &mut Slots,
        name: &str,
        candidate: Value,
    ) -> Result<Outcome, PropertyError> {
        let entry = slots
            .entry_mut(name)
            .ok_or_else(|| PropertyError::undeclared(Access::Set, name))?;
        entry.update(candidate, self.identity)
    }

    pub(crate) fn describe(
        &self,
        slots: &Slots,
        name: &str,
    ) -> Result<PropertyDescriptor, PropertyError> {
        let entry = slots
            .entry(name)
            .ok_or_else(|| PropertyError::undeclared(Access::Get, name))?;
        Ok(PropertyDescriptor {
            value: entry.value().clone(),
            configurable: true,
            enumerable: true,
            writable: !entry.is_read_only(),
        })
    }

    /// Check that `name` may be added after construction.
    pub(crate) fn check_define(&self, slots: &Slots, name: &str) -> Result<(), PropertyError> {
        if !self.is_extensible() {
            return Err(PropertyError::NotExtensible {
                name: name.to_string(),
            });
        }
        if slots.contains(name) {
            return Err(PropertyError::AlreadyDefined {
                name: name.to_string(),
            });
        }
        Ok(())
    }

    /// Declared properties can never be removed.
    pub(crate) fn delete(&self, slots: &Slots, name: &str) -> Result<(), PropertyError> {
        if slots.contains(name) {
            Err(PropertyError::NotDeletable {
                name: name.to_string(),
            })
        } else {
            Err(PropertyError::undeclared(Access::Set, name))
        }
    }
}

//! The GetSet container.
//!
//! A `GetSet` is a cheap-to-clone handle to a container of entries. Nested
//! containers hold a weak link back to the entry that owns them, used only
//! to rewrite notification names as dotted paths while bubbling.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::{debug, trace, warn};

use crate::entry::{Entry, Outcome};
use crate::error::{Access, DefinitionError, PropertyError, PropertyResult};
use crate::interceptor::{Interceptor, Member, PropertyDescriptor, Slots};
use crate::observer::{NoopObserver, PropertyChange, PropertyObserver, PropertyRejection};
use crate::options::{Options, RejectionMode};
use crate::schema::{Descriptor, Schema};
use crate::value::{Fields, Value};

/// Handle to a schema-driven, observable property container.
#[derive(Clone)]
pub struct GetSet {
    inner: Rc<Inner>,
}

struct Inner {
    slots: RefCell<Slots>,
    parent: RefCell<Option<ParentLink>>,
    observer: Box<dyn PropertyObserver>,
    interceptor: Interceptor,
}

/// A rejected write and the dotted path of the property that refused it.
type Rejected = (String, PropertyError);

/// Non-owning link from a nested container to the entry holding it.
struct ParentLink {
    owner: Weak<Inner>,
    entry: String,
}

/// Builder for a container with options and an observer.
pub struct GetSetBuilder {
    schema: Schema,
    options: Options,
    observer: Box<dyn PropertyObserver>,
}

impl GetSetBuilder {
    pub fn options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    pub fn observer(mut self, observer: impl PropertyObserver + 'static) -> Self {
        self.observer = Box::new(observer);
        self
    }

    pub fn build(self) -> Result<GetSet, DefinitionError> {
        let (properties, methods) = self.schema.into_parts();
        let mut slots = Slots::default();
        let mut children: Vec<(String, GetSet)> = Vec::new();

        for (name, descriptor) in properties {
            match descriptor {
                Descriptor::Field(def) => slots.insert_entry(Entry::new(name, def)?)?,
                Descriptor::Nested(child) => {
                    child.ensure_detached(&name)?;
                    if let Some((other, _)) = children.iter().find(|(_, c)| c.ptr_eq(&child)) {
                        return Err(DefinitionError::already_nested(name, other.clone()));
                    }
                    slots.insert_entry(Entry::nested(name.clone(), child.clone()))?;
                    children.push((name, child));
                }
            }
        }
        for (name, method) in methods {
            slots.insert_method(name, method)?;
        }

        let gs = GetSet {
            inner: Rc::new(Inner {
                slots: RefCell::new(slots),
                parent: RefCell::new(None),
                observer: self.observer,
                interceptor: Interceptor::new(&self.options),
            }),
        };
        for (name, child) in children {
            child.attach(&gs, name);
        }
        Ok(gs)
    }
}

impl fmt::Debug for GetSetBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GetSetBuilder")
            .field("schema", &self.schema)
            .field("options", &self.options)
            .finish()
    }
}

impl GetSet {
    /// Build a container with default options and no observer.
    pub fn new(schema: Schema) -> Result<Self, DefinitionError> {
        Self::builder(schema).build()
    }

    pub fn builder(schema: Schema) -> GetSetBuilder {
        GetSetBuilder {
            schema,
            options: Options::default(),
            observer: Box::new(NoopObserver),
        }
    }

    /// Returns true if both handles refer to the same container.
    pub fn ptr_eq(&self, other: &GetSet) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn interceptor(&self) -> &Interceptor {
        &self.inner.interceptor
    }

    /// Declared property names in declaration order.
    pub fn keys(&self) -> Vec<String> {
        self.inner
            .slots
            .borrow()
            .entries()
            .iter()
            .map(|e| e.name().to_string())
            .collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.inner.slots.borrow().entry(name).is_some()
    }

    /// Read a slot: a property value or a callable member.
    pub fn member(&self, name: &str) -> PropertyResult<Member> {
        let slots = self.inner.slots.borrow();
        self.inner.interceptor.read(&slots, name)
    }

    /// Read a property value.
    pub fn get(&self, name: &str) -> PropertyResult<Value> {
        match self.member(name)? {
            Member::Value(value) => Ok(value),
            Member::Method(_) => Err(PropertyError::Method {
                name: name.to_string(),
            }),
        }
    }

    /// The nested container held by `name`.
    pub fn child(&self, name: &str) -> PropertyResult<GetSet> {
        match self.get(name)? {
            Value::GetSet(child) => Ok(child),
            _ => Err(PropertyError::NotNested {
                name: name.to_string(),
            }),
        }
    }

    /// Invoke a callable member.
    pub fn call(&self, name: &str) -> PropertyResult<Value> {
        match self.member(name)? {
            Member::Method(method) => Ok(method(self)),
            Member::Value(_) => Err(PropertyError::undeclared(Access::Get, name)),
        }
    }

    /// The declared default of a property.
    pub fn default_value(&self, name: &str) -> PropertyResult<Value> {
        self.inner
            .slots
            .borrow()
            .entry(name)
            .map(|e| e.default_value().clone())
            .ok_or_else(|| PropertyError::undeclared(Access::Get, name))
    }

    /// Write a property.
    ///
    /// In strict mode a rejection is returned; in observe mode it is
    /// delivered to observers and `Ok(())` is returned. Rejections raised
    /// by a nested container during a merge or reset are routed by this
    /// container's mode under their dotted path.
    pub fn set(&self, name: &str, candidate: impl Into<Value>) -> PropertyResult<()> {
        let written = self.write(name, candidate.into());
        self.settle(written).map_err(|(_, reason)| reason)
    }

    /// Reset one property to its default.
    pub fn reset(&self, name: &str) -> PropertyResult<()> {
        self.set(name, Value::DefaultValue)
    }

    /// Assign each field onto this container, one independent write each.
    ///
    /// Not atomic: in strict mode a rejection stops the merge and earlier
    /// fields stay committed.
    pub fn merge(&self, fields: &Fields) -> PropertyResult<()> {
        self.merge_fields(fields).map_err(|(_, reason)| reason)
    }

    /// Read a dotted path through nested containers.
    pub fn get_path(&self, path: &str) -> PropertyResult<Value> {
        match path.split_once('.') {
            Some((head, rest)) => self.child(head)?.get_path(rest),
            None => self.get(path),
        }
    }

    /// Write a dotted path through nested containers.
    pub fn set_path(&self, path: &str, candidate: impl Into<Value>) -> PropertyResult<()> {
        match path.split_once('.') {
            Some((head, rest)) => self.child(head)?.set_path(rest, candidate),
            None => self.set(path, candidate),
        }
    }

    /// Reset the listed properties (all when `None`) to their defaults.
    ///
    /// Nested containers are reset recursively. Read-only fields already
    /// hold their default and are skipped.
    pub fn reset_to_defaults(&self, whitelist: Option<&[&str]>) -> PropertyResult<()> {
        let names = self.resolve_whitelist(whitelist)?;
        self.reset_fields(&names).map_err(|(_, reason)| reason)
    }

    /// Plain ordered projection of the listed properties (all when `None`).
    ///
    /// Nested containers are expanded recursively.
    pub fn to_plain_object(&self, whitelist: Option<&[&str]>) -> PropertyResult<Value> {
        let names = self.resolve_whitelist(whitelist)?;
        let slots = self.inner.slots.borrow();
        let mut fields = Fields::with_capacity(names.len());
        for name in names {
            let entry = slots
                .entry(&name)
                .ok_or_else(|| PropertyError::undeclared(Access::Get, &name))?;
            fields.push((name, plain(entry.value())));
        }
        Ok(Value::from(fields))
    }

    /// Projection of every declared property.
    pub(crate) fn snapshot(&self) -> Fields {
        self.inner
            .slots
            .borrow()
            .entries()
            .iter()
            .map(|e| (e.name().to_string(), plain(e.value())))
            .collect()
    }

    /// Reflection view of a property.
    pub fn describe(&self, name: &str) -> PropertyResult<PropertyDescriptor> {
        let slots = self.inner.slots.borrow();
        self.inner.interceptor.describe(&slots, name)
    }

    /// Add a property after construction. Requires `Options::extensible`.
    pub fn define_property(
        &self,
        name: &str,
        descriptor: impl Into<Descriptor>,
    ) -> PropertyResult<()> {
        {
            let slots = self.inner.slots.borrow();
            self.inner.interceptor.check_define(&slots, name)?;
        }
        match descriptor.into() {
            Descriptor::Field(def) => {
                let entry = Entry::new(name, def)?;
                self.inner.slots.borrow_mut().insert_entry(entry)?;
            }
            Descriptor::Nested(child) => {
                child.ensure_detached(name)?;
                if child.ptr_eq(self) || self.ancestors().iter().any(|a| a.ptr_eq(&child)) {
                    return Err(DefinitionError::CyclicNesting {
                        entry: name.to_string(),
                    }
                    .into());
                }
                self.inner
                    .slots
                    .borrow_mut()
                    .insert_entry(Entry::nested(name, child.clone()))?;
                child.attach(self, name.to_string());
            }
        }
        debug!(property = name, "property defined");
        Ok(())
    }

    /// Declared properties cannot be removed; this always fails.
    pub fn delete_property(&self, name: &str) -> PropertyResult<()> {
        let slots = self.inner.slots.borrow();
        self.inner.interceptor.delete(&slots, name)
    }

    /// The container holding this one, if it is nested and still alive.
    pub fn parent(&self) -> Option<GetSet> {
        self.parent_link().map(|(owner, _)| owner)
    }

    /// Dotted path from the root container to this one.
    pub fn parent_path(&self) -> Option<String> {
        let mut segments = Vec::new();
        let mut current = self.clone();
        while let Some((owner, entry)) = current.parent_link() {
            segments.push(entry);
            current = owner;
        }
        if segments.is_empty() {
            return None;
        }
        segments.reverse();
        Some(segments.join("."))
    }

    fn ancestors(&self) -> Vec<GetSet> {
        let mut ancestors = Vec::new();
        let mut current = self.parent();
        while let Some(gs) = current {
            current = gs.parent();
            ancestors.push(gs);
        }
        ancestors
    }

    fn parent_link(&self) -> Option<(GetSet, String)> {
        let link = self.inner.parent.borrow();
        let link = link.as_ref()?;
        let owner = link.owner.upgrade()?;
        Some((GetSet { inner: owner }, link.entry.clone()))
    }

    fn ensure_detached(&self, entry: &str) -> Result<(), DefinitionError> {
        match self.parent_link() {
            Some((_, parent_entry)) => Err(DefinitionError::already_nested(entry, parent_entry)),
            None => Ok(()),
        }
    }

    fn attach(&self, owner: &GetSet, entry: String) {
        *self.inner.parent.borrow_mut() = Some(ParentLink {
            owner: Rc::downgrade(&owner.inner),
            entry,
        });
    }

    /// Validate and commit one write. A failure carries the dotted path,
    /// relative to this container, of the property that rejected it.
    fn write(&self, name: &str, candidate: Value) -> Result<(), Rejected> {
        let outcome = self
            .inner
            .interceptor
            .write(&mut self.inner.slots.borrow_mut(), name, candidate)
            .map_err(|reason| (name.to_string(), reason))?;

        match outcome {
            Outcome::Unchanged => {
                trace!(property = name, "identical value committed without notification");
                Ok(())
            }
            Outcome::Changed(change) => {
                debug!(
                    property = %change.name,
                    old = %change.old_value,
                    new = %change.new_value,
                    "property changed"
                );
                self.bubble_change(change);
                Ok(())
            }
            Outcome::Merge { target, fields } => target
                .merge_fields(&fields)
                .map_err(|(path, reason)| (format!("{}.{}", name, path), reason)),
            Outcome::Reset(target) => {
                debug!(property = name, "resetting nested container");
                target
                    .reset_fields(&target.keys())
                    .map_err(|(path, reason)| (format!("{}.{}", name, path), reason))
            }
        }
    }

    fn merge_fields(&self, fields: &Fields) -> Result<(), Rejected> {
        debug!(fields = fields.len(), "merging into nested container");
        for (name, value) in fields {
            let written = self.write(name, value.clone());
            self.settle(written)?;
        }
        Ok(())
    }

    fn reset_fields(&self, names: &[String]) -> Result<(), Rejected> {
        for name in names {
            let lookup = {
                let slots = self.inner.slots.borrow();
                slots
                    .entry(name)
                    .map(|entry| (entry.child().cloned(), entry.is_read_only()))
            };
            let reset = match lookup {
                None => Err((name.clone(), PropertyError::undeclared(Access::Set, name))),
                Some((Some(child), _)) => child
                    .reset_fields(&child.keys())
                    .map_err(|(path, reason)| (format!("{}.{}", name, path), reason)),
                Some((None, true)) => {
                    trace!(property = %name, "skipping read-only reset");
                    Ok(())
                }
                Some((None, false)) => self.write(name, Value::DefaultValue),
            };
            self.settle(reset)?;
        }
        Ok(())
    }

    /// Apply the rejection mode: observe mode delivers the rejection and
    /// swallows it, strict mode hands it back.
    fn settle(&self, result: Result<(), Rejected>) -> Result<(), Rejected> {
        match (result, self.inner.interceptor.rejection_mode()) {
            (Err((path, reason)), RejectionMode::Observe) => {
                warn!(property = %path, reason = %reason, "property rejected");
                self.bubble_rejection(PropertyRejection::new(path, reason));
                Ok(())
            }
            (result, _) => result,
        }
    }

    fn bubble_change(&self, mut change: PropertyChange) {
        let mut current = self.clone();
        loop {
            current.inner.observer.property_changed(&change);
            match current.parent_link() {
                Some((owner, entry)) => {
                    change = change.nested_under(&entry);
                    current = owner;
                }
                None => break,
            }
        }
    }

    fn bubble_rejection(&self, mut rejection: PropertyRejection) {
        let mut current = self.clone();
        loop {
            current.inner.observer.property_rejected(&rejection);
            match current.parent_link() {
                Some((owner, entry)) => {
                    rejection = rejection.nested_under(&entry);
                    current = owner;
                }
                None => break,
            }
        }
    }

    fn resolve_whitelist(&self, whitelist: Option<&[&str]>) -> PropertyResult<Vec<String>> {
        Ok(match whitelist {
            Some(names) => names.iter().map(|n| n.to_string()).collect(),
            None => self.keys(),
        })
    }
}

fn plain(value: &Value) -> Value {
    match value {
        Value::GetSet(child) => Value::from(child.snapshot()),
        other => other.clone(),
    }
}

impl PartialEq for GetSet {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for GetSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GetSet")
            .field("keys", &self.keys())
            .field("path", &self.parent_path())
            .finish()
    }
}

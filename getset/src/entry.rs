//! Property entries.
//!
//! An entry owns one property's constraints, its current value and its
//! default. `update` is the validate-then-commit step; it never calls
//! observers itself but reports what happened as an [`Outcome`] so the
//! owning container can notify after releasing its state.

use std::mem;
use std::rc::Rc;

use crate::constraint::{Constraint, ConstraintSlot};
use crate::error::{DefinitionError, PropertyError};
use crate::observer::PropertyChange;
use crate::options::IdentityPolicy;
use crate::schema::FieldDef;
use crate::value::{Fields, TypeTag, Value};
use crate::GetSet;

/// Result of a successful [`Entry::update`].
#[derive(Debug)]
pub enum Outcome {
    /// The value changed; the owner must be notified.
    Changed(PropertyChange),
    /// The candidate was identical to the current value; committed silently.
    Unchanged,
    /// Assign these fields onto the nested container, one write each.
    Merge { target: GetSet, fields: Rc<Fields> },
    /// Reset the nested container to its defaults.
    Reset(GetSet),
}

/// The validated, observable storage cell for one property.
#[derive(Debug)]
pub struct Entry {
    name: String,
    type_constraint: Constraint,
    value_constraint: Constraint,
    hint: Option<String>,
    value: Value,
    default_value: Value,
    nested: bool,
}

impl Entry {
    /// Build an entry from a field definition. The default is not validated.
    pub fn new(name: impl Into<String>, def: FieldDef) -> Result<Self, DefinitionError> {
        let name = name.into();
        if def.default.is_default_marker() {
            return Err(DefinitionError::DefaultMarker { entry: name });
        }
        if def.default.contains_container() {
            return Err(DefinitionError::ContainerDefault { entry: name });
        }
        let type_constraint = Constraint::compile(def.type_constraint, &name, ConstraintSlot::Type)?;
        let value_constraint =
            Constraint::compile(def.value_constraint, &name, ConstraintSlot::Value)?;

        Ok(Self {
            name,
            type_constraint,
            value_constraint,
            hint: def.hint,
            value: def.default.clone(),
            default_value: def.default,
            nested: false,
        })
    }

    /// An entry whose value is a nested container. The slot cannot be
    /// reassigned; writes merge into the container instead.
    pub(crate) fn nested(name: impl Into<String>, child: GetSet) -> Self {
        let value = Value::GetSet(child);
        Self {
            name: name.into(),
            type_constraint: Constraint::None,
            value_constraint: Constraint::None,
            hint: None,
            value: value.clone(),
            default_value: value,
            nested: true,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn default_value(&self) -> &Value {
        &self.default_value
    }

    pub fn hint(&self) -> Option<&str> {
        self.hint.as_deref()
    }

    /// True for read-only fields and for nested slots.
    pub fn is_read_only(&self) -> bool {
        self.nested || self.type_constraint.is_read_only()
    }

    /// The nested container, if this entry holds one.
    pub fn child(&self) -> Option<&GetSet> {
        if self.nested {
            self.value.as_getset()
        } else {
            None
        }
    }

    /// Test the candidate's type tag against the type constraint.
    pub fn matches_type(&self, candidate: &Value) -> bool {
        self.type_constraint
            .test(candidate.type_tag().as_str(), candidate)
    }

    /// Test the candidate's string form against the value constraint.
    pub fn matches_value(&self, candidate: &Value) -> bool {
        match &self.value_constraint {
            Constraint::Pattern(_) => self
                .value_constraint
                .test(&candidate.to_string(), candidate),
            other => other.test("", candidate),
        }
    }

    /// Validate `candidate` and commit it.
    ///
    /// On error the stored value is untouched.
    pub fn update(
        &mut self,
        candidate: Value,
        identity: IdentityPolicy,
    ) -> Result<Outcome, PropertyError> {
        if self.nested {
            return self.update_nested(candidate);
        }

        if self.type_constraint.is_read_only() {
            return Err(PropertyError::read_only(&self.name));
        }

        let candidate = if candidate.is_default_marker() {
            self.default_value.clone()
        } else {
            candidate
        };

        // Containers join a tree only through nesting.
        if candidate.contains_container() {
            return Err(PropertyError::type_mismatch(
                &self.name,
                "non-container value",
                TypeTag::GetSet,
            ));
        }

        if !self.matches_type(&candidate) {
            let expected = self.type_constraint.pattern().unwrap_or("type pattern");
            return Err(PropertyError::type_mismatch(
                &self.name,
                expected,
                candidate.type_tag(),
            ));
        }

        if !self.matches_value(&candidate) {
            let expected = match (&self.hint, self.value_constraint.pattern()) {
                (Some(hint), _) => hint.clone(),
                (None, Some(pattern)) => format!("'{}'", pattern),
                (None, None) => "pattern".to_string(),
            };
            return Err(PropertyError::value_mismatch(
                &self.name,
                expected,
                candidate.to_string(),
            ));
        }

        if candidate.is_identical(&self.value, identity) {
            self.value = candidate;
            return Ok(Outcome::Unchanged);
        }

        let old_value = mem::replace(&mut self.value, candidate.clone());
        Ok(Outcome::Changed(PropertyChange::new(
            &self.name, old_value, candidate,
        )))
    }

    fn update_nested(&self, candidate: Value) -> Result<Outcome, PropertyError> {
        let Value::GetSet(target) = &self.value else {
            return Err(PropertyError::read_only(&self.name));
        };
        match candidate {
            Value::Object(fields) => Ok(Outcome::Merge {
                target: target.clone(),
                fields,
            }),
            Value::DefaultValue => Ok(Outcome::Reset(target.clone())),
            Value::GetSet(other) if other.ptr_eq(target) => Ok(Outcome::Unchanged),
            _ => Err(PropertyError::read_only(&self.name)),
        }
    }
}

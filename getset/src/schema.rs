//! Schema definition types.
//!
//! A schema is an ordered list of property descriptors (plain fields or
//! nested containers) plus callable members. Declaration order is the
//! order of `keys()` and of the plain projection.

use std::fmt;
use std::rc::Rc;

use crate::constraint::{read_only, ConstraintDef, Predicate};
use crate::error::DefinitionError;
use crate::value::Value;
use crate::GetSet;

/// A callable member. Methods are not entries and are never validated.
pub type Method = Rc<dyn Fn(&GetSet) -> Value>;

/// Field definition within a schema.
#[derive(Clone, Default)]
pub struct FieldDef {
    /// Type constraint (pattern over the type tag, predicate, or read-only marker).
    pub type_constraint: ConstraintDef,
    /// Value constraint (pattern over the string form, or predicate).
    pub value_constraint: ConstraintDef,
    /// Human-readable description used in place of the pattern in errors.
    pub hint: Option<String>,
    /// Default value, trusted without validation.
    pub default: Value,
}

impl FieldDef {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_type(mut self, pattern: impl Into<String>) -> Self {
        self.type_constraint = ConstraintDef::Pattern(pattern.into());
        self
    }

    pub fn with_type_predicate(mut self, predicate: impl Fn(&Value) -> bool + 'static) -> Self {
        self.type_constraint = ConstraintDef::Predicate(Rc::new(predicate));
        self
    }

    /// Use a shared predicate, e.g. one built by [`types`](crate::types).
    pub fn with_type_check(mut self, predicate: Predicate) -> Self {
        self.type_constraint = ConstraintDef::Predicate(predicate);
        self
    }

    pub fn read_only(mut self) -> Self {
        self.type_constraint = read_only();
        self
    }

    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.value_constraint = ConstraintDef::Pattern(pattern.into());
        self
    }

    pub fn with_value_predicate(mut self, predicate: impl Fn(&Value) -> bool + 'static) -> Self {
        self.value_constraint = ConstraintDef::Predicate(Rc::new(predicate));
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = value.into();
        self
    }
}

impl fmt::Debug for FieldDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDef")
            .field("type_constraint", &self.type_constraint)
            .field("value_constraint", &self.value_constraint)
            .field("hint", &self.hint)
            .field("default", &self.default)
            .finish()
    }
}

/// What a schema key declares.
#[derive(Debug, Clone)]
pub enum Descriptor {
    Field(FieldDef),
    Nested(GetSet),
}

impl From<FieldDef> for Descriptor {
    fn from(def: FieldDef) -> Self {
        Descriptor::Field(def)
    }
}

impl From<GetSet> for Descriptor {
    fn from(gs: GetSet) -> Self {
        Descriptor::Nested(gs)
    }
}

/// An ordered schema.
#[derive(Clone, Default)]
pub struct Schema {
    properties: Vec<(String, Descriptor)>,
    methods: Vec<(String, Method)>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a plain field.
    pub fn field(mut self, name: impl Into<String>, def: FieldDef) -> Self {
        self.properties.push((name.into(), Descriptor::Field(def)));
        self
    }

    /// Declare a nested container.
    pub fn nested(mut self, name: impl Into<String>, child: GetSet) -> Self {
        self.properties.push((name.into(), Descriptor::Nested(child)));
        self
    }

    /// Declare a callable member.
    pub fn method(
        mut self,
        name: impl Into<String>,
        method: impl Fn(&GetSet) -> Value + 'static,
    ) -> Self {
        self.methods.push((name.into(), Rc::new(method)));
        self
    }

    pub fn properties(&self) -> &[(String, Descriptor)] {
        &self.properties
    }

    pub fn methods(&self) -> &[(String, Method)] {
        &self.methods
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub(crate) fn into_parts(self) -> (Vec<(String, Descriptor)>, Vec<(String, Method)>) {
        (self.properties, self.methods)
    }

    /// Load a schema from JSON.
    ///
    /// Each key maps to `{ "type"?, "pattern"?, "hint"?, "value"? }`, to a
    /// bare type pattern string, or to `{ "fields": { ... } }` for a nested
    /// container built with default options.
    pub fn from_json(json: &serde_json::Value) -> Result<Self, DefinitionError> {
        let object = match json {
            serde_json::Value::Null => return Err(DefinitionError::MissingSchema),
            serde_json::Value::Object(object) => object,
            other => return Err(invalid("schema", "schema", other)),
        };

        let mut schema = Schema::new();
        for (name, descriptor) in object {
            match descriptor {
                serde_json::Value::String(pattern) => {
                    schema = schema.field(name, FieldDef::new().with_type(pattern.as_str()));
                }
                serde_json::Value::Object(keys) => {
                    if let Some(fields) = keys.get("fields") {
                        let child = GetSet::new(Schema::from_json(fields)?)?;
                        schema = schema.nested(name, child);
                    } else {
                        schema = schema.field(name, field_from_json(name, keys)?);
                    }
                }
                other => return Err(invalid(name, "descriptor", other)),
            }
        }
        Ok(schema)
    }
}

fn field_from_json(
    name: &str,
    keys: &serde_json::Map<String, serde_json::Value>,
) -> Result<FieldDef, DefinitionError> {
    let mut def = FieldDef::new();
    for (key, value) in keys {
        match (key.as_str(), value) {
            ("type", serde_json::Value::String(pattern)) => def = def.with_type(pattern.as_str()),
            ("pattern", serde_json::Value::String(pattern)) => {
                def = def.with_pattern(pattern.as_str())
            }
            ("hint", serde_json::Value::String(hint)) => def = def.with_hint(hint.as_str()),
            ("value", value) => def = def.with_default(Value::from(value)),
            _ => return Err(invalid(name, key, value)),
        }
    }
    Ok(def)
}

fn invalid(entry: &str, field: &str, found: &serde_json::Value) -> DefinitionError {
    DefinitionError::invalid_field(entry, field, found.to_string(), Value::from(found).type_tag())
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("properties", &self.properties)
            .field(
                "methods",
                &self.methods.iter().map(|(name, _)| name).collect::<Vec<_>>(),
            )
            .finish()
    }
}

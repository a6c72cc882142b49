//! Type and value constraints.
//!
//! A constraint is either a pattern (matched as a full, anchored string
//! match) or a predicate. Type patterns are matched against the value's
//! type tag, value patterns against its string form.

use std::fmt;
use std::rc::Rc;

use regex_lite::Regex;

use crate::error::DefinitionError;
use crate::value::{TypeTag, Value};

/// A user-supplied test on a candidate value.
pub type Predicate = Rc<dyn Fn(&Value) -> bool>;

/// Which slot of an entry a constraint occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintSlot {
    Type,
    Value,
}

impl ConstraintSlot {
    /// Descriptor key used in error messages.
    pub fn key(self) -> &'static str {
        match self {
            ConstraintSlot::Type => "type",
            ConstraintSlot::Value => "pattern",
        }
    }
}

/// An uncompiled constraint, as written in a schema.
#[derive(Clone, Default)]
pub enum ConstraintDef {
    #[default]
    None,
    Pattern(String),
    Predicate(Predicate),
    /// Rejects every write. Only valid as a type constraint.
    ReadOnly,
}

impl fmt::Debug for ConstraintDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstraintDef::None => write!(f, "None"),
            ConstraintDef::Pattern(source) => f.debug_tuple("Pattern").field(source).finish(),
            ConstraintDef::Predicate(_) => write!(f, "Predicate(<fn>)"),
            ConstraintDef::ReadOnly => write!(f, "ReadOnly"),
        }
    }
}

/// The read-only marker for a field's type constraint.
pub fn read_only() -> ConstraintDef {
    ConstraintDef::ReadOnly
}

/// A predicate accepting any value whose type tag is listed.
///
/// `types(&[TypeTag::Number, TypeTag::Null])` accepts numbers and null.
pub fn types(tags: &[TypeTag]) -> Predicate {
    let tags = tags.to_vec();
    Rc::new(move |value: &Value| tags.contains(&value.type_tag()))
}

/// A compiled anchored pattern.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    /// Compile `source` as `^(?:source)$`.
    pub fn new(source: impl Into<String>) -> Result<Self, regex_lite::Error> {
        let source = source.into();
        let regex = Regex::new(&format!("^(?:{})$", source))?;
        Ok(Self { source, regex })
    }

    /// The pattern as written in the schema.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn is_match(&self, subject: &str) -> bool {
        self.regex.is_match(subject)
    }
}

/// A compiled constraint held by an entry.
#[derive(Clone, Default)]
pub enum Constraint {
    #[default]
    None,
    Pattern(Pattern),
    Predicate(Predicate),
    ReadOnly,
}

impl Constraint {
    /// Compile a definition for the given entry and slot.
    pub fn compile(
        def: ConstraintDef,
        entry: &str,
        slot: ConstraintSlot,
    ) -> Result<Self, DefinitionError> {
        match def {
            ConstraintDef::None => Ok(Constraint::None),
            ConstraintDef::Predicate(predicate) => Ok(Constraint::Predicate(predicate)),
            ConstraintDef::ReadOnly => match slot {
                ConstraintSlot::Type => Ok(Constraint::ReadOnly),
                ConstraintSlot::Value => Err(DefinitionError::ReadOnlyValueConstraint {
                    entry: entry.to_string(),
                }),
            },
            ConstraintDef::Pattern(source) => Pattern::new(source.as_str())
                .map(Constraint::Pattern)
                .map_err(|e| {
                    DefinitionError::invalid_pattern(entry, slot.key(), source, e.to_string())
                }),
        }
    }

    pub fn is_read_only(&self) -> bool {
        matches!(self, Constraint::ReadOnly)
    }

    /// The pattern source, if this is a pattern constraint.
    pub fn pattern(&self) -> Option<&str> {
        match self {
            Constraint::Pattern(pattern) => Some(pattern.source()),
            _ => None,
        }
    }

    /// Test a candidate. `subject` is what a pattern is matched against.
    pub(crate) fn test(&self, subject: &str, candidate: &Value) -> bool {
        match self {
            Constraint::None => true,
            Constraint::Pattern(pattern) => pattern.is_match(subject),
            Constraint::Predicate(predicate) => predicate(candidate),
            Constraint::ReadOnly => false,
        }
    }
}

impl fmt::Debug for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraint::None => write!(f, "None"),
            Constraint::Pattern(pattern) => f.debug_tuple("Pattern").field(&pattern.source).finish(),
            Constraint::Predicate(_) => write!(f, "Predicate(<fn>)"),
            Constraint::ReadOnly => write!(f, "ReadOnly"),
        }
    }
}

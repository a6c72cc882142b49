//! Error types for schema definition and property access.

use std::fmt;

use thiserror::Error;

use crate::value::TypeTag;

/// Result type for property operations.
pub type PropertyResult<T> = Result<T, PropertyError>;

/// Errors raised while building a container from a schema.
///
/// These are never routed to observers.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DefinitionError {
    #[error("Required at least 1 argument")]
    MissingSchema,

    #[error("Entry '{entry}': Cannot define '{field}', using {found} ({tag})")]
    InvalidField {
        entry: String,
        field: String,
        found: String,
        tag: TypeTag,
    },

    #[error("Entry '{entry}': Cannot define '{field}', using '{pattern}' ({message})")]
    InvalidPattern {
        entry: String,
        field: String,
        pattern: String,
        message: String,
    },

    #[error("Entry '{entry}': Read-only marker is only valid as a type constraint")]
    ReadOnlyValueConstraint { entry: String },

    #[error("Entry '{entry}': Cannot use the default-value marker as a default value")]
    DefaultMarker { entry: String },

    #[error("Entry '{entry}': Containers can only be declared as nested properties")]
    ContainerDefault { entry: String },

    #[error("Entry '{entry}': Property is declared more than once")]
    DuplicateProperty { entry: String },

    #[error("Entry '{entry}': Container is already nested in '{parent}'")]
    AlreadyNested { entry: String, parent: String },

    #[error("Entry '{entry}': Container cannot be nested inside itself")]
    CyclicNesting { entry: String },
}

impl DefinitionError {
    pub fn invalid_field(
        entry: impl Into<String>,
        field: impl Into<String>,
        found: impl Into<String>,
        tag: TypeTag,
    ) -> Self {
        Self::InvalidField {
            entry: entry.into(),
            field: field.into(),
            found: found.into(),
            tag,
        }
    }

    pub fn invalid_pattern(
        entry: impl Into<String>,
        field: impl Into<String>,
        pattern: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidPattern {
            entry: entry.into(),
            field: field.into(),
            pattern: pattern.into(),
            message: message.into(),
        }
    }

    pub fn duplicate_property(entry: impl Into<String>) -> Self {
        Self::DuplicateProperty {
            entry: entry.into(),
        }
    }

    pub fn already_nested(entry: impl Into<String>, parent: impl Into<String>) -> Self {
        Self::AlreadyNested {
            entry: entry.into(),
            parent: parent.into(),
        }
    }
}

/// The kind of access that hit an undeclared property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Get,
    Set,
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Access::Get => f.write_str("get"),
            Access::Set => f.write_str("set"),
        }
    }
}

/// Errors raised by reads, writes and reflection on a container.
///
/// Rejected writes carry one of these as the rejection reason.
#[derive(Debug, Clone, Error)]
pub enum PropertyError {
    #[error("Cannot {access} property '{name}'. Entry was not defined")]
    Undeclared { access: Access, name: String },

    #[error("Property '{name}' should be of type '{expected}', but got '{actual}'")]
    TypeMismatch {
        name: String,
        expected: String,
        actual: TypeTag,
    },

    #[error("Property '{name}' should be {expected}, but got {}", quote_or_empty(.actual))]
    ValueMismatch {
        name: String,
        expected: String,
        actual: String,
    },

    #[error("Cannot set property '{name}'. It is read-only")]
    ReadOnly { name: String },

    #[error("Cannot get property '{name}'. It is a method")]
    Method { name: String },

    #[error("Cannot get property '{name}'. It is not a nested container")]
    NotNested { name: String },

    #[error("Cannot define property '{name}'. Schema is closed")]
    NotExtensible { name: String },

    #[error("Cannot define property '{name}'. It is already defined")]
    AlreadyDefined { name: String },

    #[error("Cannot delete property '{name}'. Declared properties cannot be removed")]
    NotDeletable { name: String },

    #[error(transparent)]
    Definition(#[from] DefinitionError),
}

fn quote_or_empty(actual: &str) -> String {
    if actual.is_empty() {
        "empty string".to_string()
    } else {
        format!("'{}'", actual)
    }
}

impl PropertyError {
    pub fn undeclared(access: Access, name: impl Into<String>) -> Self {
        Self::Undeclared {
            access,
            name: name.into(),
        }
    }

    pub fn type_mismatch(
        name: impl Into<String>,
        expected: impl Into<String>,
        actual: TypeTag,
    ) -> Self {
        Self::TypeMismatch {
            name: name.into(),
            expected: expected.into(),
            actual,
        }
    }

    pub fn value_mismatch(
        name: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::ValueMismatch {
            name: name.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn read_only(name: impl Into<String>) -> Self {
        Self::ReadOnly { name: name.into() }
    }

    /// The property name the error refers to, if any.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Undeclared { name, .. }
            | Self::TypeMismatch { name, .. }
            | Self::ValueMismatch { name, .. }
            | Self::ReadOnly { name }
            | Self::Method { name }
            | Self::NotNested { name }
            | Self::NotExtensible { name }
            | Self::AlreadyDefined { name }
            | Self::NotDeletable { name } => Some(name),
            Self::Definition(_) => None,
        }
    }

    /// Returns true if the error rejects a candidate value.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::TypeMismatch { .. } | Self::ValueMismatch { .. } | Self::ReadOnly { .. }
        )
    }
}

//! Value types for GetSet properties.
//!
//! Values are the data stored in property entries. Scalars (Null, Bool,
//! Int, Float, String) compare by value; compound values (Array, Object)
//! are reference-counted and compare by identity, as do nested GetSet
//! handles.

use std::fmt;
use std::rc::Rc;

use crate::options::IdentityPolicy;
use crate::GetSet;

/// Ordered field list backing `Value::Object` (a partial mapping).
pub type Fields = Vec<(String, Value)>;

/// Runtime category of a value, matched against type patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    Null,
    Boolean,
    Number,
    String,
    Array,
    Object,
    GetSet,
    DefaultValue,
}

impl TypeTag {
    /// The tag string a type pattern is matched against.
    pub fn as_str(self) -> &'static str {
        match self {
            TypeTag::Null => "Null",
            TypeTag::Boolean => "Boolean",
            TypeTag::Number => "Number",
            TypeTag::String => "String",
            TypeTag::Array => "Array",
            TypeTag::Object => "Object",
            TypeTag::GetSet => "GetSet",
            TypeTag::DefaultValue => "DefaultValue",
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A value that can be stored in a property.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
    /// Null/missing value.
    #[default]
    Null,
    /// Boolean value.
    Bool(bool),
    /// 64-bit signed integer.
    Int(i64),
    /// 64-bit floating point.
    Float(f64),
    /// UTF-8 string.
    String(String),
    /// Shared list of values.
    Array(Rc<[Value]>),
    /// Shared ordered mapping. Used as a partial update for nested containers.
    Object(Rc<Fields>),
    /// Handle to a nested container.
    GetSet(GetSet),
    /// Marker that resets a property to its declared default. Never stored.
    DefaultValue,
}

impl Value {
    /// Returns true if this is a null value.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns true if this is the default-value marker.
    pub fn is_default_marker(&self) -> bool {
        matches!(self, Value::DefaultValue)
    }

    /// Get as boolean if this is a Bool value.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get as integer if this is an Int value.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Get as float. Integers are widened.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Get as string reference if this is a String value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get the items if this is an Array value.
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Get the fields if this is an Object value.
    pub fn as_object(&self) -> Option<&Fields> {
        match self {
            Value::Object(fields) => Some(fields),
            _ => None,
        }
    }

    /// Get the nested container handle if this is a GetSet value.
    pub fn as_getset(&self) -> Option<&GetSet> {
        match self {
            Value::GetSet(gs) => Some(gs),
            _ => None,
        }
    }

    /// Returns true if this value is, or holds at any depth, a container handle.
    pub fn contains_container(&self) -> bool {
        match self {
            Value::GetSet(_) => true,
            Value::Array(items) => items.iter().any(Value::contains_container),
            Value::Object(fields) => fields.iter().any(|(_, value)| value.contains_container()),
            _ => false,
        }
    }

    /// Look up a field of an Object value.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.as_object()?
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    /// Returns the runtime category of this value.
    pub fn type_tag(&self) -> TypeTag {
        match self {
            Value::Null => TypeTag::Null,
            Value::Bool(_) => TypeTag::Boolean,
            Value::Int(_) | Value::Float(_) => TypeTag::Number,
            Value::String(_) => TypeTag::String,
            Value::Array(_) => TypeTag::Array,
            Value::Object(_) => TypeTag::Object,
            Value::GetSet(_) => TypeTag::GetSet,
            Value::DefaultValue => TypeTag::DefaultValue,
        }
    }

    /// Identity comparison used to suppress redundant change notifications.
    ///
    /// Unlike `==`, arrays and objects are identical only when they share
    /// the same allocation.
    pub fn is_identical(&self, other: &Value, policy: IdentityPolicy) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::DefaultValue, Value::DefaultValue) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => match policy {
                IdentityPolicy::SameValue => {
                    (a.is_nan() && b.is_nan()) || a.to_bits() == b.to_bits()
                }
                IdentityPolicy::Strict => a == b,
            },
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b),
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            (Value::GetSet(a), Value::GetSet(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

/// String form of a value, as tested by value patterns.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(fl) => write_float(f, *fl),
            Value::String(s) => f.write_str(s),
            Value::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Object(fields) => write_fields(f, fields),
            Value::GetSet(gs) => write_fields(f, &gs.snapshot()),
            Value::DefaultValue => write!(f, "<default>"),
        }
    }
}

/// Shortest round-trip form, with exponents outside `[1e-6, 1e21)`.
fn write_float(f: &mut fmt::Formatter<'_>, fl: f64) -> fmt::Result {
    if fl == 0.0 {
        return f.write_str("0");
    }
    if fl.is_nan() {
        return f.write_str("NaN");
    }
    if fl.is_infinite() {
        return f.write_str(if fl > 0.0 { "Infinity" } else { "-Infinity" });
    }
    let magnitude = fl.abs();
    if (1e-6..1e21).contains(&magnitude) {
        return write!(f, "{}", fl);
    }
    let exponential = format!("{:e}", fl);
    match exponential.split_once('e') {
        Some((mantissa, exp)) if !exp.starts_with('-') => write!(f, "{}e+{}", mantissa, exp),
        _ => f.write_str(&exponential),
    }
}

fn write_fields(f: &mut fmt::Formatter<'_>, fields: &Fields) -> fmt::Result {
    write!(f, "{{")?;
    for (i, (key, value)) in fields.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}: {}", key, value)?;
    }
    write!(f, "}}")
}

// Convenient From implementations
impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i as i64)
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Value::Int(i as i64)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(Rc::from(items))
    }
}

impl From<Fields> for Value {
    fn from(fields: Fields) -> Self {
        Value::Object(Rc::new(fields))
    }
}

impl From<GetSet> for Value {
    fn from(gs: GetSet) -> Self {
        Value::GetSet(gs)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

/// Helper macro to create `Value::Object` literals.
#[macro_export]
macro_rules! fields {
    () => {
        $crate::Value::Object(::std::rc::Rc::new(::std::vec::Vec::new()))
    };
    ($($key:expr => $value:expr),+ $(,)?) => {
        $crate::Value::Object(::std::rc::Rc::new(vec![
            $(($key.to_string(), $crate::Value::from($value))),+
        ]))
    };
}

//! Dynamic name/kind/value triple
//!
//! A dynamic field carries a caller-chosen name and one of a small set of
//! value kinds, for data whose shape is not known at schema-definition
//! time. Its wire shape (`{"name": ..., "<kind>_val": ...}`) is owned by
//! the codec.

use crate::value::Value;
use crate::{Error, Result};
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

/// Grammar for dynamic field names.
static NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_-]*$").expect("valid name regex"));

/// The value kinds a dynamic field can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DynamicFieldKind {
    BoolVal,
    DateVal,
    FloatVal,
    IntVal,
    StringVal,
    TextVal,
}

impl DynamicFieldKind {
    /// The wire key for this kind.
    pub fn wire_key(&self) -> &'static str {
        match self {
            Self::BoolVal => "bool_val",
            Self::DateVal => "date_val",
            Self::FloatVal => "float_val",
            Self::IntVal => "int_val",
            Self::StringVal => "string_val",
            Self::TextVal => "text_val",
        }
    }

    /// Look up a kind by its wire key.
    pub fn from_wire_key(key: &str) -> Option<Self> {
        match key {
            "bool_val" => Some(Self::BoolVal),
            "date_val" => Some(Self::DateVal),
            "float_val" => Some(Self::FloatVal),
            "int_val" => Some(Self::IntVal),
            "string_val" => Some(Self::StringVal),
            "text_val" => Some(Self::TextVal),
            _ => None,
        }
    }

    fn accepts(&self, value: &Value) -> bool {
        match self {
            Self::BoolVal => matches!(value, Value::Bool(_)),
            Self::DateVal => matches!(value, Value::Date(_)),
            Self::FloatVal => matches!(value, Value::Float(_)),
            Self::IntVal => matches!(value, Value::Int(_) | Value::UInt(_)),
            Self::StringVal | Self::TextVal => matches!(value, Value::String(_)),
        }
    }
}

impl fmt::Display for DynamicFieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_key())
    }
}

/// A named, loosely-typed value. The value is boxed because `Value` can
/// itself hold a `DynamicField`.
#[derive(Debug, Clone, PartialEq)]
pub struct DynamicField {
    name: String,
    kind: DynamicFieldKind,
    value: Box<Value>,
}

impl DynamicField {
    /// Create a dynamic field, validating the name grammar and that the
    /// value matches the kind.
    pub fn new(name: impl Into<String>, kind: DynamicFieldKind, value: Value) -> Result<Self> {
        let name = name.into();
        if !NAME_PATTERN.is_match(&name) {
            return Err(Error::assertion(
                "dynamic_field",
                format!("invalid dynamic field name '{name}'"),
            ));
        }
        if !kind.accepts(&value) {
            return Err(Error::assertion(
                &name,
                format!("{} does not accept a {} value", kind, value.type_label()),
            ));
        }
        Ok(Self {
            name,
            kind,
            value: Box::new(value),
        })
    }

    /// Field name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Value kind.
    pub fn kind(&self) -> DynamicFieldKind {
        self.kind
    }

    /// The carried value.
    pub fn value(&self) -> &Value {
        &self.value
    }
}

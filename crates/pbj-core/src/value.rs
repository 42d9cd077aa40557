//! Runtime value union
//!
//! Every field value a [`Message`](crate::Message) can hold. Scalar kinds
//! map to native Rust scalars; object-valued kinds (dates, uuids, geo
//! points, refs, nested messages) carry their own types.

use crate::dynamic_field::DynamicField;
use crate::geo_point::GeoPoint;
use crate::message::Message;
use crate::message_ref::MessageRef;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

/// A single in-memory field value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Boolean value
    Bool(bool),

    /// Signed integer value (all signed widths, timestamps, enums)
    Int(i64),

    /// Unsigned 64-bit value (big-int, microtime)
    UInt(u64),

    /// Floating point value (float, decimal)
    Float(f64),

    /// String value (string/text kinds, enums, identifiers)
    String(String),

    /// Raw bytes (binary/blob kinds)
    Binary(Vec<u8>),

    /// Calendar date without time zone
    Date(NaiveDate),

    /// UTC instant with microsecond precision
    DateTime(DateTime<Utc>),

    /// RFC 4122 identifier
    Uuid(Uuid),

    /// Latitude/longitude pair
    GeoPoint(GeoPoint),

    /// Reference to another message
    MessageRef(MessageRef),

    /// Loosely-typed name/value extension
    DynamicField(DynamicField),

    /// Nested message
    Message(Message),
}

impl Value {
    /// Human-readable label for error messages.
    pub fn type_label(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::UInt(_) => "uint",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Binary(_) => "binary",
            Value::Date(_) => "date",
            Value::DateTime(_) => "date-time",
            Value::Uuid(_) => "uuid",
            Value::GeoPoint(_) => "geo-point",
            Value::MessageRef(_) => "message-ref",
            Value::DynamicField(_) => "dynamic-field",
            Value::Message(_) => "message",
        }
    }

    /// Borrow as bool.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Borrow as a signed integer; unsigned values convert when they fit.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::UInt(u) => i64::try_from(*u).ok(),
            _ => None,
        }
    }

    /// Borrow as an unsigned integer; signed values convert when non-negative.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::UInt(u) => Some(*u),
            Value::Int(i) => u64::try_from(*i).ok(),
            _ => None,
        }
    }

    /// Borrow as a float; integer values widen.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            Value::UInt(u) => Some(*u as f64),
            _ => None,
        }
    }

    /// Borrow as a string slice.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Borrow as raw bytes.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Binary(b) => Some(b),
            _ => None,
        }
    }

    /// Borrow as a date.
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Value::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// Borrow as a UTC instant.
    pub fn as_date_time(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::DateTime(dt) => Some(*dt),
            _ => None,
        }
    }

    /// Borrow as a uuid.
    pub fn as_uuid(&self) -> Option<Uuid> {
        match self {
            Value::Uuid(u) => Some(*u),
            _ => None,
        }
    }

    /// Borrow as a geo point.
    pub fn as_geo_point(&self) -> Option<&GeoPoint> {
        match self {
            Value::GeoPoint(g) => Some(g),
            _ => None,
        }
    }

    /// Borrow as a message ref.
    pub fn as_message_ref(&self) -> Option<&MessageRef> {
        match self {
            Value::MessageRef(r) => Some(r),
            _ => None,
        }
    }

    /// Borrow as a dynamic field.
    pub fn as_dynamic_field(&self) -> Option<&DynamicField> {
        match self {
            Value::DynamicField(d) => Some(d),
            _ => None,
        }
    }

    /// Borrow as a nested message.
    pub fn as_message(&self) -> Option<&Message> {
        match self {
            Value::Message(m) => Some(m),
            _ => None,
        }
    }

    /// Mutable borrow as a nested message.
    pub fn as_message_mut(&mut self) -> Option<&mut Message> {
        match self {
            Value::Message(m) => Some(m),
            _ => None,
        }
    }

    /// Canonical string used as the dedup key for set cardinality:
    /// the value's string form, trimmed and lowercased. Only kinds with an
    /// unambiguous string form are allowed in sets, so this is total for
    /// set-eligible values.
    pub fn set_key(&self) -> Option<String> {
        let raw = match self {
            Value::String(s) => s.clone(),
            Value::Int(i) => i.to_string(),
            Value::UInt(u) => u.to_string(),
            Value::Uuid(u) => u.to_string(),
            Value::Binary(b) => BASE64.encode(b),
            Value::MessageRef(r) => r.to_string(),
            _ => return None,
        };
        Some(raw.trim().to_lowercase())
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v.into())
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::UInt(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::Date(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::DateTime(v)
    }
}

impl From<Uuid> for Value {
    fn from(v: Uuid) -> Self {
        Value::Uuid(v)
    }
}

impl From<GeoPoint> for Value {
    fn from(v: GeoPoint) -> Self {
        Value::GeoPoint(v)
    }
}

impl From<MessageRef> for Value {
    fn from(v: MessageRef) -> Self {
        Value::MessageRef(v)
    }
}

impl From<DynamicField> for Value {
    fn from(v: DynamicField) -> Self {
        Value::DynamicField(v)
    }
}

impl From<Message> for Value {
    fn from(v: Message) -> Self {
        Value::Message(v)
    }
}

//! Closed enumeration of type kinds
//!
//! Every field type the runtime supports is a variant here, and every
//! classification query is an exhaustive match, so adding a kind forces
//! every site that cares to be revisited at compile time.

use crate::value::Value;
use chrono::Utc;
use std::fmt;

/// The closed set of type kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeName {
    BigInt,
    Binary,
    Blob,
    Boolean,
    Date,
    DateTime,
    Decimal,
    DynamicField,
    Float,
    GeoPoint,
    Identifier,
    Int,
    IntEnum,
    MediumBlob,
    MediumInt,
    MediumText,
    Message,
    MessageRef,
    Microtime,
    SignedBigInt,
    SignedInt,
    SignedMediumInt,
    SignedSmallInt,
    SignedTinyInt,
    SmallInt,
    String,
    StringEnum,
    Text,
    TimeUuid,
    Timestamp,
    TinyInt,
    Trinary,
    Uuid,
}

impl TypeName {
    /// Every kind, in canonical (tag) order.
    pub fn all() -> &'static [TypeName] {
        use TypeName::*;
        &[
            BigInt, Binary, Blob, Boolean, Date, DateTime, Decimal, DynamicField, Float, GeoPoint,
            Identifier, Int, IntEnum, MediumBlob, MediumInt, MediumText, Message, MessageRef,
            Microtime, SignedBigInt, SignedInt, SignedMediumInt, SignedSmallInt, SignedTinyInt,
            SmallInt, String, StringEnum, Text, TimeUuid, Timestamp, TinyInt, Trinary, Uuid,
        ]
    }

    /// The canonical string tag for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BigInt => "big-int",
            Self::Binary => "binary",
            Self::Blob => "blob",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::DateTime => "date-time",
            Self::Decimal => "decimal",
            Self::DynamicField => "dynamic-field",
            Self::Float => "float",
            Self::GeoPoint => "geo-point",
            Self::Identifier => "identifier",
            Self::Int => "int",
            Self::IntEnum => "int-enum",
            Self::MediumBlob => "medium-blob",
            Self::MediumInt => "medium-int",
            Self::MediumText => "medium-text",
            Self::Message => "message",
            Self::MessageRef => "message-ref",
            Self::Microtime => "microtime",
            Self::SignedBigInt => "signed-big-int",
            Self::SignedInt => "signed-int",
            Self::SignedMediumInt => "signed-medium-int",
            Self::SignedSmallInt => "signed-small-int",
            Self::SignedTinyInt => "signed-tiny-int",
            Self::SmallInt => "small-int",
            Self::String => "string",
            Self::StringEnum => "string-enum",
            Self::Text => "text",
            Self::TimeUuid => "time-uuid",
            Self::Timestamp => "timestamp",
            Self::TinyInt => "tiny-int",
            Self::Trinary => "trinary",
            Self::Uuid => "uuid",
        }
    }

    /// Look up a kind by its canonical tag.
    pub fn find(tag: &str) -> Option<Self> {
        Self::all().iter().copied().find(|t| t.as_str() == tag)
    }

    /// Whether runtime values of this kind are native scalars (as opposed
    /// to object-valued: dates, uuids, refs, nested messages).
    pub fn is_scalar(&self) -> bool {
        !matches!(
            self,
            Self::Date
                | Self::DateTime
                | Self::Uuid
                | Self::TimeUuid
                | Self::GeoPoint
                | Self::DynamicField
                | Self::Message
                | Self::MessageRef
        )
    }

    /// Whether the wire form is a bare scalar. False exactly for the four
    /// codec-delegated kinds, whose wire shape is multi-field.
    pub fn encodes_to_scalar(&self) -> bool {
        !matches!(
            self,
            Self::Message | Self::MessageRef | Self::GeoPoint | Self::DynamicField
        )
    }

    /// Whether values are strings at runtime.
    pub fn is_string(&self) -> bool {
        matches!(
            self,
            Self::String
                | Self::Text
                | Self::MediumText
                | Self::StringEnum
                | Self::Identifier
                | Self::Uuid
                | Self::TimeUuid
        )
    }

    /// Whether values are numeric at runtime.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Self::BigInt
                | Self::Decimal
                | Self::Float
                | Self::Int
                | Self::IntEnum
                | Self::MediumInt
                | Self::Microtime
                | Self::SignedBigInt
                | Self::SignedInt
                | Self::SignedMediumInt
                | Self::SignedSmallInt
                | Self::SignedTinyInt
                | Self::SmallInt
                | Self::Timestamp
                | Self::TinyInt
                | Self::Trinary
        )
    }

    /// Whether values are booleans at runtime.
    pub fn is_boolean(&self) -> bool {
        matches!(self, Self::Boolean)
    }

    /// Whether values are raw bytes at runtime.
    pub fn is_binary(&self) -> bool {
        matches!(self, Self::Binary | Self::Blob | Self::MediumBlob)
    }

    /// Whether values are nested messages.
    pub fn is_message(&self) -> bool {
        matches!(self, Self::Message)
    }

    /// Whether this kind may be used with set cardinality. Kinds whose
    /// equality is structural or ambiguous (floats, composites, booleans,
    /// dates, unbounded text) are excluded; sets dedup by canonical string
    /// key, which those kinds do not have.
    pub fn allowed_in_set(&self) -> bool {
        !matches!(
            self,
            Self::Message
                | Self::GeoPoint
                | Self::DynamicField
                | Self::Boolean
                | Self::Trinary
                | Self::Date
                | Self::DateTime
                | Self::Float
                | Self::Decimal
                | Self::Text
                | Self::MediumText
                | Self::Blob
                | Self::MediumBlob
        )
    }

    /// Inclusive integer bounds enforced by guard, for bounded integer
    /// kinds representable in i64. `big-int` and `microtime` are u64-wide
    /// and validated separately.
    pub fn int_bounds(&self) -> Option<(i64, i64)> {
        match self {
            Self::TinyInt => Some((0, 255)),
            Self::SmallInt => Some((0, 65_535)),
            Self::MediumInt => Some((0, 16_777_215)),
            Self::Int => Some((0, 4_294_967_295)),
            Self::SignedTinyInt => Some((-128, 127)),
            Self::SignedSmallInt => Some((-32_768, 32_767)),
            Self::SignedMediumInt => Some((-8_388_608, 8_388_607)),
            Self::SignedInt => Some((i64::from(i32::MIN), i64::from(i32::MAX))),
            Self::SignedBigInt => Some((i64::MIN, i64::MAX)),
            Self::IntEnum => Some((0, 65_535)),
            Self::Timestamp => Some((0, i64::MAX)),
            Self::Trinary => Some((0, 2)),
            _ => None,
        }
    }

    /// Maximum byte length enforced by guard for string and binary kinds.
    pub fn max_bytes(&self) -> Option<usize> {
        match self {
            Self::String | Self::Binary => Some(255),
            Self::Text | Self::Blob => Some(65_535),
            Self::MediumText | Self::MediumBlob => Some(16_777_215),
            Self::StringEnum => Some(100),
            Self::Identifier => Some(255),
            _ => None,
        }
    }

    /// The type-level default used when a single-value field has no
    /// explicit default and `use_type_default` is on. Timestamp and
    /// microtime default to the current instant; kinds with no sensible
    /// zero default to unset.
    pub fn default_value(&self) -> Option<Value> {
        match self {
            Self::Boolean => Some(Value::Bool(false)),
            Self::Trinary => Some(Value::Int(0)),
            Self::Float | Self::Decimal => Some(Value::Float(0.0)),
            Self::TinyInt
            | Self::SmallInt
            | Self::MediumInt
            | Self::Int
            | Self::IntEnum
            | Self::SignedTinyInt
            | Self::SignedSmallInt
            | Self::SignedMediumInt
            | Self::SignedInt
            | Self::SignedBigInt => Some(Value::Int(0)),
            Self::BigInt => Some(Value::UInt(0)),
            Self::Timestamp => Some(Value::Int(Utc::now().timestamp())),
            Self::Microtime => Some(Value::UInt(
                u64::try_from(Utc::now().timestamp_micros()).unwrap_or(0),
            )),
            _ => None,
        }
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_round_trip() {
        for kind in TypeName::all() {
            assert_eq!(TypeName::find(kind.as_str()), Some(*kind));
        }
        assert_eq!(TypeName::find("nope"), None);
    }

    #[test]
    fn test_kind_count() {
        assert_eq!(TypeName::all().len(), 33);
    }

    #[test]
    fn test_codec_delegated_kinds() {
        for kind in TypeName::all() {
            let delegated = matches!(
                kind,
                TypeName::Message
                    | TypeName::MessageRef
                    | TypeName::GeoPoint
                    | TypeName::DynamicField
            );
            assert_eq!(kind.encodes_to_scalar(), !delegated, "{kind}");
        }
    }

    #[test]
    fn test_classification_families_disjoint() {
        for kind in TypeName::all() {
            let families = [
                kind.is_string(),
                kind.is_numeric(),
                kind.is_boolean(),
                kind.is_binary(),
                kind.is_message(),
            ];
            assert!(
                families.iter().filter(|f| **f).count() <= 1,
                "{kind} is in multiple families"
            );
        }
    }

    #[test]
    fn test_int_bounds() {
        assert_eq!(TypeName::TinyInt.int_bounds(), Some((0, 255)));
        assert_eq!(
            TypeName::SignedMediumInt.int_bounds(),
            Some((-8_388_608, 8_388_607))
        );
        assert_eq!(TypeName::String.int_bounds(), None);
    }

    #[test]
    fn test_set_exclusions() {
        assert!(!TypeName::GeoPoint.allowed_in_set());
        assert!(!TypeName::Boolean.allowed_in_set());
        assert!(!TypeName::Text.allowed_in_set());
        assert!(!TypeName::Float.allowed_in_set());
        assert!(TypeName::String.allowed_in_set());
        assert!(TypeName::MessageRef.allowed_in_set());
        assert!(TypeName::Uuid.allowed_in_set());
    }

    #[test]
    fn test_defaults() {
        assert_eq!(TypeName::Boolean.default_value(), Some(Value::Bool(false)));
        assert_eq!(TypeName::Int.default_value(), Some(Value::Int(0)));
        assert_eq!(TypeName::String.default_value(), None);
        assert!(TypeName::Timestamp.default_value().unwrap().as_i64().unwrap() > 0);
    }
}

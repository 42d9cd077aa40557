//! Guard/encode/decode contract per type kind
//!
//! Exhaustive matches over [`TypeName`] implement the three-part contract:
//! `guard` enforces structural constraints plus the owning field's bounds,
//! `encode` produces the bare-scalar wire form, and `decode` is its
//! inverse. The four codec-delegated kinds (`message`, `message-ref`,
//! `geo-point`, `dynamic-field`) have no scalar wire form; the serializer
//! routes them to the active codec and never calls these for them.

use crate::field::Field;
use crate::type_name::TypeName;
use crate::value::Value;
use crate::{Error, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde_json::Value as Wire;
use serde_json::json;
use uuid::Uuid;

/// Microtime values are 16-digit microsecond counts.
const MICROTIME_MIN: u64 = 1_000_000_000_000_000;
const MICROTIME_MAX: u64 = 9_999_999_999_999_999;

/// Throws when `value` violates the type's structural constraints or the
/// owning field's bounds, pattern, format, or membership rules.
pub fn guard(value: &Value, field: &Field) -> Result<()> {
    let name = field.name();
    match field.type_name() {
        TypeName::TinyInt
        | TypeName::SmallInt
        | TypeName::MediumInt
        | TypeName::Int
        | TypeName::SignedTinyInt
        | TypeName::SignedSmallInt
        | TypeName::SignedMediumInt
        | TypeName::SignedInt
        | TypeName::SignedBigInt
        | TypeName::Timestamp
        | TypeName::Trinary => guard_bounded_int(value, field),

        TypeName::IntEnum => {
            guard_bounded_int(value, field)?;
            guard_membership(value, field)
        }

        TypeName::BigInt => {
            let v = value.as_u64().ok_or_else(|| {
                Error::assertion(name, format!("expected uint, got {}", value.type_label()))
            })?;
            if let Some(min) = field.min() {
                if min >= 0 && v < min as u64 {
                    return Err(Error::assertion(name, format!("{v} is below min {min}")));
                }
            }
            if let Some(max) = field.max() {
                if max < 0 || v > max as u64 {
                    return Err(Error::assertion(name, format!("{v} is above max {max}")));
                }
            }
            Ok(())
        }

        TypeName::Microtime => {
            let v = value.as_u64().ok_or_else(|| {
                Error::assertion(name, format!("expected uint, got {}", value.type_label()))
            })?;
            if !(MICROTIME_MIN..=MICROTIME_MAX).contains(&v) {
                return Err(Error::assertion(
                    name,
                    format!("{v} is not a 16-digit microsecond timestamp"),
                ));
            }
            Ok(())
        }

        TypeName::Float | TypeName::Decimal => {
            let v = match value {
                Value::Float(f) => *f,
                other => {
                    return Err(Error::assertion(
                        name,
                        format!("expected float, got {}", other.type_label()),
                    ));
                }
            };
            if !v.is_finite() {
                return Err(Error::assertion(name, "value must be finite"));
            }
            if let Some(min) = field.min() {
                if v < min as f64 {
                    return Err(Error::assertion(name, format!("{v} is below min {min}")));
                }
            }
            if let Some(max) = field.max() {
                if v > max as f64 {
                    return Err(Error::assertion(name, format!("{v} is above max {max}")));
                }
            }
            Ok(())
        }

        TypeName::Boolean => match value {
            Value::Bool(_) => Ok(()),
            other => Err(Error::assertion(
                name,
                format!("expected bool, got {}", other.type_label()),
            )),
        },

        TypeName::String | TypeName::Text | TypeName::MediumText | TypeName::Identifier => {
            guard_string(value, field)
        }

        TypeName::StringEnum => {
            guard_string(value, field)?;
            guard_membership(value, field)
        }

        TypeName::Binary | TypeName::Blob | TypeName::MediumBlob => {
            let bytes = value.as_bytes().ok_or_else(|| {
                Error::assertion(name, format!("expected binary, got {}", value.type_label()))
            })?;
            guard_length(bytes.len(), field)
        }

        TypeName::Date => match value {
            Value::Date(_) => Ok(()),
            other => Err(Error::assertion(
                name,
                format!("expected date, got {}", other.type_label()),
            )),
        },

        TypeName::DateTime => match value {
            Value::DateTime(_) => Ok(()),
            other => Err(Error::assertion(
                name,
                format!("expected date-time, got {}", other.type_label()),
            )),
        },

        TypeName::Uuid => match value {
            Value::Uuid(_) => Ok(()),
            other => Err(Error::assertion(
                name,
                format!("expected uuid, got {}", other.type_label()),
            )),
        },

        TypeName::TimeUuid => match value {
            Value::Uuid(u) if u.get_version_num() == 1 => Ok(()),
            Value::Uuid(u) => Err(Error::assertion(
                name,
                format!("uuid {u} is not time-based (version 1)"),
            )),
            other => Err(Error::assertion(
                name,
                format!("expected uuid, got {}", other.type_label()),
            )),
        },

        TypeName::GeoPoint => match value {
            Value::GeoPoint(_) => Ok(()),
            other => Err(Error::assertion(
                name,
                format!("expected geo-point, got {}", other.type_label()),
            )),
        },

        TypeName::DynamicField => match value {
            Value::DynamicField(_) => Ok(()),
            other => Err(Error::assertion(
                name,
                format!("expected dynamic-field, got {}", other.type_label()),
            )),
        },

        TypeName::MessageRef => {
            let r = value.as_message_ref().ok_or_else(|| {
                Error::assertion(
                    name,
                    format!("expected message-ref, got {}", value.type_label()),
                )
            })?;
            if !field.payload_curies().is_empty()
                && !field.payload_curies().iter().any(|c| c == r.curie())
            {
                return Err(Error::assertion(
                    name,
                    format!("ref curie '{}' is not an accepted payload", r.curie()),
                ));
            }
            Ok(())
        }

        TypeName::Message => {
            let m = value.as_message().ok_or_else(|| {
                Error::assertion(
                    name,
                    format!("expected message, got {}", value.type_label()),
                )
            })?;
            if field.payload_curies().is_empty() {
                return Ok(());
            }
            let schema = m.schema();
            let accepted = field.payload_curies().iter().any(|c| {
                schema.curie() == c || schema.has_mixin(&c.to_string())
            });
            if !accepted {
                return Err(Error::assertion(
                    name,
                    format!(
                        "message '{}' is not an accepted payload",
                        schema.curie_major()
                    ),
                ));
            }
            Ok(())
        }
    }
}

fn guard_bounded_int(value: &Value, field: &Field) -> Result<()> {
    let name = field.name();
    let v = value.as_i64().ok_or_else(|| {
        Error::assertion(name, format!("expected int, got {}", value.type_label()))
    })?;

    let (type_min, type_max) = field
        .type_name()
        .int_bounds()
        .unwrap_or((i64::MIN, i64::MAX));
    let min = field.min().map_or(type_min, |m| m.max(type_min));
    let max = field.max().map_or(type_max, |m| m.min(type_max));

    if v < min {
        return Err(Error::assertion(name, format!("{v} is below min {min}")));
    }
    if v > max {
        return Err(Error::assertion(name, format!("{v} is above max {max}")));
    }
    Ok(())
}

fn guard_string(value: &Value, field: &Field) -> Result<()> {
    let name = field.name();
    let s = value.as_str().ok_or_else(|| {
        Error::assertion(name, format!("expected string, got {}", value.type_label()))
    })?;

    guard_length(s.len(), field)?;

    if let Some(pattern) = field.pattern() {
        if !pattern.is_match(s) {
            return Err(Error::assertion(
                name,
                format!("'{s}' does not match pattern '{pattern}'"),
            ));
        }
    }

    if let Some(format) = field.format() {
        format.guard(s, name)?;
    }

    Ok(())
}

fn guard_length(len: usize, field: &Field) -> Result<()> {
    let name = field.name();
    if len < field.min_length() {
        return Err(Error::assertion(
            name,
            format!("length {len} is below min length {}", field.min_length()),
        ));
    }
    if let Some(max) = field.max_length() {
        if len > max {
            return Err(Error::assertion(
                name,
                format!("length {len} exceeds max length {max}"),
            ));
        }
    }
    Ok(())
}

fn guard_membership(value: &Value, field: &Field) -> Result<()> {
    if field.allowed_values().is_empty() || field.allowed_values().contains(value) {
        Ok(())
    } else {
        Err(Error::assertion(
            field.name(),
            "value is not in the allowed enum set",
        ))
    }
}

/// Convert an in-memory value to its bare-scalar wire form. 64-bit-wide
/// integers and microtimes serialize as strings so they survive
/// double-precision JSON consumers.
pub fn encode(value: &Value, field: &Field) -> Result<Wire> {
    let name = field.name();
    match field.type_name() {
        TypeName::TinyInt
        | TypeName::SmallInt
        | TypeName::MediumInt
        | TypeName::Int
        | TypeName::SignedTinyInt
        | TypeName::SignedSmallInt
        | TypeName::SignedMediumInt
        | TypeName::SignedInt
        | TypeName::IntEnum
        | TypeName::Timestamp
        | TypeName::Trinary => value
            .as_i64()
            .map(|v| json!(v))
            .ok_or_else(|| Error::assertion(name, "expected int")),

        TypeName::BigInt | TypeName::Microtime => value
            .as_u64()
            .map(|v| json!(v.to_string()))
            .ok_or_else(|| Error::assertion(name, "expected uint")),

        TypeName::SignedBigInt => value
            .as_i64()
            .map(|v| json!(v.to_string()))
            .ok_or_else(|| Error::assertion(name, "expected int")),

        TypeName::Float => {
            let v = value
                .as_f64()
                .ok_or_else(|| Error::assertion(name, "expected float"))?;
            Ok(json!(v))
        }

        TypeName::Decimal => {
            let v = value
                .as_f64()
                .ok_or_else(|| Error::assertion(name, "expected float"))?;
            let factor = 10f64.powi(i32::from(field.scale()));
            Ok(json!((v * factor).round() / factor))
        }

        TypeName::Boolean => value
            .as_bool()
            .map(|v| json!(v))
            .ok_or_else(|| Error::assertion(name, "expected bool")),

        TypeName::String
        | TypeName::Text
        | TypeName::MediumText
        | TypeName::StringEnum
        | TypeName::Identifier => value
            .as_str()
            .map(|s| json!(s))
            .ok_or_else(|| Error::assertion(name, "expected string")),

        TypeName::Binary | TypeName::Blob | TypeName::MediumBlob => value
            .as_bytes()
            .map(|b| json!(BASE64.encode(b)))
            .ok_or_else(|| Error::assertion(name, "expected binary")),

        TypeName::Date => value
            .as_date()
            .map(|d| json!(d.format("%Y-%m-%d").to_string()))
            .ok_or_else(|| Error::assertion(name, "expected date")),

        TypeName::DateTime => value
            .as_date_time()
            .map(|dt| json!(dt.to_rfc3339_opts(SecondsFormat::Micros, true)))
            .ok_or_else(|| Error::assertion(name, "expected date-time")),

        TypeName::Uuid | TypeName::TimeUuid => value
            .as_uuid()
            .map(|u| json!(u.to_string()))
            .ok_or_else(|| Error::assertion(name, "expected uuid")),

        TypeName::Message
        | TypeName::MessageRef
        | TypeName::GeoPoint
        | TypeName::DynamicField => Err(Error::assertion(
            name,
            format!("{} encoding is delegated to the codec", field.type_name()),
        )),
    }
}

/// Convert a bare-scalar wire value back to its in-memory form. Throws
/// `DecodeValueFailed` on malformed input.
pub fn decode(wire: &Wire, field: &Field) -> Result<Value> {
    let kind = field.type_name();
    match kind {
        TypeName::TinyInt
        | TypeName::SmallInt
        | TypeName::MediumInt
        | TypeName::Int
        | TypeName::SignedTinyInt
        | TypeName::SignedSmallInt
        | TypeName::SignedMediumInt
        | TypeName::SignedInt
        | TypeName::IntEnum
        | TypeName::Timestamp
        | TypeName::Trinary => wire
            .as_i64()
            .map(Value::Int)
            .ok_or_else(|| Error::decode(kind, format!("expected integer, got {wire}"))),

        TypeName::SignedBigInt => match wire {
            Wire::Number(n) => n
                .as_i64()
                .map(Value::Int)
                .ok_or_else(|| Error::decode(kind, format!("{n} is out of i64 range"))),
            Wire::String(s) => s
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|e| Error::decode(kind, format!("'{s}': {e}"))),
            other => Err(Error::decode(kind, format!("expected int, got {other}"))),
        },

        TypeName::BigInt | TypeName::Microtime => match wire {
            Wire::Number(n) => n
                .as_u64()
                .map(Value::UInt)
                .ok_or_else(|| Error::decode(kind, format!("{n} is out of u64 range"))),
            Wire::String(s) => s
                .parse::<u64>()
                .map(Value::UInt)
                .map_err(|e| Error::decode(kind, format!("'{s}': {e}"))),
            other => Err(Error::decode(kind, format!("expected uint, got {other}"))),
        },

        TypeName::Float | TypeName::Decimal => wire
            .as_f64()
            .map(Value::Float)
            .ok_or_else(|| Error::decode(kind, format!("expected number, got {wire}"))),

        TypeName::Boolean => wire
            .as_bool()
            .map(Value::Bool)
            .ok_or_else(|| Error::decode(kind, format!("expected bool, got {wire}"))),

        TypeName::String
        | TypeName::Text
        | TypeName::MediumText
        | TypeName::StringEnum
        | TypeName::Identifier => wire
            .as_str()
            .map(|s| Value::String(s.to_string()))
            .ok_or_else(|| Error::decode(kind, format!("expected string, got {wire}"))),

        TypeName::Binary | TypeName::Blob | TypeName::MediumBlob => {
            let s = wire
                .as_str()
                .ok_or_else(|| Error::decode(kind, format!("expected string, got {wire}")))?;
            BASE64
                .decode(s)
                .map(Value::Binary)
                .map_err(|e| Error::decode(kind, format!("invalid base64: {e}")))
        }

        TypeName::Date => {
            let s = wire
                .as_str()
                .ok_or_else(|| Error::decode(kind, format!("expected string, got {wire}")))?;
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .map(Value::Date)
                .map_err(|e| Error::decode(kind, format!("'{s}': {e}")))
        }

        TypeName::DateTime => {
            let s = wire
                .as_str()
                .ok_or_else(|| Error::decode(kind, format!("expected string, got {wire}")))?;
            DateTime::parse_from_rfc3339(s)
                .map(|dt| Value::DateTime(dt.with_timezone(&Utc)))
                .map_err(|e| Error::decode(kind, format!("'{s}': {e}")))
        }

        TypeName::Uuid | TypeName::TimeUuid => {
            let s = wire
                .as_str()
                .ok_or_else(|| Error::decode(kind, format!("expected string, got {wire}")))?;
            Uuid::parse_str(s)
                .map(Value::Uuid)
                .map_err(|e| Error::decode(kind, format!("'{s}': {e}")))
        }

        TypeName::Message
        | TypeName::MessageRef
        | TypeName::GeoPoint
        | TypeName::DynamicField => Err(Error::decode(
            kind,
            format!("{kind} decoding is delegated to the codec"),
        )),
    }
}

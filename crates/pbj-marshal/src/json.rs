//! JSON codec
//!
//! Wire shapes for the object-valued kinds: nested messages recurse
//! through the generic tree walk, refs are `{"curie","id","tag"}`
//! envelopes, geo points use GeoJSON, and dynamic fields pair the name
//! with a single `<kind>_val` entry.

use crate::codec::Codec;
use crate::serializer::{SerializeOptions, decode_tree, encode_tree};
use crate::{Error, Result};
use chrono::NaiveDate;
use pbj_core::dynamic_field::DynamicFieldKind;
use pbj_core::{DynamicField, Field, GeoPoint, Message, MessageRef, MessageResolver, Value};
use pbj_identity::SchemaCurie;
use serde::{Deserialize, Serialize};
use serde_json::{Value as Wire, json};

/// Wire envelope for a message reference.
#[derive(Debug, Serialize, Deserialize)]
struct RefEnvelope {
    curie: String,
    id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tag: Option<String>,
}

/// JSON wire format for the four object-valued kinds.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode_message(
        &self,
        message: &Message,
        _field: &Field,
        options: &SerializeOptions,
    ) -> Result<Wire> {
        encode_tree(message, self, options)
    }

    fn decode_message(
        &self,
        wire: &Wire,
        _field: &Field,
        resolver: &MessageResolver,
    ) -> Result<Message> {
        decode_tree(wire, resolver, self)
    }

    fn encode_message_ref(&self, message_ref: &MessageRef, _field: &Field) -> Result<Wire> {
        let envelope = RefEnvelope {
            curie: message_ref.curie().to_string(),
            id: message_ref.id().to_string(),
            tag: message_ref.tag().map(str::to_string),
        };
        Ok(serde_json::to_value(envelope)?)
    }

    fn decode_message_ref(&self, wire: &Wire, _field: &Field) -> Result<MessageRef> {
        let envelope: RefEnvelope = serde_json::from_value(wire.clone())?;
        let curie = SchemaCurie::parse(&envelope.curie)?;
        Ok(MessageRef::new(curie, envelope.id, envelope.tag)?)
    }

    fn encode_geo_point(&self, point: &GeoPoint, _field: &Field) -> Result<Wire> {
        // GeoJSON puts longitude first.
        Ok(json!({
            "type": "Point",
            "coordinates": [point.longitude(), point.latitude()],
        }))
    }

    fn decode_geo_point(&self, wire: &Wire, _field: &Field) -> Result<GeoPoint> {
        let obj = wire
            .as_object()
            .ok_or_else(|| Error::unexpected_shape("a GeoJSON point object", wire))?;
        if obj.get("type").and_then(Wire::as_str) != Some("Point") {
            return Err(Error::unexpected_shape("a GeoJSON \"Point\"", wire));
        }
        let coordinates = obj
            .get("coordinates")
            .and_then(Wire::as_array)
            .ok_or_else(|| Error::unexpected_shape("a coordinates array", wire))?;
        match coordinates.as_slice() {
            [lon, lat] => {
                let longitude = lon
                    .as_f64()
                    .ok_or_else(|| Error::unexpected_shape("a longitude number", lon))?;
                let latitude = lat
                    .as_f64()
                    .ok_or_else(|| Error::unexpected_shape("a latitude number", lat))?;
                Ok(GeoPoint::new(latitude, longitude)?)
            }
            _ => Err(Error::unexpected_shape("a [lon, lat] pair", wire)),
        }
    }

    fn encode_dynamic_field(&self, dynamic: &DynamicField, field: &Field) -> Result<Wire> {
        let value = match (dynamic.kind(), dynamic.value()) {
            (DynamicFieldKind::BoolVal, Value::Bool(b)) => json!(b),
            (DynamicFieldKind::DateVal, Value::Date(d)) => {
                json!(d.format("%Y-%m-%d").to_string())
            }
            (DynamicFieldKind::FloatVal, Value::Float(f)) => json!(f),
            (DynamicFieldKind::IntVal, Value::Int(i)) => json!(i),
            (DynamicFieldKind::IntVal, Value::UInt(u)) => json!(u),
            (DynamicFieldKind::StringVal | DynamicFieldKind::TextVal, Value::String(s)) => {
                json!(s)
            }
            (kind, value) => {
                return Err(pbj_core::Error::assertion(
                    field.name(),
                    format!("{kind} cannot carry a {} value", value.type_label()),
                )
                .into());
            }
        };
        let mut obj = serde_json::Map::new();
        obj.insert("name".to_string(), json!(dynamic.name()));
        obj.insert(dynamic.kind().wire_key().to_string(), value);
        Ok(Wire::Object(obj))
    }

    fn decode_dynamic_field(&self, wire: &Wire, _field: &Field) -> Result<DynamicField> {
        let obj = wire
            .as_object()
            .ok_or_else(|| Error::unexpected_shape("a dynamic field object", wire))?;
        let name = obj
            .get("name")
            .and_then(Wire::as_str)
            .ok_or_else(|| Error::unexpected_shape("a dynamic field name", wire))?;

        let (kind, node) = obj
            .iter()
            .filter(|(key, _)| key.as_str() != "name")
            .find_map(|(key, node)| DynamicFieldKind::from_wire_key(key).map(|k| (k, node)))
            .ok_or_else(|| Error::unexpected_shape("a <kind>_val entry", wire))?;

        let value = match kind {
            DynamicFieldKind::BoolVal => node
                .as_bool()
                .map(Value::Bool)
                .ok_or_else(|| Error::unexpected_shape("a bool", node))?,
            DynamicFieldKind::DateVal => {
                let s = node
                    .as_str()
                    .ok_or_else(|| Error::unexpected_shape("a date string", node))?;
                NaiveDate::parse_from_str(s, "%Y-%m-%d")
                    .map(Value::Date)
                    .map_err(|_| Error::unexpected_shape("a YYYY-MM-DD date", node))?
            }
            DynamicFieldKind::FloatVal => node
                .as_f64()
                .map(Value::Float)
                .ok_or_else(|| Error::unexpected_shape("a number", node))?,
            DynamicFieldKind::IntVal => node
                .as_i64()
                .map(Value::Int)
                .ok_or_else(|| Error::unexpected_shape("an integer", node))?,
            DynamicFieldKind::StringVal | DynamicFieldKind::TextVal => node
                .as_str()
                .map(|s| Value::String(s.to_string()))
                .ok_or_else(|| Error::unexpected_shape("a string", node))?,
        };

        Ok(DynamicField::new(name, kind, value)?)
    }
}

/// String-level convenience wrapper around the JSON codec.
#[derive(Debug, Default)]
pub struct JsonSerializer {
    codec: JsonCodec,
    options: SerializeOptions,
}

impl JsonSerializer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a serializer with explicit options.
    pub fn with_options(options: SerializeOptions) -> Self {
        Self {
            codec: JsonCodec,
            options,
        }
    }

    /// Serialize a message to compact JSON text.
    pub fn serialize(&self, message: &Message) -> Result<String> {
        let wire = encode_tree(message, &self.codec, &self.options)?;
        Ok(serde_json::to_string(&wire)?)
    }

    /// Serialize a message to pretty-printed JSON text.
    pub fn serialize_pretty(&self, message: &Message) -> Result<String> {
        let wire = encode_tree(message, &self.codec, &self.options)?;
        Ok(serde_json::to_string_pretty(&wire)?)
    }

    /// Deserialize JSON text back into a message, resolving its schema
    /// through `resolver`.
    pub fn deserialize(&self, text: &str, resolver: &MessageResolver) -> Result<Message> {
        let wire: Wire = serde_json::from_str(text)?;
        decode_tree(&wire, resolver, &self.codec)
    }
}

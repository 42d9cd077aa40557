//! Schema-driven tree walk
//!
//! `encode_tree` and `decode_tree` are the format-independent halves of
//! every serializer: they walk the schema in field order, handle the
//! scalar-encodable kinds through `pbj_core::types`, and hand the four
//! object-valued kinds to the active [`Codec`].

use crate::codec::Codec;
use crate::{Error, Result};
use pbj_core::schema::DISCRIMINATOR_FIELD;
use pbj_core::{Field, Message, MessageResolver, Rule, TypeName, Value, types};
use pbj_identity::SchemaId;
use serde_json::Value as Wire;
use std::sync::Arc;
use tracing::{debug, trace};

/// Knobs for encoding.
#[derive(Debug, Clone, Copy, Default)]
pub struct SerializeOptions {
    /// Emit `null` for every unpopulated field instead of omitting it.
    pub include_all_fields: bool,
}

/// Encode a message to a wire object, walking its schema in field order.
/// The message is validated first; one with a required field unset does
/// not serialize. Unset fields are omitted unless they were explicitly
/// cleared (which emits `null`) or `include_all_fields` is set.
pub fn encode_tree(
    message: &Message,
    codec: &dyn Codec,
    options: &SerializeOptions,
) -> Result<Wire> {
    message.validate()?;
    let schema = message.schema();
    debug!(schema = %schema.id(), "encoding message");

    let mut obj = serde_json::Map::new();
    for field in schema.fields() {
        let name = field.name();

        if !message.has(name) {
            if message.was_cleared(name) || options.include_all_fields {
                obj.insert(name.to_string(), Wire::Null);
            }
            continue;
        }

        match field.rule() {
            Rule::SingleValue => {
                if let Some(value) = message.get(name) {
                    obj.insert(name.to_string(), encode_value(value, field, codec, options)?);
                }
            }
            Rule::Set => {
                let items = message
                    .get_set(name)
                    .into_iter()
                    .map(|v| encode_value(v, field, codec, options))
                    .collect::<Result<Vec<_>>>()?;
                obj.insert(name.to_string(), Wire::Array(items));
            }
            Rule::List => {
                let items = message
                    .get_list(name)
                    .iter()
                    .map(|v| encode_value(v, field, codec, options))
                    .collect::<Result<Vec<_>>>()?;
                obj.insert(name.to_string(), Wire::Array(items));
            }
            Rule::Map => {
                let mut entries = serde_json::Map::new();
                if let Some(map) = message.get_map(name) {
                    for (key, value) in map {
                        entries.insert(key.clone(), encode_value(value, field, codec, options)?);
                    }
                }
                obj.insert(name.to_string(), Wire::Object(entries));
            }
        }
    }

    Ok(Wire::Object(obj))
}

/// Decode a wire object back into a message. The `_schema` discriminator
/// is parsed and resolved through `resolver`; the resolved schema must
/// carry the same curie-major as the payload's id. Unknown fields on the
/// wire are skipped, `null` clears, and defaults are repopulated at the
/// end.
pub fn decode_tree(
    wire: &Wire,
    resolver: &MessageResolver,
    codec: &dyn Codec,
) -> Result<Message> {
    let obj = wire
        .as_object()
        .ok_or_else(|| Error::unexpected_shape("a message object", wire))?;

    let id_str = obj
        .get(DISCRIMINATOR_FIELD)
        .and_then(|v| v.as_str())
        .ok_or(Error::MissingDiscriminator)?;
    let id = SchemaId::parse(id_str)?;

    let schema = resolver.resolve_id(&id)?;
    if schema.curie_major() != id.curie_major() {
        return Err(pbj_core::Error::InvalidResolvedSchema {
            expected: id.curie_major().to_string(),
            actual: schema.curie_major().to_string(),
        }
        .into());
    }
    debug!(schema = %schema.id(), "decoding message");

    let mut message = Message::new(Arc::clone(&schema))?;
    for (name, node) in obj {
        if name == DISCRIMINATOR_FIELD {
            continue;
        }
        if !schema.has_field(name) {
            trace!(schema = %schema.id(), field = %name, "skipping unknown field");
            continue;
        }
        let field = schema.get_field(name)?;

        if node.is_null() {
            message.clear(name)?;
            continue;
        }

        match field.rule() {
            Rule::SingleValue => {
                message.set(name, decode_value(node, field, resolver, codec)?)?;
            }
            Rule::Set => {
                let values = decode_array(node, field, resolver, codec)?;
                message.add_to_set(name, values)?;
            }
            Rule::List => {
                let values = decode_array(node, field, resolver, codec)?;
                message.add_to_list(name, values)?;
            }
            Rule::Map => {
                let entries = node
                    .as_object()
                    .ok_or_else(|| Error::unexpected_shape("a map object", node))?;
                for (key, value) in entries {
                    message.add_to_map(name, key, decode_value(value, field, resolver, codec)?)?;
                }
            }
        }
    }

    message.populate_defaults()?;
    Ok(message)
}

fn encode_value(
    value: &Value,
    field: &Field,
    codec: &dyn Codec,
    options: &SerializeOptions,
) -> Result<Wire> {
    match value {
        Value::Message(m) => codec.encode_message(m, field, options),
        Value::MessageRef(r) => codec.encode_message_ref(r, field),
        Value::GeoPoint(p) => codec.encode_geo_point(p, field),
        Value::DynamicField(d) => codec.encode_dynamic_field(d, field),
        scalar => Ok(types::encode(scalar, field)?),
    }
}

fn decode_value(
    wire: &Wire,
    field: &Field,
    resolver: &MessageResolver,
    codec: &dyn Codec,
) -> Result<Value> {
    match field.type_name() {
        TypeName::Message => codec.decode_message(wire, field, resolver).map(Value::Message),
        TypeName::MessageRef => codec.decode_message_ref(wire, field).map(Value::MessageRef),
        TypeName::GeoPoint => codec.decode_geo_point(wire, field).map(Value::GeoPoint),
        TypeName::DynamicField => codec
            .decode_dynamic_field(wire, field)
            .map(Value::DynamicField),
        _ => Ok(types::decode(wire, field)?),
    }
}

fn decode_array(
    wire: &Wire,
    field: &Field,
    resolver: &MessageResolver,
    codec: &dyn Codec,
) -> Result<Vec<Value>> {
    wire.as_array()
        .ok_or_else(|| Error::unexpected_shape("an array", wire))?
        .iter()
        .map(|v| decode_value(v, field, resolver, codec))
        .collect()
}

//! Codec hooks for the object-valued kinds
//!
//! The serializer in [`crate::serializer`] owns the schema walk and every
//! scalar-encodable kind. The four kinds with structured wire forms are
//! routed through this trait, so adding a wire format means implementing
//! eight hooks rather than re-walking schemas.

use crate::{Result, SerializeOptions};
use pbj_core::{DynamicField, Field, GeoPoint, Message, MessageRef, MessageResolver};
use serde_json::Value as Wire;

/// Wire-format hooks for `message`, `message-ref`, `geo-point`, and
/// `dynamic-field` values. Implementations are object-safe so the
/// serializer can dispatch through `&dyn Codec`.
pub trait Codec {
    /// Encode a nested message. Implementations typically recurse through
    /// [`encode_tree`](crate::encode_tree).
    fn encode_message(
        &self,
        message: &Message,
        field: &Field,
        options: &SerializeOptions,
    ) -> Result<Wire>;

    /// Decode a nested message, resolving its schema through `resolver`.
    fn decode_message(
        &self,
        wire: &Wire,
        field: &Field,
        resolver: &MessageResolver,
    ) -> Result<Message>;

    /// Encode a message reference.
    fn encode_message_ref(&self, message_ref: &MessageRef, field: &Field) -> Result<Wire>;

    /// Decode a message reference.
    fn decode_message_ref(&self, wire: &Wire, field: &Field) -> Result<MessageRef>;

    /// Encode a geo point.
    fn encode_geo_point(&self, point: &GeoPoint, field: &Field) -> Result<Wire>;

    /// Decode a geo point.
    fn decode_geo_point(&self, wire: &Wire, field: &Field) -> Result<GeoPoint>;

    /// Encode a dynamic field.
    fn encode_dynamic_field(&self, dynamic: &DynamicField, field: &Field) -> Result<Wire>;

    /// Decode a dynamic field.
    fn decode_dynamic_field(&self, wire: &Wire, field: &Field) -> Result<DynamicField>;
}

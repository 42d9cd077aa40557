#![deny(warnings)]
#![deny(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::all)]

//! # pbj-marshal
//!
//! Serialization for the message model. A generic serializer walks a
//! message's schema field-by-field and handles every scalar-encodable
//! kind itself; the four object-valued kinds (`message`, `message-ref`,
//! `geo-point`, `dynamic-field`) are delegated to a [`Codec`], so a new
//! wire format only implements those hooks.

/// Codec hooks for the object-valued kinds.
pub mod codec;
/// JSON codec and the string-level convenience wrapper.
pub mod json;
/// Schema-driven tree walk shared by every codec.
pub mod serializer;

pub use codec::Codec;
pub use json::{JsonCodec, JsonSerializer};
pub use serializer::{SerializeOptions, decode_tree, encode_tree};

use thiserror::Error;

/// Errors raised while marshalling messages to or from the wire.
#[derive(Error, Debug)]
pub enum Error {
    /// A wire node did not have the shape the schema calls for.
    #[error("Expected {expected} on the wire, got {actual}")]
    UnexpectedShape { expected: String, actual: String },

    /// A serialized message object is missing its `_schema` discriminator.
    #[error("Serialized message is missing its schema discriminator")]
    MissingDiscriminator,

    /// Schema, value, lifecycle, or resolution failure from pbj-core.
    #[error(transparent)]
    Core(#[from] pbj_core::Error),

    /// Identity grammar violation from pbj-identity.
    #[error(transparent)]
    Identity(#[from] pbj_identity::Error),

    /// Malformed JSON text.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Build a wire-shape mismatch error.
    pub fn unexpected_shape(expected: impl Into<String>, actual: &serde_json::Value) -> Self {
        let actual = match actual {
            serde_json::Value::Null => "null".to_string(),
            serde_json::Value::Bool(_) => "a bool".to_string(),
            serde_json::Value::Number(_) => "a number".to_string(),
            serde_json::Value::String(_) => "a string".to_string(),
            serde_json::Value::Array(_) => "an array".to_string(),
            serde_json::Value::Object(_) => "an object".to_string(),
        };
        Self::UnexpectedShape {
            expected: expected.into(),
            actual,
        }
    }
}

/// Crate-local result type.
pub type Result<T> = std::result::Result<T, Error>;

#![deny(warnings)]
#![deny(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::all)]

//! # pbj-core
//!
//! The runtime schema and message model: a closed type system with a
//! guard/encode/decode contract per kind, immutable `Field`/`Schema`
//! definitions with mixin composition, the mutable-until-frozen `Message`
//! container, and the `MessageResolver` registry that maps a schema's
//! curie-major key to its concrete schema.

/// Dynamic name/kind/value triple for loosely-typed extension data.
pub mod dynamic_field;
/// Field descriptor and its fluent builder.
pub mod field;
/// String format validators for field-level `format` constraints.
pub mod format;
/// Latitude/longitude pair with range validation.
pub mod geo_point;
/// Mutable-until-frozen message container.
pub mod message;
/// Reference to another message by curie and id.
pub mod message_ref;
/// Registry mapping curie-major keys to schemas.
pub mod resolver;
/// Immutable named field collection with mixin composition.
pub mod schema;
/// Closed enumeration of type kinds and their classification queries.
pub mod type_name;
/// Guard/encode/decode implementations for every scalar-encodable kind.
pub mod types;
/// Runtime value union.
pub mod value;

pub use dynamic_field::{DynamicField, DynamicFieldKind};
pub use field::{Field, FieldBuilder, Rule};
pub use format::Format;
pub use geo_point::GeoPoint;
pub use message::Message;
pub use message_ref::MessageRef;
pub use resolver::MessageResolver;
pub use schema::{DISCRIMINATOR_FIELD, Schema};
pub use type_name::TypeName;
pub use value::Value;

use thiserror::Error;

/// Errors raised by schema assembly, value validation, message lifecycle,
/// and resolution. All are hard failures propagated to the immediate
/// caller; nothing is retried or silently coerced.
#[derive(Error, Debug, Clone)]
pub enum Error {
    /// A value violated its type's structural constraints or the owning
    /// field's bounds, pattern, format, or assertion.
    #[error("Assertion failed on field '{field}': {message}")]
    AssertionFailed { field: String, message: String },

    /// A wire value could not be decoded for the given type.
    #[error("Failed to decode {type_name} value: {message}")]
    DecodeValueFailed {
        type_name: TypeName,
        message: String,
    },

    /// A field with this name already exists and is not overridable.
    #[error("Field '{field}' is already defined on schema '{schema}'")]
    FieldAlreadyDefined { schema: String, field: String },

    /// An overridable field was redefined with an incompatible shape.
    #[error("Field '{field}' on schema '{schema}' cannot be overridden with a different type, rule, or required flag")]
    FieldOverrideNotCompatible { schema: String, field: String },

    /// A field lookup missed.
    #[error("Field '{field}' is not defined on schema '{schema}'")]
    FieldNotDefined { schema: String, field: String },

    /// Two mixins with the same curie were composed into one schema.
    #[error("Mixin '{mixin}' is already added to schema '{schema}'")]
    MixinAlreadyAdded { schema: String, mixin: String },

    /// A mixin lookup missed.
    #[error("Mixin '{mixin}' is not defined on schema '{schema}'")]
    MixinNotDefined { schema: String, mixin: String },

    /// `validate()` or `freeze()` found a required field unpopulated.
    #[error("Required field '{field}' is not set on message '{schema}'")]
    RequiredFieldNotSet { schema: String, field: String },

    /// A mutation was attempted after `freeze()`.
    #[error("Message '{schema}' is frozen and cannot be modified")]
    FrozenMessageIsImmutable { schema: String },

    /// The replay flag was set a second time.
    #[error("Replay flag on message '{schema}' can only be set once")]
    ReplayAlreadySet { schema: String },

    /// No schema is registered for the decoded schema id.
    #[error("No message type registered for schema id '{id}'")]
    NoMessageForSchemaId { id: String },

    /// The registered schema's curie-major does not match the decoded id's.
    #[error("Resolved schema '{actual}' does not match curie-major of '{expected}'")]
    InvalidResolvedSchema { expected: String, actual: String },

    /// A curie does not name an instantiable message type with a schema.
    #[error("No schema can be defined for '{curie}'")]
    SchemaNotDefined { curie: String },

    /// Identity grammar violation from pbj-identity.
    #[error(transparent)]
    Identity(#[from] pbj_identity::Error),
}

impl Error {
    /// Build a guard failure scoped to a field.
    pub fn assertion(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::AssertionFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Build a decode failure for a type kind.
    pub fn decode(type_name: TypeName, message: impl Into<String>) -> Self {
        Self::DecodeValueFailed {
            type_name,
            message: message.into(),
        }
    }

    /// Build a missing-field lookup error.
    pub fn field_not_defined(schema: impl Into<String>, field: impl Into<String>) -> Self {
        Self::FieldNotDefined {
            schema: schema.into(),
            field: field.into(),
        }
    }

    /// Build a missing-required-field error.
    pub fn required_field_not_set(schema: impl Into<String>, field: impl Into<String>) -> Self {
        Self::RequiredFieldNotSet {
            schema: schema.into(),
            field: field.into(),
        }
    }
}

/// Crate-local result type.
pub type Result<T> = std::result::Result<T, Error>;

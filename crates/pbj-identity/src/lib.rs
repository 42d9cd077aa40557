#![deny(warnings)]
#![deny(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::all)]

//! # pbj-identity
//!
//! Schema identity objects: `SchemaVersion`, `SchemaQName`, `SchemaCurie`,
//! and `SchemaId`, each validated against a fixed string grammar and (except
//! the cheap version triple) interned process-wide so equal canonical strings
//! always yield the same shared instance.

/// Flyweight interner shared by the identity types.
pub mod cache;
/// Compact `vendor:package:category:message` identifier.
pub mod curie;
/// Fully-qualified `pbj:` schema identifier with version.
pub mod id;
/// Vendor-qualified message name.
pub mod qname;
/// Major-minor-patch version triple.
pub mod version;

pub use curie::SchemaCurie;
pub use id::SchemaId;
pub use qname::SchemaQName;
pub use version::SchemaVersion;

use thiserror::Error;

/// Errors raised when an identity string violates its grammar
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Invalid schema version '{value}': expected 'major-minor-patch'")]
    InvalidSchemaVersion { value: String },

    #[error("Invalid schema qname '{value}': expected 'vendor:message'")]
    InvalidSchemaQName { value: String },

    #[error("Invalid schema curie '{value}': expected 'vendor:package:category:message'")]
    InvalidSchemaCurie { value: String },

    #[error("Invalid schema id '{value}': {reason}")]
    InvalidSchemaId { value: String, reason: String },
}

impl Error {
    /// Build a version grammar error.
    pub fn invalid_version(value: impl Into<String>) -> Self {
        Self::InvalidSchemaVersion {
            value: value.into(),
        }
    }

    /// Build a qname grammar error.
    pub fn invalid_qname(value: impl Into<String>) -> Self {
        Self::InvalidSchemaQName {
            value: value.into(),
        }
    }

    /// Build a curie grammar error.
    pub fn invalid_curie(value: impl Into<String>) -> Self {
        Self::InvalidSchemaCurie {
            value: value.into(),
        }
    }

    /// Build a schema id error with a parsing reason.
    pub fn invalid_id(value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidSchemaId {
            value: value.into(),
            reason: reason.into(),
        }
    }
}

/// Crate-local result type for identity parsing.
pub type Result<T> = std::result::Result<T, Error>;

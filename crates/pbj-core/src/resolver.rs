//! Schema registry and id resolution
//!
//! Deserialization needs a way back from a discriminator string to a live
//! [`Schema`]. The resolver is that registry: schemas register under their
//! curie-major key (`"<curie>:v<major>"`), and ids resolve through that
//! key with a bare-curie fallback for payloads written before a major
//! bump.

use crate::schema::Schema;
use crate::{Error, Result};
use dashmap::DashMap;
use pbj_identity::{SchemaCurie, SchemaId};
use std::sync::Arc;
use tracing::debug;

/// Concurrent registry mapping resolution keys to schemas.
#[derive(Debug, Default)]
pub struct MessageResolver {
    schemas: DashMap<String, Arc<Schema>>,
}

impl MessageResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a schema under its curie-major key, and under its bare
    /// curie when no other major version claimed it first. Mixin schemas
    /// are composed into other schemas, never resolved on their own, and
    /// are rejected here.
    pub fn register(&self, schema: Arc<Schema>) -> Result<()> {
        if schema.curie().is_mixin() {
            return Err(Error::SchemaNotDefined {
                curie: schema.curie().to_string(),
            });
        }

        let curie_major = schema.curie_major().to_string();
        debug!(schema = %schema.id(), key = %curie_major, "registering schema");
        self.schemas.insert(curie_major, Arc::clone(&schema));
        self.schemas
            .entry(schema.curie().to_string())
            .or_insert(schema);
        Ok(())
    }

    /// Whether any schema is registered for this key.
    pub fn is_registered(&self, key: &str) -> bool {
        self.schemas.contains_key(key)
    }

    /// Resolve a schema id, preferring the exact curie-major match and
    /// falling back to the bare curie.
    pub fn resolve_id(&self, id: &SchemaId) -> Result<Arc<Schema>> {
        self.schemas
            .get(id.curie_major())
            .or_else(|| self.schemas.get(&id.curie().to_string()))
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| Error::NoMessageForSchemaId { id: id.to_string() })
    }

    /// Resolve the schema registered for a bare curie.
    pub fn resolve_curie(&self, curie: &SchemaCurie) -> Result<Arc<Schema>> {
        self.schemas
            .get(&curie.to_string())
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| Error::NoMessageForSchemaId {
                id: curie.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Field;
    use crate::type_name::TypeName;

    fn schema(id: &str) -> Arc<Schema> {
        Schema::new(
            SchemaId::parse(id).unwrap(),
            vec![Field::builder("title", TypeName::String).build().unwrap()],
            vec![],
        )
        .unwrap()
    }

    #[test]
    fn test_register_and_resolve() {
        let resolver = MessageResolver::new();
        let s = schema("pbj:acme:blog:event:article-published:1-0-0");
        resolver.register(Arc::clone(&s)).unwrap();

        assert!(resolver.is_registered("acme:blog:event:article-published:v1"));
        assert!(resolver.is_registered("acme:blog:event:article-published"));

        let id = SchemaId::parse("pbj:acme:blog:event:article-published:1-0-0").unwrap();
        let resolved = resolver.resolve_id(&id).unwrap();
        assert_eq!(resolved.id(), s.id());
    }

    #[test]
    fn test_resolve_minor_revision_through_curie_major() {
        let resolver = MessageResolver::new();
        resolver
            .register(schema("pbj:acme:blog:event:article-published:1-1-0"))
            .unwrap();

        // An older minor revision of the same major resolves to what is
        // registered for that major.
        let id = SchemaId::parse("pbj:acme:blog:event:article-published:1-0-0").unwrap();
        let resolved = resolver.resolve_id(&id).unwrap();
        assert_eq!(resolved.curie_major(), "acme:blog:event:article-published:v1");
    }

    #[test]
    fn test_bare_curie_fallback_keeps_first_major() {
        let resolver = MessageResolver::new();
        resolver
            .register(schema("pbj:acme:blog:event:article-published:1-0-0"))
            .unwrap();
        resolver
            .register(schema("pbj:acme:blog:event:article-published:2-0-0"))
            .unwrap();

        // v2 registers its own curie-major key but the bare curie stays
        // with the first registrant.
        let v2 = SchemaId::parse("pbj:acme:blog:event:article-published:2-0-0").unwrap();
        assert_eq!(
            resolver.resolve_id(&v2).unwrap().curie_major(),
            "acme:blog:event:article-published:v2"
        );

        let v3 = SchemaId::parse("pbj:acme:blog:event:article-published:3-0-0").unwrap();
        assert_eq!(
            resolver.resolve_id(&v3).unwrap().curie_major(),
            "acme:blog:event:article-published:v1"
        );
    }

    #[test]
    fn test_unknown_id_fails() {
        let resolver = MessageResolver::new();
        let id = SchemaId::parse("pbj:acme:blog:event:unknown:1-0-0").unwrap();
        assert!(matches!(
            resolver.resolve_id(&id).unwrap_err(),
            Error::NoMessageForSchemaId { .. }
        ));
    }

    #[test]
    fn test_mixin_registration_rejected() {
        let resolver = MessageResolver::new();
        let err = resolver
            .register(schema("pbj:acme:blog:mixin:taggable:1-0-0"))
            .unwrap_err();
        assert!(matches!(err, Error::SchemaNotDefined { .. }));
    }
}

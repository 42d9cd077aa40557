//! Schema assembly and lookup
//!
//! A schema is an immutable, named collection of fields keyed by a
//! [`SchemaId`], assembled from direct fields plus zero or more mixins.
//! Every schema carries the `_schema` discriminator field holding its own
//! id string; that field is how a decoded payload finds its way back to a
//! schema.

use crate::field::Field;
use crate::type_name::TypeName;
use crate::value::Value;
use crate::{Error, Result};
use pbj_identity::{SchemaCurie, SchemaId, id::ID_PATTERN, id::MAX_ID_LENGTH};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Name of the required discriminator field present on every schema.
pub const DISCRIMINATOR_FIELD: &str = "_schema";

/// An immutable, named collection of fields. Field order is insertion
/// order (discriminator, then mixin fields in curie order, then direct
/// fields) and is the order serialization walks.
#[derive(Debug)]
pub struct Schema {
    id: Arc<SchemaId>,
    fields: Vec<Field>,
    by_name: HashMap<String, usize>,
    mixins: Vec<Arc<Schema>>,
    mixin_keys: HashSet<String>,
}

impl Schema {
    /// Assemble a schema from direct fields and mixin schemas.
    pub fn new(
        id: Arc<SchemaId>,
        fields: Vec<Field>,
        mixins: Vec<Arc<Schema>>,
    ) -> Result<Arc<Self>> {
        let mut schema = Self {
            id: id.clone(),
            fields: Vec::new(),
            by_name: HashMap::new(),
            mixins: Vec::new(),
            mixin_keys: HashSet::new(),
        };

        let discriminator = Field::builder(DISCRIMINATOR_FIELD, TypeName::String)
            .required()
            .pattern(ID_PATTERN.as_str())
            .max_length(MAX_ID_LENGTH)
            .default_value(Value::String(id.to_string()))
            .build()?;
        schema.add_field(discriminator)?;

        let mut ordered = mixins;
        ordered.sort_by_key(|m| m.curie().to_string());

        for mixin in ordered {
            schema.add_mixin(mixin)?;
        }

        for field in fields {
            schema.add_field(field)?;
        }

        debug!(
            schema = %schema.id,
            fields = schema.fields.len(),
            mixins = schema.mixins.len(),
            "assembled schema"
        );

        Ok(Arc::new(schema))
    }

    fn add_mixin(&mut self, mixin: Arc<Schema>) -> Result<()> {
        let curie = mixin.curie().to_string();
        if self.mixin_keys.contains(&curie) {
            return Err(Error::MixinAlreadyAdded {
                schema: self.id.to_string(),
                mixin: curie,
            });
        }

        self.mixin_keys.insert(curie);
        self.mixin_keys.insert(mixin.curie_major().to_string());

        // The mixin's own discriminator describes the mixin, not the
        // composing schema.
        for field in mixin.fields().iter().filter(|f| f.name() != DISCRIMINATOR_FIELD) {
            self.add_field(field.clone())?;
        }

        self.mixins.push(mixin);
        Ok(())
    }

    fn add_field(&mut self, field: Field) -> Result<()> {
        match self.by_name.get(field.name()) {
            None => {
                self.by_name.insert(field.name().to_string(), self.fields.len());
                self.fields.push(field);
                Ok(())
            }
            Some(&idx) => {
                let existing = &self.fields[idx];
                if !existing.is_overridable() {
                    return Err(Error::FieldAlreadyDefined {
                        schema: self.id.to_string(),
                        field: field.name().to_string(),
                    });
                }
                if !existing.is_compatible_for_override(&field) {
                    return Err(Error::FieldOverrideNotCompatible {
                        schema: self.id.to_string(),
                        field: field.name().to_string(),
                    });
                }
                self.fields[idx] = field;
                Ok(())
            }
        }
    }

    /// The schema's id.
    pub fn id(&self) -> &Arc<SchemaId> {
        &self.id
    }

    /// The schema's curie.
    pub fn curie(&self) -> &Arc<SchemaCurie> {
        self.id.curie()
    }

    /// The resolution key, `"<curie>:v<major>"`.
    pub fn curie_major(&self) -> &str {
        self.id.curie_major()
    }

    /// All fields in serialization order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Whether a field with this name exists.
    pub fn has_field(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Look up a field by name.
    pub fn get_field(&self, name: &str) -> Result<&Field> {
        self.by_name
            .get(name)
            .map(|&idx| &self.fields[idx])
            .ok_or_else(|| Error::field_not_defined(self.id.to_string(), name))
    }

    /// Fields that must be populated for a message to validate, in
    /// serialization order.
    pub fn required_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(|f| f.is_required())
    }

    /// Composed mixin schemas, in curie order.
    pub fn mixins(&self) -> &[Arc<Schema>] {
        &self.mixins
    }

    /// Whether a mixin is composed, by curie or curie-major key.
    pub fn has_mixin(&self, key: &str) -> bool {
        self.mixin_keys.contains(key)
    }

    /// Look up a composed mixin by curie or curie-major key.
    pub fn get_mixin(&self, key: &str) -> Result<&Arc<Schema>> {
        self.mixins
            .iter()
            .find(|m| m.curie().to_string() == key || m.curie_major() == key)
            .ok_or_else(|| Error::MixinNotDefined {
                schema: self.id.to_string(),
                mixin: key.to_string(),
            })
    }

    /// Curie-major keys of all composed mixins.
    pub fn mixin_keys(&self) -> Vec<&str> {
        self.mixins.iter().map(|m| m.curie_major()).collect()
    }
}

impl PartialEq for Schema {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Schema {}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Rule;

    fn id(s: &str) -> Arc<SchemaId> {
        SchemaId::parse(s).unwrap()
    }

    fn article_schema() -> Arc<Schema> {
        Schema::new(
            id("pbj:acme:blog:event:article-published:1-0-0"),
            vec![
                Field::builder("title", TypeName::String).required().build().unwrap(),
                Field::builder("tags", TypeName::String).rule(Rule::Set).build().unwrap(),
            ],
            vec![],
        )
        .unwrap()
    }

    fn taggable_mixin() -> Arc<Schema> {
        Schema::new(
            id("pbj:acme:blog:mixin:taggable:1-0-0"),
            vec![
                Field::builder("labels", TypeName::String)
                    .rule(Rule::Set)
                    .overridable()
                    .build()
                    .unwrap(),
            ],
            vec![],
        )
        .unwrap()
    }

    #[test]
    fn test_discriminator_installed_first() {
        let schema = article_schema();
        let first = &schema.fields()[0];
        assert_eq!(first.name(), DISCRIMINATOR_FIELD);
        assert!(first.is_required());
        assert_eq!(
            first.get_default(None),
            Some(Value::String(
                "pbj:acme:blog:event:article-published:1-0-0".to_string()
            ))
        );
    }

    #[test]
    fn test_discriminator_pattern_is_id_grammar() {
        let schema = article_schema();
        let field = schema.get_field(DISCRIMINATOR_FIELD).unwrap();
        assert!(
            field
                .guard_value(&Value::from("pbj:acme:blog:event:article-published:1-0-0"))
                .is_ok()
        );
        assert!(field.guard_value(&Value::from("not-a-schema-id")).is_err());
    }

    #[test]
    fn test_get_field_missing() {
        let schema = article_schema();
        let err = schema.get_field("nope").unwrap_err();
        assert!(matches!(err, Error::FieldNotDefined { .. }));
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let err = Schema::new(
            id("pbj:acme:blog:event:dup:1-0-0"),
            vec![
                Field::builder("title", TypeName::String).build().unwrap(),
                Field::builder("title", TypeName::String).build().unwrap(),
            ],
            vec![],
        )
        .unwrap_err();
        assert!(matches!(err, Error::FieldAlreadyDefined { .. }));
    }

    #[test]
    fn test_mixin_fields_composed() {
        let schema = Schema::new(
            id("pbj:acme:blog:event:article-published:1-0-0"),
            vec![Field::builder("title", TypeName::String).build().unwrap()],
            vec![taggable_mixin()],
        )
        .unwrap();

        assert!(schema.has_field("labels"));
        assert!(schema.has_mixin("acme:blog:mixin:taggable"));
        assert!(schema.has_mixin("acme:blog:mixin:taggable:v1"));
        assert!(!schema.has_mixin("acme:blog:mixin:other"));
        assert!(schema.get_mixin("acme:blog:mixin:taggable:v1").is_ok());
        assert!(matches!(
            schema.get_mixin("acme:blog:mixin:other").unwrap_err(),
            Error::MixinNotDefined { .. }
        ));
    }

    #[test]
    fn test_duplicate_mixin_rejected() {
        let err = Schema::new(
            id("pbj:acme:blog:event:article-published:1-0-0"),
            vec![],
            vec![taggable_mixin(), taggable_mixin()],
        )
        .unwrap_err();
        assert!(matches!(err, Error::MixinAlreadyAdded { .. }));
    }

    #[test]
    fn test_override_compatible_replaces() {
        let schema = Schema::new(
            id("pbj:acme:blog:event:article-published:1-0-0"),
            vec![
                // Same name/type/rule/required as the mixin's overridable
                // field, with a tighter length bound.
                Field::builder("labels", TypeName::String)
                    .rule(Rule::Set)
                    .max_length(32)
                    .build()
                    .unwrap(),
            ],
            vec![taggable_mixin()],
        )
        .unwrap();

        let field = schema.get_field("labels").unwrap();
        assert_eq!(field.max_length(), Some(32));
    }

    #[test]
    fn test_override_incompatible_rejected() {
        let err = Schema::new(
            id("pbj:acme:blog:event:article-published:1-0-0"),
            vec![
                Field::builder("labels", TypeName::String)
                    .rule(Rule::List)
                    .build()
                    .unwrap(),
            ],
            vec![taggable_mixin()],
        )
        .unwrap_err();
        assert!(matches!(err, Error::FieldOverrideNotCompatible { .. }));
    }

    #[test]
    fn test_override_non_overridable_rejected() {
        // "title" on the base schema is not overridable.
        let base_fields = vec![
            Field::builder("title", TypeName::String).build().unwrap(),
            Field::builder("title", TypeName::String).build().unwrap(),
        ];
        let err = Schema::new(
            id("pbj:acme:blog:event:article-published:1-0-0"),
            base_fields,
            vec![],
        )
        .unwrap_err();
        assert!(matches!(err, Error::FieldAlreadyDefined { .. }));
    }

    #[test]
    fn test_required_fields_in_order() {
        let schema = article_schema();
        let required: Vec<&str> = schema.required_fields().map(|f| f.name()).collect();
        assert_eq!(required, vec![DISCRIMINATOR_FIELD, "title"]);
    }
}

//! Fully-qualified schema identifier

use crate::cache::Interner;
use crate::curie::SchemaCurie;
use crate::version::SchemaVersion;
use crate::{Error, Result};
use regex::Regex;
use std::fmt;
use std::sync::{Arc, LazyLock};

/// Grammar for the canonical
/// `pbj:vendor:package:category:message:major-minor-patch` form.
pub static ID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^pbj:([a-z0-9-]+):([a-z0-9.-]+):([a-z0-9-]*):([a-z0-9-]+):([0-9]+-[0-9]+-[0-9]+)$")
        .expect("valid schema id regex")
});

/// Hard cap on the serialized id length. Ids end up as keys in storage and
/// search backends that bound key sizes.
pub const MAX_ID_LENGTH: usize = 150;

static INTERNER: LazyLock<Interner<SchemaId>> = LazyLock::new(Interner::new);

/// A fully-qualified, versioned schema identifier, canonical form
/// `"pbj:vendor:package:category:message:M-m-p"`.
///
/// Interned: parsing equal strings returns the same `Arc`. Resolution
/// throughout the runtime keys on [`SchemaId::curie_major`], so ids that
/// differ only in minor/patch resolve to the same message type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SchemaId {
    curie: Arc<SchemaCurie>,
    version: SchemaVersion,
    curie_major: String,
}

impl SchemaId {
    /// Parse and intern the canonical schema id form.
    pub fn parse(value: &str) -> Result<Arc<Self>> {
        INTERNER.get_or_try_insert(value, || {
            if value.len() > MAX_ID_LENGTH {
                return Err(Error::invalid_id(
                    value,
                    format!("serialized form exceeds {MAX_ID_LENGTH} characters"),
                ));
            }

            let caps = ID_PATTERN
                .captures(value)
                .ok_or_else(|| Error::invalid_id(value, "grammar mismatch"))?;

            // The curie grammar is a strict subset of the id grammar, so
            // this re-parse cannot fail; routing through SchemaCurie keeps
            // the curie itself interned.
            let curie_str = format!("{}:{}:{}:{}", &caps[1], &caps[2], &caps[3], &caps[4]);
            let curie = SchemaCurie::parse(&curie_str)
                .map_err(|_| Error::invalid_id(value, "invalid curie segment"))?;

            let version = SchemaVersion::parse(&caps[5])
                .map_err(|_| Error::invalid_id(value, "invalid version segment"))?;

            let curie_major = format!("{}:v{}", curie, version.major());

            Ok(Self {
                curie,
                version,
                curie_major,
            })
        })
    }

    /// The versionless curie.
    pub fn curie(&self) -> &Arc<SchemaCurie> {
        &self.curie
    }

    /// The version triple.
    pub fn version(&self) -> SchemaVersion {
        self.version
    }

    /// The resolution key, `"<curie>:v<major>"`. Two schemas differing only
    /// in minor/patch share this key and resolve to the same type.
    pub fn curie_major(&self) -> &str {
        &self.curie_major
    }
}

impl fmt::Display for SchemaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pbj:{}:{}", self.curie, self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        let id = SchemaId::parse("pbj:acme:blog:event:article-published:1-0-0").unwrap();
        assert_eq!(id.curie().to_string(), "acme:blog:event:article-published");
        assert_eq!(id.version().to_string(), "1-0-0");
        assert_eq!(
            id.to_string(),
            "pbj:acme:blog:event:article-published:1-0-0"
        );
    }

    #[test]
    fn test_flyweight_same_instance() {
        let a = SchemaId::parse("pbj:acme:blog:event:article-published:1-0-0").unwrap();
        let b = SchemaId::parse("pbj:acme:blog:event:article-published:1-0-0").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_curie_major() {
        let id = SchemaId::parse("pbj:acme:blog:event:article-published:2-1-9").unwrap();
        assert_eq!(id.curie_major(), "acme:blog:event:article-published:v2");

        let other = SchemaId::parse("pbj:acme:blog:event:article-published:2-4-0").unwrap();
        assert_eq!(id.curie_major(), other.curie_major());
    }

    #[test]
    fn test_curie_is_shared_with_interner() {
        let id = SchemaId::parse("pbj:acme:blog:event:article-published:1-0-0").unwrap();
        let curie = SchemaCurie::parse("acme:blog:event:article-published").unwrap();
        assert!(Arc::ptr_eq(id.curie(), &curie));
    }

    #[test]
    fn test_empty_category() {
        let id = SchemaId::parse("pbj:acme:blog::article:1-0-0").unwrap();
        assert_eq!(id.curie().category(), None);
        assert_eq!(id.curie_major(), "acme:blog::article:v1");
    }

    #[test]
    fn test_parse_rejects_bad_grammar() {
        for bad in [
            "",
            "acme:blog:event:article-published:1-0-0",
            "pbj:acme:blog:event:article-published",
            "pbj:acme:blog:event:article-published:1-0",
            "pbj:acme:blog:event:article-published:1-0-0-0",
            "pbj:Acme:blog:event:article-published:1-0-0",
            "pbj:acme:blog:event:Article:1-0-0",
            "pbj:acme:blog:event:article-published:v1-0-0",
        ] {
            let err = SchemaId::parse(bad).unwrap_err();
            assert!(
                matches!(err, Error::InvalidSchemaId { .. }),
                "expected InvalidSchemaId for {:?}",
                bad
            );
        }
    }

    #[test]
    fn test_parse_rejects_overlong_id() {
        let long = format!("pbj:acme:{}:event:article:1-0-0", "x".repeat(160));
        let err = SchemaId::parse(&long).unwrap_err();
        assert!(matches!(err, Error::InvalidSchemaId { .. }));
        assert!(err.to_string().contains("150"));
    }

    #[test]
    fn test_rejection_caches_nothing() {
        // Parsing the same bad string twice must fail both times.
        assert!(SchemaId::parse("pbj:BAD:blog:event:article:1-0-0").is_err());
        assert!(SchemaId::parse("pbj:BAD:blog:event:article:1-0-0").is_err());
    }
}

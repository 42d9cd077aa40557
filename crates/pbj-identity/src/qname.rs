//! Vendor-qualified message name

use crate::cache::Interner;
use crate::{Error, Result};
use regex::Regex;
use std::fmt;
use std::sync::{Arc, LazyLock};

/// Grammar for the canonical `vendor:message` form.
pub static QNAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([a-z0-9-]+):([a-z0-9-]+)$").expect("valid qname regex"));

static INTERNER: LazyLock<Interner<SchemaQName>> = LazyLock::new(Interner::new);

/// A vendor-qualified message name, canonical form `"vendor:message"`.
///
/// Interned: parsing equal strings returns the same `Arc`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SchemaQName {
    vendor: String,
    message: String,
}

impl SchemaQName {
    /// Parse and intern the canonical `"vendor:message"` form.
    pub fn parse(value: &str) -> Result<Arc<Self>> {
        INTERNER.get_or_try_insert(value, || {
            let caps = QNAME_PATTERN
                .captures(value)
                .ok_or_else(|| Error::invalid_qname(value))?;
            Ok(Self {
                vendor: caps[1].to_string(),
                message: caps[2].to_string(),
            })
        })
    }

    /// Build and intern a qname from already-validated segments.
    pub(crate) fn from_segments(vendor: &str, message: &str) -> Arc<Self> {
        let canonical = format!("{vendor}:{message}");
        INTERNER
            .get_or_try_insert(&canonical, || {
                Ok::<_, Error>(Self {
                    vendor: vendor.to_string(),
                    message: message.to_string(),
                })
            })
            .expect("segment builder is infallible")
    }

    /// Vendor segment.
    pub fn vendor(&self) -> &str {
        &self.vendor
    }

    /// Message segment.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for SchemaQName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.vendor, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        let q = SchemaQName::parse("acme:article").unwrap();
        assert_eq!(q.vendor(), "acme");
        assert_eq!(q.message(), "article");
        assert_eq!(q.to_string(), "acme:article");
    }

    #[test]
    fn test_flyweight_same_instance() {
        let a = SchemaQName::parse("acme:article").unwrap();
        let b = SchemaQName::parse("acme:article").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_parse_rejects_bad_grammar() {
        for bad in [
            "",
            "acme",
            "acme:",
            ":article",
            "Acme:article",
            "acme:Article",
            "acme:art_icle",
            "acme:blog:article",
            "acme article",
        ] {
            let err = SchemaQName::parse(bad).unwrap_err();
            assert!(
                matches!(err, Error::InvalidSchemaQName { .. }),
                "expected InvalidSchemaQName for {:?}",
                bad
            );
        }
    }

    #[test]
    fn test_digits_and_dashes_allowed() {
        let q = SchemaQName::parse("acme-labs2:article-v2").unwrap();
        assert_eq!(q.vendor(), "acme-labs2");
    }

    #[test]
    fn test_equality_by_string() {
        let a = SchemaQName::parse("acme:one").unwrap();
        let b = SchemaQName::parse("acme:two").unwrap();
        assert_ne!(a, b);
        assert_eq!(a, SchemaQName::parse("acme:one").unwrap());
    }
}

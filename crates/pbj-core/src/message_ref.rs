//! Reference to another message

use crate::{Error, Result};
use pbj_identity::SchemaCurie;
use std::fmt;
use std::sync::Arc;

/// A pointer to another message: the target's curie, its id, and an
/// optional tag qualifying the relationship. Canonical string form is
/// `"vendor:package:category:message:id"` with `"#tag"` appended when a
/// tag is present.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MessageRef {
    curie: Arc<SchemaCurie>,
    id: String,
    tag: Option<String>,
}

impl MessageRef {
    /// Create a reference. The id must be non-empty and free of the
    /// delimiter characters used in the canonical form.
    pub fn new(curie: Arc<SchemaCurie>, id: impl Into<String>, tag: Option<String>) -> Result<Self> {
        let id = id.into();
        if id.is_empty() || id.contains(':') || id.contains('#') {
            return Err(Error::assertion(
                "message_ref",
                format!("invalid ref id '{id}'"),
            ));
        }
        if let Some(t) = &tag {
            if t.is_empty() || t.contains(':') || t.contains('#') {
                return Err(Error::assertion(
                    "message_ref",
                    format!("invalid ref tag '{t}'"),
                ));
            }
        }
        Ok(Self { curie, id, tag })
    }

    /// Parse the canonical `"curie:id"` or `"curie:id#tag"` form.
    pub fn parse(value: &str) -> Result<Self> {
        let (body, tag) = match value.split_once('#') {
            Some((b, t)) => (b, Some(t.to_string())),
            None => (value, None),
        };

        // The curie is the first four colon-separated segments; the rest
        // is the id.
        let mut splits = body.match_indices(':');
        let id_start = splits
            .nth(3)
            .map(|(i, _)| i)
            .ok_or_else(|| Error::assertion("message_ref", format!("invalid ref '{value}'")))?;

        let curie = SchemaCurie::parse(&body[..id_start])?;
        Self::new(curie, &body[id_start + 1..], tag)
    }

    /// Target curie.
    pub fn curie(&self) -> &Arc<SchemaCurie> {
        &self.curie
    }

    /// Target id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Relationship tag, when present.
    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }
}

impl fmt::Display for MessageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.curie, self.id)?;
        if let Some(tag) = &self.tag {
            write!(f, "#{tag}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn curie() -> Arc<SchemaCurie> {
        SchemaCurie::parse("acme:blog:node:article").unwrap()
    }

    #[test]
    fn test_new_and_display() {
        let r = MessageRef::new(curie(), "123", None).unwrap();
        assert_eq!(r.to_string(), "acme:blog:node:article:123");

        let tagged = MessageRef::new(curie(), "123", Some("author".to_string())).unwrap();
        assert_eq!(tagged.to_string(), "acme:blog:node:article:123#author");
        assert_eq!(tagged.tag(), Some("author"));
    }

    #[test]
    fn test_parse_round_trip() {
        for s in [
            "acme:blog:node:article:123",
            "acme:blog:node:article:a1b2-c3#author",
            "acme:blog::article:9",
        ] {
            let r = MessageRef::parse(s).unwrap();
            assert_eq!(r.to_string(), s);
        }
    }

    #[test]
    fn test_invalid_id_rejected() {
        assert!(MessageRef::new(curie(), "", None).is_err());
        assert!(MessageRef::new(curie(), "a:b", None).is_err());
        assert!(MessageRef::new(curie(), "a#b", None).is_err());
    }

    #[test]
    fn test_parse_rejects_short_form() {
        assert!(MessageRef::parse("acme:blog:article").is_err());
        assert!(MessageRef::parse("").is_err());
    }
}

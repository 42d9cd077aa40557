//! Compact schema identifier (curie)

use crate::cache::Interner;
use crate::qname::SchemaQName;
use crate::{Error, Result};
use regex::Regex;
use std::fmt;
use std::sync::{Arc, LazyLock};

/// Grammar for the canonical `vendor:package:category:message` form. The
/// category segment may be empty but its delimiting colon is always present.
pub static CURIE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([a-z0-9-]+):([a-z0-9.-]+):([a-z0-9-]*):([a-z0-9-]+)$")
        .expect("valid curie regex")
});

/// Literal category marking a curie as a mixin.
pub const MIXIN_CATEGORY: &str = "mixin";

static INTERNER: LazyLock<Interner<SchemaCurie>> = LazyLock::new(Interner::new);

/// A compact, versionless schema identifier with canonical form
/// `"vendor:package:category:message"`.
///
/// Interned: parsing equal strings returns the same `Arc`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SchemaCurie {
    vendor: String,
    package: String,
    category: Option<String>,
    message: String,
    qname: Arc<SchemaQName>,
}

impl SchemaCurie {
    /// Parse and intern the canonical curie form.
    pub fn parse(value: &str) -> Result<Arc<Self>> {
        INTERNER.get_or_try_insert(value, || {
            let caps = CURIE_PATTERN
                .captures(value)
                .ok_or_else(|| Error::invalid_curie(value))?;

            let vendor = caps[1].to_string();
            let message = caps[4].to_string();
            let qname = SchemaQName::from_segments(&vendor, &message);

            Ok(Self {
                vendor,
                package: caps[2].to_string(),
                category: match &caps[3] {
                    "" => None,
                    c => Some(c.to_string()),
                },
                message,
                qname,
            })
        })
    }

    /// Vendor segment.
    pub fn vendor(&self) -> &str {
        &self.vendor
    }

    /// Package segment.
    pub fn package(&self) -> &str {
        &self.package
    }

    /// Category segment, when present.
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    /// Message segment.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Derived vendor-qualified name.
    pub fn qname(&self) -> &Arc<SchemaQName> {
        &self.qname
    }

    /// Whether the category marks this curie as a mixin.
    pub fn is_mixin(&self) -> bool {
        self.category.as_deref() == Some(MIXIN_CATEGORY)
    }
}

impl fmt::Display for SchemaCurie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}",
            self.vendor,
            self.package,
            self.category.as_deref().unwrap_or(""),
            self.message
        )
    }
}

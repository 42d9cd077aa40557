//! String format validators
//!
//! A field may constrain a string kind to one of these named formats. The
//! validators below are the contract surface: email uses the WHATWG
//! single-regex form, hostname follows RFC 1123 label rules, ipv4/ipv6
//! delegate to the std parsers, url checks the scheme://rest shape, and
//! uuid/date/date-time delegate to the corresponding value parsers.

use crate::{Error, Result};
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

static SLUG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").expect("valid slug regex"));

static DATED_SLUG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{4}/\d{2}/\d{2}/[a-z0-9]+(?:-[a-z0-9]+)*$").expect("valid dated-slug regex")
});

static HASHTAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#?[a-zA-Z0-9_]*[a-zA-Z][a-zA-Z0-9_]*$").expect("valid hashtag regex"));

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?x)^[a-zA-Z0-9.!\#$%&'*+/=?^_`{|}~-]+@
          [a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?
          (?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    )
    .expect("valid email regex")
});

static HOSTNAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?x)^(?:[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?\.)*
          [a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?$",
    )
    .expect("valid hostname regex")
});

static URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9+.-]*://\S+$").expect("valid url regex"));

/// Named string formats a field may require.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    Date,
    DateTime,
    DatedSlug,
    Email,
    Hashtag,
    Hostname,
    Ipv4,
    Ipv6,
    Slug,
    Url,
    Uuid,
}

impl Format {
    /// Canonical tag for this format.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::DateTime => "date-time",
            Self::DatedSlug => "dated-slug",
            Self::Email => "email",
            Self::Hashtag => "hashtag",
            Self::Hostname => "hostname",
            Self::Ipv4 => "ipv4",
            Self::Ipv6 => "ipv6",
            Self::Slug => "slug",
            Self::Url => "url",
            Self::Uuid => "uuid",
        }
    }

    /// Look up a format by its canonical tag.
    pub fn find(tag: &str) -> Option<Self> {
        match tag {
            "date" => Some(Self::Date),
            "date-time" => Some(Self::DateTime),
            "dated-slug" => Some(Self::DatedSlug),
            "email" => Some(Self::Email),
            "hashtag" => Some(Self::Hashtag),
            "hostname" => Some(Self::Hostname),
            "ipv4" => Some(Self::Ipv4),
            "ipv6" => Some(Self::Ipv6),
            "slug" => Some(Self::Slug),
            "url" => Some(Self::Url),
            "uuid" => Some(Self::Uuid),
            _ => None,
        }
    }

    /// Whether `value` satisfies this format.
    pub fn matches(&self, value: &str) -> bool {
        match self {
            Self::Date => chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok(),
            Self::DateTime => chrono::DateTime::parse_from_rfc3339(value).is_ok(),
            Self::DatedSlug => DATED_SLUG.is_match(value),
            Self::Email => EMAIL.is_match(value),
            Self::Hashtag => HASHTAG.is_match(value),
            Self::Hostname => HOSTNAME.is_match(value) && value.len() <= 253,
            Self::Ipv4 => value.parse::<std::net::Ipv4Addr>().is_ok(),
            Self::Ipv6 => value.parse::<std::net::Ipv6Addr>().is_ok(),
            Self::Slug => SLUG.is_match(value),
            Self::Url => URL.is_match(value),
            Self::Uuid => uuid::Uuid::parse_str(value).is_ok(),
        }
    }

    /// Guard `value` against this format, scoped to `field_name` for error
    /// context.
    pub fn guard(&self, value: &str, field_name: &str) -> Result<()> {
        if self.matches(value) {
            Ok(())
        } else {
            Err(Error::assertion(
                field_name,
                format!("'{value}' is not a valid {self}"),
            ))
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

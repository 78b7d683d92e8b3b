//! The bookmark record.
//!
//! Field names on the wire follow the Anybox JSON export, so anything this
//! crate writes can be imported again as that dialect.
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::{canonicalize_url, normalize_tag, normalize_tags, Dialect, Result};

/// Represents a single saved link
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Bookmark {
    /// Internal identifier, generated on import
    #[serde(skip_deserializing)]
    pub id: String,
    /// URL as provided by the source
    #[serde(deserialize_with = "nullable_string")]
    pub url: String,
    /// Deduplication key derived from `url`; never read from or written to disk
    #[serde(skip)]
    pub canonical_url: String,
    /// Page title
    #[serde(deserialize_with = "nullable_string")]
    pub title: String,
    /// Page description
    #[serde(deserialize_with = "nullable_string")]
    pub description: String,
    /// Tag hierarchies, each ordered outer to inner: `[["security", "user-auth"], ["infra"]]`
    #[serde(deserialize_with = "lenient_tags")]
    pub tags: Vec<Vec<String>>,
    /// Folder path from root to leaf
    #[serde(deserialize_with = "nullable_strings")]
    pub folder: Vec<String>,
    /// Personal note
    #[serde(deserialize_with = "nullable_string")]
    pub comment: String,
    /// Shortcut alias
    #[serde(deserialize_with = "nullable_string")]
    pub keyword: String,
    /// Favorite flag
    #[serde(deserialize_with = "nullable_bool")]
    pub is_starred: bool,
    /// When the link was first saved, if known
    #[serde(
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub date_added: Option<DateTime<Utc>>,
    /// When the link was last changed, if known
    #[serde(
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_modified: Option<DateTime<Utc>>,
    /// Saved article text
    #[serde(
        deserialize_with = "nullable_string",
        skip_serializing_if = "String::is_empty"
    )]
    pub article: String,
    /// Dialect that produced this record
    #[serde(skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub source: Option<Dialect>,
    /// When the record entered the system
    #[serde(skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub imported_at: Option<DateTime<Utc>>,
}

impl Bookmark {
    /// Creates a bookmark for `url` with a fresh identifier, stamped as
    /// imported now from `source`.
    pub fn new(url: impl Into<String>, source: Dialect) -> Self {
        Bookmark {
            url: url.into(),
            ..Bookmark::default()
        }
        .stamped(source)
    }

    /// Assigns a fresh identifier and the import provenance.
    pub fn stamped(mut self, source: Dialect) -> Self {
        self.id = Uuid::new_v4().to_string();
        self.source = Some(source);
        self.imported_at = Some(Utc::now());
        self
    }

    /// Derives `canonical_url` and normalizes every tag segment.
    ///
    /// # Errors
    ///
    /// Fails when the URL cannot be canonicalized; the record should then be
    /// discarded rather than added to a collection.
    pub fn canonicalize(&mut self) -> Result<()> {
        self.canonical_url = canonicalize_url(&self.url)?;
        normalize_tags(&mut self.tags);
        Ok(())
    }

    /// Whether any segment of any tag hierarchy matches `tag` after normalization.
    pub fn has_tag(&self, tag: &str) -> bool {
        let wanted = normalize_tag(tag);
        !wanted.is_empty() && self.tags.iter().flatten().any(|segment| *segment == wanted)
    }

    /// Tag hierarchies rendered as `parent/child` paths.
    pub fn tag_paths(&self) -> Vec<String> {
        self.tags.iter().map(|hierarchy| hierarchy.join("/")).collect()
    }
}

/// Converts seconds since the epoch to an instant.
///
/// Non-positive values mean "unknown".
pub(crate) fn timestamp_from_epoch_secs(secs: i64) -> Option<DateTime<Utc>> {
    if secs <= 0 {
        return None;
    }
    DateTime::from_timestamp(secs, 0)
}

fn nullable_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn nullable_strings<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

fn nullable_bool<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TagEntry {
    Path(Vec<String>),
    Single(String),
}

/// Accepts tag hierarchies as arrays of segments, tolerating bare strings
/// as one-level hierarchies.
fn lenient_tags<'de, D>(deserializer: D) -> std::result::Result<Vec<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries = Option::<Vec<TagEntry>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(entries
        .into_iter()
        .map(|entry| match entry {
            TagEntry::Path(path) => path,
            TagEntry::Single(tag) => vec![tag],
        })
        .collect())
}

/// Reads an ISO-8601 string (or epoch seconds); anything unreadable, and
/// the zero instant, become `None`.
fn lenient_timestamp<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    let parsed = match value {
        Some(serde_json::Value::String(text)) => parse_iso8601(&text),
        Some(serde_json::Value::Number(secs)) => secs.as_i64().and_then(timestamp_from_epoch_secs),
        _ => None,
    };
    Ok(parsed.filter(|instant| instant.timestamp() > 0))
}

fn parse_iso8601(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    DateTime::parse_from_rfc3339(text)
        .map(|instant| instant.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|naive| naive.and_utc())
        })
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
                .map(|naive| naive.and_utc())
        })
}

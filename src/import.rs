//! Dialect parsers.
//!
//! Each parser turns a classified byte stream into a [`Collection`]. Records
//! whose URL is empty or cannot be canonicalized are dropped; unreadable
//! timestamps become "unknown". Neither aborts the parse.
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use scraper::{ElementRef, Html};
use serde_json::Value;

use crate::{bookmark::timestamp_from_epoch_secs, detect, Bookmark, Collection, Dialect, Result};

/// Which anchor attributes an HTML dialect is trusted to carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct AnchorPolicy {
    tags: bool,
    add_date: bool,
    last_modified: bool,
}

fn anchor_policy(dialect: Dialect) -> AnchorPolicy {
    match dialect {
        Dialect::AnyboxHtml => AnchorPolicy {
            tags: true,
            add_date: true,
            last_modified: false,
        },
        Dialect::Firefox => AnchorPolicy {
            tags: false,
            add_date: true,
            last_modified: true,
        },
        Dialect::Safari | Dialect::AnyboxJson => AnchorPolicy {
            tags: false,
            add_date: false,
            last_modified: false,
        },
    }
}

/// Parses `bytes` as the given dialect.
///
/// # Errors
///
/// Fails only when a JSON dialect input is not a JSON array. HTML input
/// never fails as a whole; invalid UTF-8 is replaced and parsing goes on.
pub fn parse(dialect: Dialect, bytes: &[u8]) -> Result<Collection> {
    let (mut collection, dropped) = match dialect {
        Dialect::AnyboxJson => parse_anybox_json(bytes)?,
        html_dialect => parse_netscape_html(html_dialect, bytes),
    };
    collection.recompute_metadata();

    if dropped > 0 {
        warn!(
            "Dropped {} {} record(s) with missing or unusable URLs",
            dropped, dialect
        );
    }
    info!(
        "Imported {} bookmark(s) from {} export",
        collection.len(),
        dialect
    );
    Ok(collection)
}

/// Detects the dialect of `bytes` and parses it.
///
/// Returns `Ok(None)` when the format is not recognized.
pub fn detect_and_parse(bytes: &[u8]) -> Result<Option<(Dialect, Collection)>> {
    match detect(bytes) {
        Some(dialect) => Ok(Some((dialect, parse(dialect, bytes)?))),
        None => Ok(None),
    }
}

fn parse_anybox_json(bytes: &[u8]) -> Result<(Collection, usize)> {
    let elements: Vec<Value> = serde_json::from_slice(bytes)?;
    let mut collection = Collection::from_source(Dialect::AnyboxJson);
    let mut dropped = 0;

    for (position, element) in elements.into_iter().enumerate() {
        let mut bookmark = match serde_json::from_value::<Bookmark>(element) {
            Ok(bookmark) => bookmark.stamped(Dialect::AnyboxJson),
            Err(e) => {
                debug!("Skipping element {}: not a bookmark object: {}", position, e);
                dropped += 1;
                continue;
            }
        };

        if let Err(e) = bookmark.canonicalize() {
            debug!("Skipping element {}: {}", position, e);
            dropped += 1;
            continue;
        }

        collection.add(bookmark);
    }

    Ok((collection, dropped))
}

fn parse_netscape_html(dialect: Dialect, bytes: &[u8]) -> (Collection, usize) {
    let text = String::from_utf8_lossy(bytes);
    let document = Html::parse_document(&text);
    let policy = anchor_policy(dialect);

    let mut collection = Collection::from_source(dialect);
    let mut dropped = 0;

    let anchors = document
        .tree
        .root()
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|element| element.value().name() == "a");

    for anchor in anchors {
        match bookmark_from_anchor(anchor, dialect, policy) {
            Some(bookmark) => collection.add(bookmark),
            None => dropped += 1,
        }
    }

    (collection, dropped)
}

fn bookmark_from_anchor(
    anchor: ElementRef<'_>,
    dialect: Dialect,
    policy: AnchorPolicy,
) -> Option<Bookmark> {
    let element = anchor.value();
    let href = element.attr("href").map(str::trim).unwrap_or_default();
    if href.is_empty() {
        debug!("Skipping anchor without href");
        return None;
    }

    let mut bookmark = Bookmark::new(href, dialect);
    bookmark.title = anchor.text().collect::<String>().trim().to_string();

    if policy.add_date {
        bookmark.date_added = element.attr("add_date").and_then(epoch_attribute);
    }
    if policy.last_modified {
        bookmark.last_modified = element.attr("last_modified").and_then(epoch_attribute);
    }
    if policy.tags {
        if let Some(tags) = element.attr("tags") {
            bookmark.tags = split_tag_attribute(tags);
        }
    }

    if let Err(e) = bookmark.canonicalize() {
        debug!("Skipping anchor: {}", e);
        return None;
    }
    Some(bookmark)
}

/// Reads a seconds-since-epoch attribute; non-positive or garbage is unknown.
fn epoch_attribute(value: &str) -> Option<DateTime<Utc>> {
    value
        .trim()
        .parse::<i64>()
        .ok()
        .and_then(timestamp_from_epoch_secs)
}

/// Splits a comma-separated `tags` attribute into one-level hierarchies.
fn split_tag_attribute(value: &str) -> Vec<Vec<String>> {
    value
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(|tag| vec![tag.to_string()])
        .collect()
}

//! Unit tests for the dialect parsers.

use std::{fs, path::PathBuf};

use bookmerge::{detect_and_parse, parse, BookmarkError, Collection, Dialect};
use chrono::{DateTime, TimeZone, Utc};
use pretty_assertions::assert_eq;

fn fixture(name: &str) -> Vec<u8> {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name);
    fs::read(&path).unwrap_or_else(|e| panic!("fixture {}: {}", path.display(), e))
}

fn ymd(year: i32, month: u32, day: u32) -> Option<DateTime<Utc>> {
    Some(Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap())
}

fn canonical_urls(collection: &Collection) -> Vec<&str> {
    collection.iter().map(|b| b.canonical_url.as_str()).collect()
}

#[test]
fn anybox_json_carries_the_full_field_set() {
    let collection = parse(Dialect::AnyboxJson, &fixture("anybox.json")).unwrap();

    // The record with an empty URL is dropped.
    assert_eq!(
        canonical_urls(&collection),
        vec![
            "https://example.com/guide",
            "https://rust-lang.org/learn?a=1&b=2",
            "https://only-in-base.example.org",
        ]
    );

    let guide = &collection.bookmarks()[0];
    assert_eq!(guide.url, "https://Example.COM/guide/");
    assert_eq!(guide.title, "Example guide");
    assert_eq!(guide.description, "A guide");
    assert_eq!(
        guide.tags,
        vec![
            vec!["security".to_string(), "user-auth".to_string()],
            vec!["infrastructure".to_string()],
        ]
    );
    assert_eq!(guide.folder, vec!["BookmarksBar".to_string(), "Research".to_string()]);
    assert_eq!(guide.comment, "read later");
    assert_eq!(guide.keyword, "guide");
    assert!(guide.is_starred);
    assert_eq!(guide.date_added, ymd(2025, 1, 1));
    assert_eq!(guide.last_modified, ymd(2025, 2, 1));
    assert_eq!(guide.source, Some(Dialect::AnyboxJson));
    assert!(guide.imported_at.is_some());

    // Zero instant is "unknown".
    assert!(collection.bookmarks()[1].date_added.is_none());
}

#[test]
fn ids_are_fresh_and_unique() {
    let collection = parse(Dialect::AnyboxJson, &fixture("anybox.json")).unwrap();
    let ids: Vec<&str> = collection.iter().map(|b| b.id.as_str()).collect();

    assert!(ids.iter().all(|id| !id.is_empty() && *id != "ignored-on-import"));
    let mut unique = ids.clone();
    unique.sort_unstable();
    unique.dedup();
    assert_eq!(unique.len(), ids.len());
}

#[test]
fn anybox_json_metadata_is_computed() {
    let collection = parse(Dialect::AnyboxJson, &fixture("anybox.json")).unwrap();
    let metadata = collection.metadata();

    assert_eq!(metadata.source, Some(Dialect::AnyboxJson));
    assert_eq!(metadata.total_count, 3);
    assert_eq!(metadata.tag_count, 4);
    assert_eq!(metadata.folder_count, 2);
}

#[test]
fn malformed_json_elements_are_dropped_not_fatal() {
    let input = br#"[
        {"url": "https://a.com", "isStarred": true},
        {"url": "https://b.com", "isStarred": "yes"},
        "just a string",
        {"url": "http://exa mple.com"},
        {"url": "https://c.com", "dateAdded": "garbage"}
    ]"#;
    let collection = parse(Dialect::AnyboxJson, input).unwrap();

    assert_eq!(canonical_urls(&collection), vec!["https://a.com", "https://c.com"]);
    assert!(collection.bookmarks()[1].date_added.is_none());
}

#[test]
fn json_that_is_not_an_array_fails_the_file() {
    let err = parse(Dialect::AnyboxJson, br#"{"url": "https://a.com"}"#).unwrap_err();
    assert!(matches!(err, BookmarkError::Serialization(_)));
}

#[test]
fn firefox_reads_both_timestamps() {
    let collection = parse(Dialect::Firefox, &fixture("firefox.html")).unwrap();

    assert_eq!(
        canonical_urls(&collection),
        vec![
            "https://example.com/guide",
            "https://rust-lang.org/learn?a=1&b=2",
            "https://firefox-only.example.net/",
        ]
    );

    let guide = &collection.bookmarks()[0];
    assert_eq!(guide.date_added, ymd(2020, 1, 1));
    assert_eq!(guide.last_modified, ymd(2020, 2, 1));
    assert_eq!(guide.title, "Example guide");
    // Firefox tags are not trusted; no folder hierarchy either.
    assert!(guide.tags.is_empty());
    assert!(guide.folder.is_empty());
    assert_eq!(guide.source, Some(Dialect::Firefox));

    // Unparseable and zero timestamps are unknown.
    let learn = &collection.bookmarks()[1];
    assert!(learn.date_added.is_none());
    assert!(learn.last_modified.is_none());
}

#[test]
fn safari_reads_urls_only() {
    let collection = parse(Dialect::Safari, &fixture("safari.html")).unwrap();

    assert_eq!(
        canonical_urls(&collection),
        vec!["https://example.com/guide", "https://safari-only.example.com"]
    );
    assert!(collection
        .iter()
        .all(|b| b.date_added.is_none() && b.last_modified.is_none() && b.tags.is_empty()));
}

#[test]
fn anybox_html_reads_flat_tags_and_add_date() {
    let collection = parse(Dialect::AnyboxHtml, &fixture("anybox.html")).unwrap();
    assert_eq!(collection.len(), 2);

    let guide = &collection.bookmarks()[0];
    assert_eq!(
        guide.tags,
        vec![
            vec!["security".to_string()],
            vec!["dev-ops".to_string()],
            vec!["xml-parser".to_string()],
        ]
    );
    assert_eq!(guide.date_added, ymd(2010, 1, 1));

    // last_modified is not part of this dialect.
    assert!(collection.bookmarks()[1].last_modified.is_none());
}

#[test]
fn anchors_without_usable_urls_are_dropped() {
    let html = r#"<DL>
<DT><A HREF="https://good.example.com" ADD_DATE="1577836800">Good</A>
<DT><A>No href</A>
<DT><A HREF="   ">Blank</A>
<DT><A HREF="http://bad host.example.com" ADD_DATE="1577836800">Bad</A>
</DL>"#;
    let collection = parse(Dialect::Firefox, html.as_bytes()).unwrap();

    assert_eq!(canonical_urls(&collection), vec!["https://good.example.com"]);
}

#[test]
fn stray_latin1_bytes_do_not_lose_the_file() {
    let html: &[u8] = b"<!DOCTYPE NETSCAPE-Bookmark-file-1>\n<H1>Bookmarks</H1><DL>\
<DT><A HREF=\"https://a.com\">\xe9t\xe9</A>\
<DT><A HREF=\"https://b.com/x/\">plain</A></DL>";

    let (dialect, collection) = detect_and_parse(html)
        .unwrap()
        .expect("Netscape skeleton is recognized");

    assert_eq!(dialect, Dialect::Safari);
    assert_eq!(canonical_urls(&collection), vec!["https://a.com", "https://b.com/x"]);
    assert_eq!(collection.bookmarks()[0].title, "\u{fffd}t\u{fffd}");
}

#[test]
fn detect_and_parse_reports_unknown_as_none() {
    assert!(detect_and_parse(b"hello world").unwrap().is_none());

    let (dialect, collection) = detect_and_parse(&fixture("safari.html"))
        .unwrap()
        .expect("safari fixture is recognized");
    assert_eq!(dialect, Dialect::Safari);
    assert_eq!(collection.len(), 2);
}

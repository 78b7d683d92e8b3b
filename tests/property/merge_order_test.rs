//! Property-based tests for the merge engine.
//!
//! For any base and any sources, the merged copy keeps every base record
//! and ends up holding the earliest known timestamp per URL, whatever
//! order the sources arrive in.

use bookmerge::{merge_collections, Bookmark, Collection, Dialect};
use chrono::{DateTime, TimeZone, Utc};
use proptest::prelude::*;

const URLS: [&str; 6] = [
    "https://a.example.com/one",
    "https://b.example.com/two",
    "https://c.example.com",
    "https://d.example.com/four?x=1",
    "https://e.example.com/five",
    "https://f.example.com/six",
];

/// Strategy for an optional timestamp between 2000 and 2030.
fn arb_timestamp() -> impl Strategy<Value = Option<DateTime<Utc>>> {
    proptest::option::of((946_684_800i64..1_893_456_000).prop_map(|secs| {
        Utc.timestamp_opt(secs, 0)
            .single()
            .expect("in-range timestamp")
    }))
}

/// Strategy for a collection over a subset of `URLS`.
fn arb_collection(dialect: Dialect) -> impl Strategy<Value = Collection> {
    proptest::collection::vec(
        (0..URLS.len(), arb_timestamp(), arb_timestamp()),
        0..URLS.len(),
    )
    .prop_map(move |entries| {
        let mut collection = Collection::from_source(dialect);
        for (index, date_added, last_modified) in entries {
            let mut bookmark = Bookmark::new(URLS[index], dialect);
            bookmark.date_added = date_added;
            bookmark.last_modified = last_modified;
            bookmark.canonicalize().expect("fixed URLs are valid");
            collection.add(bookmark);
        }
        collection
    })
}

fn earliest<'a>(
    values: impl Iterator<Item = &'a Option<DateTime<Utc>>>,
) -> Option<DateTime<Utc>> {
    values.flatten().min().copied()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn merge_keeps_base_and_takes_earliest_timestamps(
        base in arb_collection(Dialect::AnyboxJson),
        sources in proptest::collection::vec(arb_collection(Dialect::Firefox), 0..4),
    ) {
        let outcome = merge_collections(&base, &sources).unwrap();

        prop_assert_eq!(outcome.collection.len(), base.len());
        prop_assert!(outcome.enhanced <= base.len());

        for (before, after) in base.iter().zip(outcome.collection.iter()) {
            prop_assert_eq!(&after.id, &before.id);
            prop_assert_eq!(&after.canonical_url, &before.canonical_url);

            // Only the first base record for a URL is a merge target.
            let first = base.find_by_canonical_url(&before.canonical_url).unwrap();
            if first.id != before.id {
                prop_assert_eq!(after, before);
                continue;
            }

            let matching: Vec<&Bookmark> = sources
                .iter()
                .flat_map(|s| s.iter())
                .filter(|b| b.canonical_url == before.canonical_url)
                .collect();
            let added = std::iter::once(&before.date_added)
                .chain(matching.iter().map(|b| &b.date_added));
            let modified = std::iter::once(&before.last_modified)
                .chain(matching.iter().map(|b| &b.last_modified));

            prop_assert_eq!(after.date_added, earliest(added));
            prop_assert_eq!(after.last_modified, earliest(modified));
        }
    }

    #[test]
    fn source_order_does_not_change_the_result(
        base in arb_collection(Dialect::AnyboxJson),
        sources in proptest::collection::vec(arb_collection(Dialect::Safari), 1..4),
    ) {
        let mut reversed = sources.clone();
        reversed.reverse();

        let forward = merge_collections(&base, &sources).unwrap();
        let backward = merge_collections(&base, &reversed).unwrap();

        prop_assert_eq!(forward.collection.bookmarks(), backward.collection.bookmarks());
        prop_assert_eq!(forward.enhanced, backward.enhanced);
        prop_assert_eq!(forward.unmatched, backward.unmatched);
    }
}

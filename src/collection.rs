//! An ordered set of bookmarks with a first-occurrence URL index.
use std::{
    cell::OnceCell,
    collections::{HashMap, HashSet},
};

use chrono::{DateTime, Utc};
use log::trace;
use serde::{Deserialize, Serialize};

use crate::{Bookmark, Dialect};

/// Format version stamped on every collection.
pub const COLLECTION_VERSION: &str = "1.0";

/// Collection-level information, recomputed by full scan
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionMetadata {
    /// Dialect the collection was imported from
    pub source: Option<Dialect>,
    /// When the collection was imported
    pub imported_at: Option<DateTime<Utc>>,
    /// Number of records, duplicates included
    pub total_count: usize,
    /// Distinct tag segments across all hierarchy levels
    pub tag_count: usize,
    /// Distinct folder segments across all paths
    pub folder_count: usize,
}

/// A collection of bookmarks in insertion order.
///
/// Records sharing a canonical URL are all kept in sequence, but lookups
/// resolve to the earliest one added. The URL index is derived: it is
/// built lazily on first lookup and dropped whenever records are mutated
/// outside [`Collection::add`].
#[derive(Debug, Clone)]
pub struct Collection {
    version: String,
    updated: DateTime<Utc>,
    bookmarks: Vec<Bookmark>,
    metadata: CollectionMetadata,
    /// canonical URL → position of the first record with that URL
    url_index: OnceCell<HashMap<String, usize>>,
}

impl Default for Collection {
    fn default() -> Self {
        Self::new()
    }
}

impl Collection {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self {
            version: COLLECTION_VERSION.to_string(),
            updated: Utc::now(),
            bookmarks: Vec::new(),
            metadata: CollectionMetadata::default(),
            url_index: OnceCell::new(),
        }
    }

    /// Creates an empty collection recording where its records come from.
    pub fn from_source(source: Dialect) -> Self {
        let mut collection = Self::new();
        collection.metadata.source = Some(source);
        collection.metadata.imported_at = Some(Utc::now());
        collection
    }

    /// Builds a collection by adding each record in order.
    pub fn from_bookmarks(bookmarks: impl IntoIterator<Item = Bookmark>) -> Self {
        let mut collection = Self::new();
        for bookmark in bookmarks {
            collection.add(bookmark);
        }
        collection.recompute_metadata();
        collection
    }

    /// Appends a record, registering it as the lookup target for its
    /// canonical URL unless an earlier record already holds that URL.
    pub fn add(&mut self, bookmark: Bookmark) {
        let position = self.bookmarks.len();
        if let Some(index) = self.url_index.get_mut() {
            if !bookmark.canonical_url.is_empty() {
                index
                    .entry(bookmark.canonical_url.clone())
                    .or_insert(position);
            }
        }
        self.bookmarks.push(bookmark);
        self.updated = Utc::now();
    }

    /// Looks up the first-added record with the given canonical URL.
    pub fn find_by_canonical_url(&self, canonical_url: &str) -> Option<&Bookmark> {
        let position = self.position_by_canonical_url(canonical_url)?;
        self.bookmarks.get(position)
    }

    /// Mutable lookup of the first-added record with the given canonical URL.
    ///
    /// Callers must not change `canonical_url` through the returned reference.
    pub fn find_by_canonical_url_mut(&mut self, canonical_url: &str) -> Option<&mut Bookmark> {
        let position = self.position_by_canonical_url(canonical_url)?;
        self.bookmarks.get_mut(position)
    }

    /// Mutable access by position, keeping the URL index.
    ///
    /// Callers must not change `canonical_url` through the returned reference.
    pub fn get_mut(&mut self, position: usize) -> Option<&mut Bookmark> {
        self.bookmarks.get_mut(position)
    }

    /// Position of the first-added record with the given canonical URL.
    ///
    /// Positions identify records even when ids are missing or repeated.
    pub fn position_by_canonical_url(&self, canonical_url: &str) -> Option<usize> {
        self.index().get(canonical_url).copied()
    }

    fn index(&self) -> &HashMap<String, usize> {
        self.url_index.get_or_init(|| {
            trace!("Building URL index over {} bookmarks", self.bookmarks.len());
            let mut index = HashMap::with_capacity(self.bookmarks.len());
            for (position, bookmark) in self.bookmarks.iter().enumerate() {
                if !bookmark.canonical_url.is_empty() {
                    index
                        .entry(bookmark.canonical_url.clone())
                        .or_insert(position);
                }
            }
            index
        })
    }

    /// Records in insertion order.
    pub fn bookmarks(&self) -> &[Bookmark] {
        &self.bookmarks
    }

    /// Direct mutable access to the records. Invalidates the URL index.
    pub fn bookmarks_mut(&mut self) -> &mut Vec<Bookmark> {
        self.url_index = OnceCell::new();
        self.updated = Utc::now();
        &mut self.bookmarks
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Bookmark> {
        self.bookmarks.iter()
    }

    pub fn len(&self) -> usize {
        self.bookmarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bookmarks.is_empty()
    }

    pub fn into_bookmarks(self) -> Vec<Bookmark> {
        self.bookmarks
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Last time records were added or mutated.
    pub fn updated(&self) -> DateTime<Utc> {
        self.updated
    }

    /// Metadata as of the last [`Collection::recompute_metadata`].
    pub fn metadata(&self) -> &CollectionMetadata {
        &self.metadata
    }

    /// Recalculates counts by rescanning every record.
    pub fn recompute_metadata(&mut self) {
        let mut tags = HashSet::new();
        let mut folders = HashSet::new();

        for bookmark in &self.bookmarks {
            tags.extend(bookmark.tags.iter().flatten().map(String::as_str));
            folders.extend(bookmark.folder.iter().map(String::as_str));
        }

        self.metadata.total_count = self.bookmarks.len();
        self.metadata.tag_count = tags.len();
        self.metadata.folder_count = folders.len();
        self.updated = Utc::now();
    }
}

impl<'a> IntoIterator for &'a Collection {
    type Item = &'a Bookmark;
    type IntoIter = std::slice::Iter<'a, Bookmark>;

    fn into_iter(self) -> Self::IntoIter {
        self.bookmarks.iter()
    }
}

//! Base-centric merge.
//!
//! The base collection is authoritative: the merge never adds, removes or
//! reorders records. Sources only contribute older `date_added` and
//! `last_modified` values for URLs the base already has. A URL found only
//! in a source is treated as deliberately excluded from the base and is
//! skipped.
use std::collections::HashSet;

use chrono::{DateTime, Utc};
use log::{debug, info};

use crate::{Bookmark, BookmarkError, Collection, Result};

/// Result of a merge
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    /// The enriched copy of the base
    pub collection: Collection,
    /// Distinct base records whose timestamps changed
    pub enhanced: usize,
    /// Source records with no base record sharing their canonical URL
    pub unmatched: usize,
}

/// Combines one base collection with any number of sources.
#[derive(Debug, Default)]
pub struct Merger<'a> {
    base: Option<&'a Collection>,
    sources: Vec<&'a Collection>,
}

impl<'a> Merger<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the authoritative collection.
    pub fn base(mut self, base: &'a Collection) -> Self {
        self.base = Some(base);
        self
    }

    /// Appends a source. Sources are processed in the order added.
    pub fn source(mut self, source: &'a Collection) -> Self {
        self.sources.push(source);
        self
    }

    /// Appends several sources in iteration order.
    pub fn sources(mut self, sources: impl IntoIterator<Item = &'a Collection>) -> Self {
        self.sources.extend(sources);
        self
    }

    /// Runs the merge against a deep copy of the base.
    ///
    /// # Errors
    ///
    /// Returns [`BookmarkError::MissingCollection`] if no base was set.
    pub fn merge(&self) -> Result<MergeOutcome> {
        let base = self
            .base
            .ok_or(BookmarkError::MissingCollection { role: "base" })?;

        let mut result = base.clone();
        let mut enhanced_positions = HashSet::new();
        let mut unmatched = 0;

        for (source_position, source) in self.sources.iter().enumerate() {
            debug!(
                "Merging source {} ({} bookmarks)",
                source_position,
                source.len()
            );
            for source_bookmark in source.iter() {
                // Each comparison reads the base value as left by earlier sources.
                let Some(position) =
                    result.position_by_canonical_url(&source_bookmark.canonical_url)
                else {
                    unmatched += 1;
                    continue;
                };
                if let Some(base_bookmark) = result.get_mut(position) {
                    if enhance_timestamps(base_bookmark, source_bookmark) {
                        enhanced_positions.insert(position);
                    }
                }
            }
        }

        result.recompute_metadata();

        info!(
            "Merged {} source(s) into {} base bookmark(s): {} enhanced, {} source bookmark(s) not in base",
            self.sources.len(),
            result.len(),
            enhanced_positions.len(),
            unmatched
        );

        Ok(MergeOutcome {
            collection: result,
            enhanced: enhanced_positions.len(),
            unmatched,
        })
    }
}

/// Convenience wrapper for [`Merger`].
pub fn merge_collections(base: &Collection, sources: &[Collection]) -> Result<MergeOutcome> {
    Merger::new().base(base).sources(sources).merge()
}

/// Copies older timestamps from `source` onto `base`.
///
/// Returns whether either field changed.
pub fn enhance_timestamps(base: &mut Bookmark, source: &Bookmark) -> bool {
    let added = adopt_earlier(&mut base.date_added, source.date_added);
    let modified = adopt_earlier(&mut base.last_modified, source.last_modified);
    added || modified
}

/// Takes `candidate` when it is known and the current value is unknown or later.
fn adopt_earlier(current: &mut Option<DateTime<Utc>>, candidate: Option<DateTime<Utc>>) -> bool {
    let Some(candidate) = candidate else {
        return false;
    };
    match *current {
        Some(existing) if existing <= candidate => false,
        _ => {
            *current = Some(candidate);
            true
        }
    }
}

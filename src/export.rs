//! JSON export and pre-export validation.
//!
//! Output is always a bare JSON array of bookmark objects, the Anybox JSON
//! layout, so every export can be fed back in as an import.
use std::{
    fmt,
    io::{BufWriter, Write},
    path::Path,
};

use log::{debug, error, info, trace};
use tempfile::NamedTempFile;

use crate::{Bookmark, BookmarkError, Collection, Result};

/// Writes the collection's records to `writer` as a JSON array.
pub fn write_json<W: Write>(mut writer: W, collection: &Collection, pretty: bool) -> Result<()> {
    trace!("Serializing {} bookmarks to JSON", collection.len());
    if pretty {
        serde_json::to_writer_pretty(&mut writer, collection.bookmarks())?;
    } else {
        serde_json::to_writer(&mut writer, collection.bookmarks())?;
    }
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

/// Serializes the collection's records to a JSON string.
pub fn to_json_string(collection: &Collection, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(collection.bookmarks())?
    } else {
        serde_json::to_string(collection.bookmarks())?
    };
    Ok(json)
}

/// Writes the collection to `path`, replacing any existing file atomically.
pub fn export_to_file(path: &Path, collection: &Collection, pretty: bool) -> Result<()> {
    info!("Exporting {} bookmarks to {}", collection.len(), path.display());

    let report = validate_collection(collection);
    if !report.is_valid() {
        for issue in &report.issues {
            debug!("Export validation: {}", issue);
        }
        info!(
            "Exporting with {} validation issue(s); run `validate` for details",
            report.issues.len()
        );
    }

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let temp_file = NamedTempFile::new_in(dir).map_err(|e| {
        error!("Failed to create temporary file in {}: {}", dir.display(), e);
        BookmarkError::Io(e)
    })?;

    write_json(BufWriter::new(temp_file.as_file()), collection, pretty)?;

    temp_file.persist(path).map_err(|e| {
        error!("Failed to persist file {}: {}", path.display(), e.error);
        BookmarkError::Io(e.error)
    })?;

    debug!("Export written to {}", path.display());
    Ok(())
}

/// A single problem found while validating a collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// Offending record, empty for collection-level issues
    pub bookmark_id: String,
    /// Field path such as `url` or `tags[1][0]`
    pub field: String,
    pub message: String,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.bookmark_id.is_empty() {
            write!(f, "{} - {}", self.field, self.message)
        } else {
            write!(
                f,
                "bookmark {}: {} - {}",
                self.bookmark_id, self.field, self.message
            )
        }
    }
}

/// Outcome of validating a collection for export
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }

    /// Converts a failing report into [`BookmarkError::ValidationFailed`].
    pub fn into_result(self) -> Result<()> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(BookmarkError::ValidationFailed {
                count: self.issues.len(),
            })
        }
    }
}

/// Checks whether every record in the collection is fit to export.
pub fn validate_collection(collection: &Collection) -> ValidationReport {
    let issues = collection.iter().flat_map(validate_bookmark).collect();
    ValidationReport { issues }
}

/// Checks a single record.
pub fn validate_bookmark(bookmark: &Bookmark) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    let mut issue = |field: String, message: &str| {
        issues.push(ValidationIssue {
            bookmark_id: bookmark.id.clone(),
            field,
            message: message.to_string(),
        })
    };

    if bookmark.url.is_empty() {
        issue("url".into(), "URL is required");
    } else {
        if !bookmark.url.starts_with("http://") && !bookmark.url.starts_with("https://") {
            issue("url".into(), "URL must start with http:// or https://");
        }
        if bookmark.canonical_url.is_empty() {
            issue(
                "canonicalUrl".into(),
                "canonical URL is missing (URL canonicalization required)",
            );
        }
    }

    for (i, hierarchy) in bookmark.tags.iter().enumerate() {
        if hierarchy.is_empty() {
            issue(format!("tags[{i}]"), "tag group is empty");
        }
        for (j, tag) in hierarchy.iter().enumerate() {
            if tag.trim().is_empty() {
                issue(format!("tags[{i}][{j}]"), "tag value is empty");
            }
        }
    }

    for (i, segment) in bookmark.folder.iter().enumerate() {
        if segment.trim().is_empty() {
            issue(format!("folder[{i}]"), "folder segment is empty");
        }
    }

    issues
}

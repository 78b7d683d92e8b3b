use std::{
    fs,
    path::{Path, PathBuf},
};

use directories::BaseDirs;
use log::{debug, error, trace};

use crate::{import, BookmarkError, Collection, Dialect, Result};

/// Expands a leading `~/` to the user's home directory.
pub fn expand_home(path: &Path) -> PathBuf {
    if let Ok(rest) = path.strip_prefix("~") {
        if let Some(dirs) = BaseDirs::new() {
            return dirs.home_dir().join(rest);
        }
    }
    path.to_path_buf()
}

/// Reads a whole file, mapping a missing file to [`BookmarkError::FileNotFound`].
pub fn read_file(path: &Path) -> Result<Vec<u8>> {
    trace!("Reading {}", path.display());
    fs::read(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            BookmarkError::FileNotFound {
                file_path: path.display().to_string(),
            }
        } else {
            error!("Failed to read {}: {}", path.display(), e);
            BookmarkError::Io(e)
        }
    })
}

/// Loads and parses a bookmark file of any supported dialect.
///
/// An unrecognized file is an error here: the caller asked for this file
/// specifically. Directory scans use [`crate::FileDiscovery`] instead, which
/// skips such files.
pub fn load_collection_from_file(path: &Path) -> Result<(Dialect, Collection)> {
    debug!("Loading collection from file: {}", path.display());
    let bytes = read_file(path)?;
    import::detect_and_parse(&bytes)?.ok_or_else(|| BookmarkError::UnrecognizedFormat {
        path: path.to_path_buf(),
    })
}

// Helper method for parsing tags
pub fn parse_tags(tags: Option<String>) -> Vec<String> {
    tags.map(|t| {
        t.split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    })
    .unwrap_or_default()
}

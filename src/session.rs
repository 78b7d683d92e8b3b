//! Persisted working state: the file being worked on and a history of merges.
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use log::{debug, error, info, trace};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::{BookmarkError, Result};

/// One completed merge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergeRecord {
    /// Collection used as the base
    pub base_file: PathBuf,
    /// Collections merged into it, in processing order
    pub source_files: Vec<PathBuf>,
    pub date: DateTime<Utc>,
    /// Number of base bookmarks whose timestamps were updated
    pub enhanced: usize,
}

/// Current working state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Session {
    pub working_dir: Option<PathBuf>,
    /// Collection currently being worked on
    pub current_file: Option<PathBuf>,
    pub last_modified: Option<DateTime<Utc>>,
    pub merge_history: Vec<MergeRecord>,
}

impl Session {
    /// Appends a merge to the history, dated now.
    pub fn add_merge_record(
        &mut self,
        base_file: PathBuf,
        source_files: Vec<PathBuf>,
        enhanced: usize,
    ) {
        self.merge_history.push(MergeRecord {
            base_file,
            source_files,
            date: Utc::now(),
            enhanced,
        });
    }

    /// Most recent merge, if any.
    pub fn last_merge(&self) -> Option<&MergeRecord> {
        self.merge_history.last()
    }
}

/// Reads and writes the session file.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the session. A missing file is `Ok(None)`.
    pub fn load(&self) -> Result<Option<Session>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No session file at {}", self.path.display());
                return Ok(None);
            }
            Err(e) => {
                error!("Failed to read session file {}: {}", self.path.display(), e);
                return Err(BookmarkError::Io(e));
            }
        };

        let session = serde_json::from_str(&content).map_err(|e| {
            error!("Failed to parse session file {}: {}", self.path.display(), e);
            BookmarkError::Serialization(e)
        })?;

        trace!("Loaded session from {}", self.path.display());
        Ok(Some(session))
    }

    /// Saves the session atomically, stamping `last_modified`.
    pub fn save(&self, session: &mut Session) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        if !dir.exists() {
            debug!("Creating session directory: {}", dir.display());
            fs::create_dir_all(&dir).map_err(|e| {
                error!("Failed to create directory {}: {}", dir.display(), e);
                BookmarkError::DirectoryError { path: dir.clone() }
            })?;
        }

        session.last_modified = Some(Utc::now());
        let json = serde_json::to_string_pretty(session)?;

        let mut temp_file = NamedTempFile::new_in(&dir)?;
        temp_file.write_all(json.as_bytes())?;
        temp_file.flush()?;
        temp_file.persist(&self.path).map_err(|e| {
            error!("Failed to persist file {}: {}", self.path.display(), e.error);
            BookmarkError::Io(e.error)
        })?;

        info!("Session saved to {}", self.path.display());
        Ok(())
    }

    /// Removes the session file. Removing a missing file is not an error.
    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                info!("Session cleared: {}", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(BookmarkError::Io(e)),
        }
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }
}

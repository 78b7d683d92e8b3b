//! Finding bookmark exports on disk.
//!
//! Files are classified by content. A file that cannot be read or whose
//! format is not recognized is recorded as skipped and the scan moves on.
use std::path::{Path, PathBuf};

use globset::GlobSet;
use log::{debug, info, warn};
use walkdir::WalkDir;

use crate::{detect, expand_home, read_file, BookmarkError, Config, Dialect, Result};

/// A bookmark file whose dialect was recognized
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredFile {
    pub path: PathBuf,
    pub dialect: Dialect,
}

/// Summary of a discovery pass
#[derive(Debug, Clone, Default)]
pub struct DiscoveryReport {
    /// Recognized files, in file-name order
    pub files: Vec<DiscoveredFile>,
    /// Files that were considered but skipped, with the reason
    pub skipped: Vec<(PathBuf, String)>,
}

impl DiscoveryReport {
    /// Recognized files of one dialect.
    pub fn of_dialect(&self, dialect: Dialect) -> impl Iterator<Item = &DiscoveredFile> {
        self.files.iter().filter(move |f| f.dialect == dialect)
    }
}

/// Reads a file and classifies its content.
///
/// `Ok(None)` means the file was read but matches no known dialect.
pub fn classify_file(path: &Path) -> Result<Option<Dialect>> {
    let bytes = read_file(path)?;
    Ok(detect(&bytes))
}

/// Scans paths for bookmark exports.
pub struct FileDiscovery {
    matcher: GlobSet,
    max_depth: usize,
}

impl FileDiscovery {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            matcher: config.scan_matcher()?,
            max_depth: config.scan_depth.max(1),
        })
    }

    /// Classifies a single file, or every matching file under a directory.
    ///
    /// # Errors
    ///
    /// Only a missing `path` is an error; per-file problems end up in
    /// [`DiscoveryReport::skipped`].
    pub fn discover(&self, path: &Path) -> Result<DiscoveryReport> {
        let path = expand_home(path);
        if !path.exists() {
            return Err(BookmarkError::FileNotFound {
                file_path: path.display().to_string(),
            });
        }

        let mut report = DiscoveryReport::default();

        if path.is_dir() {
            self.scan_directory(&path, &mut report);
        } else {
            classify_into(&path, &mut report);
        }

        info!(
            "Discovered {} bookmark file(s) under {} ({} skipped)",
            report.files.len(),
            path.display(),
            report.skipped.len()
        );
        Ok(report)
    }

    fn scan_directory(&self, dir: &Path, report: &mut DiscoveryReport) {
        debug!("Scanning {} (depth {})", dir.display(), self.max_depth);

        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(self.max_depth)
            .sort_by_file_name()
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable directory entry: {}", e);
                    let skipped_path = e.path().map(Path::to_path_buf).unwrap_or_default();
                    report.skipped.push((skipped_path, e.to_string()));
                    continue;
                }
            };

            if !entry.file_type().is_file() || !self.matcher.is_match(entry.file_name()) {
                continue;
            }

            classify_into(entry.path(), report);
        }
    }
}

fn classify_into(path: &Path, report: &mut DiscoveryReport) {
    match classify_file(path) {
        Ok(Some(dialect)) => {
            debug!("{} is a {} export", path.display(), dialect);
            report.files.push(DiscoveredFile {
                path: path.to_path_buf(),
                dialect,
            });
        }
        Ok(None) => {
            warn!("Skipping {}: unrecognized bookmark format", path.display());
            report
                .skipped
                .push((path.to_path_buf(), "unrecognized bookmark format".to_string()));
        }
        Err(e) => {
            warn!("Skipping {}: {}", path.display(), e);
            report.skipped.push((path.to_path_buf(), e.to_string()));
        }
    }
}

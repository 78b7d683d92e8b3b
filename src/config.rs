use std::{
    fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use globset::{Glob, GlobSet, GlobSetBuilder};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::{BookmarkError, Result};

/// File name of the configuration inside the platform config directory.
pub const CONFIG_FILE_NAME: &str = "config.json";

/// File name of the persisted session inside `data_dir`.
pub const SESSION_FILE_NAME: &str = "session.json";

/// Application configuration settings.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Directory holding the session file
    pub data_dir: PathBuf,

    /// Pretty-print exported JSON unless overridden on the command line
    pub pretty_output: bool,

    /// Glob patterns (matched against file names) a directory scan considers
    pub scan_patterns: Vec<String>,

    /// How deep a directory scan descends; 1 means the directory's own entries
    pub scan_depth: usize,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = project_dirs()
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from(".bookmerge"));

        Self {
            data_dir,
            pretty_output: true,
            scan_patterns: vec!["*.json".into(), "*.html".into(), "*.htm".into()],
            scan_depth: 1,
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("io", "bookmerge", "bookmerge")
}

impl Config {
    /// Default location of the configuration file, if the platform has one.
    pub fn default_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    /// Loads configuration from `path`, or from [`Config::default_path`].
    ///
    /// A missing file yields defaults; a file that exists but does not parse
    /// is a [`BookmarkError::ConfigError`].
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match Self::default_path() {
                Some(p) => p,
                None => {
                    debug!("No platform config directory, using defaults");
                    return Ok(Self::default());
                }
            },
        };

        if !path.exists() {
            debug!("Config file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)?;
        let config: Config =
            serde_json::from_str(&content).map_err(|e| BookmarkError::ConfigError {
                message: format!("Failed to parse {}: {}", path.display(), e),
            })?;

        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Path of the persisted session file.
    pub fn session_file(&self) -> PathBuf {
        self.data_dir.join(SESSION_FILE_NAME)
    }

    /// Compiles `scan_patterns` into a matcher.
    pub fn scan_matcher(&self) -> Result<GlobSet> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &self.scan_patterns {
            builder.add(Glob::new(pattern)?);
        }
        Ok(builder.build()?)
    }
}

//! Shared result alias and the command-line surface.
use std::path::PathBuf;

use clap::Subcommand;

use crate::BookmarkError;

/// A specialized Result type for bookmerge operations.
pub type Result<T> = std::result::Result<T, BookmarkError>;

/// Available subcommands for the bookmerge application
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Detect the format of bookmark files, or of every export in a directory
    Detect {
        /// Files or directories to inspect
        #[clap(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Import a bookmark export and write it as Anybox JSON
    Import {
        /// Bookmark export to import
        file: PathBuf,

        /// Write to this file instead of stdout
        #[clap(short, long)]
        output: Option<PathBuf>,
    },

    /// Enrich a base collection with older timestamps from other exports
    Merge {
        /// Authoritative collection; no bookmarks are added to or removed from it
        #[clap(short, long)]
        base: PathBuf,

        /// Export (or directory of exports) to take timestamps from; repeatable
        #[clap(short, long = "source", required = true)]
        sources: Vec<PathBuf>,

        /// Write to this file instead of stdout
        #[clap(short, long)]
        output: Option<PathBuf>,
    },

    /// List bookmarks from an export
    List {
        /// Bookmark export to read
        file: PathBuf,

        /// Only show bookmarks carrying these tags (comma-separated)
        #[clap(short, long)]
        tag: Option<String>,

        /// Limit the number of bookmarks shown
        #[clap(short = 'n', long, default_value_t = 20)]
        limit: usize,

        /// Format output as JSON
        #[clap(short, long)]
        json: bool,
    },

    /// Check a collection for problems that would make its export unusable
    Validate {
        /// Bookmark export to check
        file: PathBuf,
    },

    /// Show the saved session and merge history
    Session {
        /// Remove the saved session instead of showing it
        #[clap(short, long)]
        clear: bool,
    },
}

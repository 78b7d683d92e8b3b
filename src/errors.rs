//! Error types for the bookmerge application.
//!
//! This module defines the error type shared by importing, merging,
//! exporting and session persistence. Per-record problems (a bad URL, an
//! unreadable timestamp) never reach this type; they are absorbed where
//! they occur and the record is dropped or defaulted.

use std::{io, path::PathBuf};

use thiserror::Error;

/// The main error type for the bookmerge application.
#[derive(Error, Debug)]
pub enum BookmarkError {
    /// Errors related to file I/O operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Errors related to serialization/deserialization operations.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A scan pattern from the configuration could not be compiled.
    #[error("Invalid scan pattern: {0}")]
    Pattern(#[from] globset::Error),

    /// A URL could not be parsed into a canonical form.
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// File content did not match any known bookmark dialect.
    #[error("Unrecognized bookmark format: {path}")]
    UnrecognizedFormat { path: PathBuf },

    /// A collection required by the operation was not supplied.
    #[error("Missing {role} collection")]
    MissingCollection { role: &'static str },

    /// Errors related to configuration.
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// Directory creation or access failed.
    #[error("Failed to create or access directory: {path}")]
    DirectoryError { path: PathBuf },

    /// file not found
    #[error("File not found: {file_path}")]
    FileNotFound { file_path: String },

    /// Pre-export validation reported problems.
    #[error("Validation failed with {count} issue(s)")]
    ValidationFailed { count: usize },

    /// Generic application error with a custom message.
    #[error("{message}")]
    ApplicationError { message: String },
}

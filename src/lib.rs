//! Bookmark import and reconciliation library
//!
//! This library reads bookmark exports from several tools, canonicalizes
//! their URLs and tags, and merges them into a single base collection by
//! carrying over the oldest known timestamps.

mod bookmark;
mod cli;
mod collection;
mod config;
mod detect;
mod discovery;
mod errors;
mod export;
mod helper;
mod import;
mod merge;
mod normalize;
mod session;
mod types;

// Re-export key components
pub use bookmark::*;
pub use cli::*;
pub use collection::*;
pub use config::*;
pub use detect::*;
pub use discovery::*;
pub use errors::*;
pub use export::*;
pub use helper::*;
pub use import::{detect_and_parse, parse};
pub use merge::*;
pub use normalize::*;
pub use session::*;
pub use types::*;

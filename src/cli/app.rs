//! CLI module for the bookmerge application
//!
//! This module turns parsed commands into calls on the import, merge and
//! export pipeline and prints the results.
use std::{
    fs,
    io::stdout,
    path::{Path, PathBuf},
};

use log::{debug, info, warn};

use crate::{
    export_to_file, load_collection_from_file, merge_collections, parse_tags, BookmarkError,
    validate_collection, write_json, Bookmark, Collection, Commands, Config, FileDiscovery,
    Result, SessionStore,
};

/// CLI Application handler - processes CLI commands against the bookmark pipeline
pub struct App {
    /// Application configuration
    config: Config,

    /// Whether to display verbose output
    verbose: bool,

    /// Whether JSON output is pretty-printed
    pretty: bool,
}

impl App {
    /// Create a new CLI application with the given config
    pub fn new(config: Config, verbose: bool, pretty: bool) -> Self {
        Self {
            config,
            verbose,
            pretty,
        }
    }

    /// Run the CLI application with the given command
    pub fn run(&self, command: Commands) -> Result<()> {
        match command {
            Commands::Detect { paths } => self.handle_detect(&paths)?,

            Commands::Import { file, output } => self.handle_import(&file, output.as_deref())?,

            Commands::Merge {
                base,
                sources,
                output,
            } => self.handle_merge(&base, &sources, output)?,

            Commands::List {
                file,
                tag,
                limit,
                json,
            } => self.handle_list(&file, tag, limit, json)?,

            Commands::Validate { file } => self.handle_validate(&file)?,

            Commands::Session { clear } => self.handle_session(clear)?,
        }

        Ok(())
    }

    fn handle_detect(&self, paths: &[PathBuf]) -> Result<()> {
        let discovery = FileDiscovery::new(&self.config)?;

        for path in paths {
            let report = discovery.discover(path)?;
            for file in &report.files {
                println!("{:<12} {}", file.dialect.label(), file.path.display());
            }
            for (skipped, reason) in &report.skipped {
                println!(
                    "{:<12} {} ({})",
                    console::style("unknown").yellow(),
                    skipped.display(),
                    reason
                );
            }
        }

        Ok(())
    }

    fn handle_import(&self, file: &Path, output: Option<&Path>) -> Result<()> {
        let (dialect, collection) = load_collection_from_file(file)?;
        self.write_output(&collection, output)?;

        eprintln!(
            "Imported {} bookmark{} from {} export {}",
            collection.len(),
            plural(collection.len()),
            dialect,
            file.display()
        );
        Ok(())
    }

    fn handle_merge(
        &self,
        base: &Path,
        sources: &[PathBuf],
        output: Option<PathBuf>,
    ) -> Result<()> {
        let (base_dialect, base_collection) = load_collection_from_file(base)?;
        info!("Base {} is a {} export", base.display(), base_dialect);

        let source_files = self.resolve_sources(base, sources)?;
        let mut source_collections = Vec::with_capacity(source_files.len());
        for path in &source_files {
            let (dialect, collection) = load_collection_from_file(path)?;
            debug!("Source {} is a {} export", path.display(), dialect);
            source_collections.push(collection);
        }

        let outcome = merge_collections(&base_collection, &source_collections)?;
        self.write_output(&outcome.collection, output.as_deref())?;

        eprintln!(
            "Merged {} source{} into {} bookmark{}: {} enhanced",
            source_files.len(),
            plural(source_files.len()),
            outcome.collection.len(),
            plural(outcome.collection.len()),
            outcome.enhanced
        );
        if self.verbose && outcome.unmatched > 0 {
            eprintln!(
                "{} source bookmark{} not present in the base were skipped",
                outcome.unmatched,
                plural(outcome.unmatched)
            );
        }

        // The merge result is already written; a session failure only loses history.
        if let Err(e) = self.record_merge(base, source_files, output, outcome.enhanced) {
            warn!("Failed to record merge in session: {}", e);
        }

        Ok(())
    }

    /// Expands directory sources into the recognized exports inside them,
    /// leaving out the base file itself.
    fn resolve_sources(&self, base: &Path, sources: &[PathBuf]) -> Result<Vec<PathBuf>> {
        let base_identity = fs::canonicalize(base).unwrap_or_else(|_| base.to_path_buf());
        let discovery = FileDiscovery::new(&self.config)?;
        let mut resolved = Vec::new();

        for source in sources {
            if !source.is_dir() {
                resolved.push(source.clone());
                continue;
            }

            let report = discovery.discover(source)?;
            for file in report.files {
                let identity = fs::canonicalize(&file.path).unwrap_or_else(|_| file.path.clone());
                if identity != base_identity {
                    resolved.push(file.path);
                }
            }
        }

        if resolved.is_empty() {
            return Err(BookmarkError::ApplicationError {
                message: "no source exports found to merge".to_string(),
            });
        }

        Ok(resolved)
    }

    fn record_merge(
        &self,
        base: &Path,
        sources: Vec<PathBuf>,
        output: Option<PathBuf>,
        enhanced: usize,
    ) -> Result<()> {
        let store = SessionStore::new(self.config.session_file());
        let mut session = store.load()?.unwrap_or_default();

        session.working_dir = base.parent().map(Path::to_path_buf);
        session.current_file = Some(output.unwrap_or_else(|| base.to_path_buf()));
        session.add_merge_record(base.to_path_buf(), sources, enhanced);

        store.save(&mut session)
    }

    fn handle_list(
        &self,
        file: &Path,
        tag: Option<String>,
        limit: usize,
        json: bool,
    ) -> Result<()> {
        let (_, collection) = load_collection_from_file(file)?;
        let wanted = parse_tags(tag);

        let matching: Vec<&Bookmark> = collection
            .iter()
            .filter(|bookmark| wanted.iter().all(|t| bookmark.has_tag(t)))
            .take(limit)
            .collect();

        if json {
            println!("{}", serde_json::to_string_pretty(&matching)?);
            return Ok(());
        }

        if matching.is_empty() {
            println!("No bookmarks found matching the criteria.");
            return Ok(());
        }

        self.display_bookmarks_text(&matching);
        println!(
            "\nShowing {} of {} bookmark{}",
            matching.len(),
            collection.len(),
            plural(collection.len())
        );
        Ok(())
    }

    /// Display bookmarks in text format
    fn display_bookmarks_text(&self, bookmarks: &[&Bookmark]) {
        let term_width = terminal_size::terminal_size()
            .map(|(w, _)| w.0 as usize)
            .unwrap_or(80);

        for (i, bookmark) in bookmarks.iter().enumerate() {
            if i > 0 {
                println!("{}", "-".repeat(term_width.min(50)));
            }

            let title = if bookmark.title.is_empty() {
                bookmark.url.as_str()
            } else {
                bookmark.title.as_str()
            };
            let star = if bookmark.is_starred { " *" } else { "" };
            println!("{}{}", console::style(title).bold(), star);
            println!("{}", bookmark.url);

            if let Some(added) = bookmark.date_added {
                println!("Added: {}", added.format("%Y-%m-%d %H:%M"));
            }
            if !bookmark.folder.is_empty() {
                println!("Folder: {}", bookmark.folder.join(" / "));
            }
            if !bookmark.tags.is_empty() {
                let tags = bookmark
                    .tag_paths()
                    .iter()
                    .map(|tag| format!("#{}", tag))
                    .collect::<Vec<_>>()
                    .join(" ");
                println!("Tags: {}", console::style(tags).cyan());
            }
        }
    }

    fn handle_validate(&self, file: &Path) -> Result<()> {
        let (_, collection) = load_collection_from_file(file)?;
        let report = validate_collection(&collection);

        if report.is_valid() {
            println!(
                "{} {} bookmark{} ready to export",
                console::style("OK").green(),
                collection.len(),
                plural(collection.len())
            );
            return Ok(());
        }

        for issue in &report.issues {
            println!("{}", issue);
        }
        report.into_result()
    }

    fn handle_session(&self, clear: bool) -> Result<()> {
        let store = SessionStore::new(self.config.session_file());

        if clear {
            store.clear()?;
            println!("Session cleared.");
            return Ok(());
        }

        let Some(session) = store.load()? else {
            println!("No saved session at {}", store.path().display());
            return Ok(());
        };

        if let Some(dir) = &session.working_dir {
            println!("Working dir:   {}", dir.display());
        }
        if let Some(file) = &session.current_file {
            println!("Current file:  {}", file.display());
        }
        if let Some(modified) = session.last_modified {
            println!("Last modified: {}", modified.format("%Y-%m-%d %H:%M:%S"));
        }
        println!("Merge history: {} record(s)", session.merge_history.len());

        for (i, record) in session.merge_history.iter().enumerate() {
            println!("\n  Merge {}:", i + 1);
            println!("    Base:     {}", record.base_file.display());
            for source in &record.source_files {
                println!("    Source:   {}", source.display());
            }
            println!("    Enhanced: {}", record.enhanced);
            println!("    Date:     {}", record.date.format("%Y-%m-%d %H:%M:%S"));
        }

        Ok(())
    }

    fn write_output(&self, collection: &Collection, output: Option<&Path>) -> Result<()> {
        match output {
            Some(path) => export_to_file(path, collection, self.pretty),
            None => write_json(stdout().lock(), collection, self.pretty),
        }
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

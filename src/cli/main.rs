use std::path::PathBuf;

use clap::Parser;

use crate::Commands;

/// Main CLI application arguments and command structure
#[derive(Parser, Debug)]
#[clap(
    name = "bookmerge",
    version,
    about = "Import bookmark exports and reconcile them against a base collection"
)]
pub struct Cli {
    /// Path to the configuration file
    #[clap(short = 'c', long, value_parser)]
    pub config: Option<PathBuf>,

    /// Directory holding the session file
    #[clap(long, value_parser)]
    pub data_dir: Option<PathBuf>,

    /// Pretty-print JSON output
    #[clap(long, conflicts_with = "compact")]
    pub pretty: bool,

    /// Write JSON output on a single line
    #[clap(long)]
    pub compact: bool,

    /// Verbose output mode
    #[clap(short, long)]
    pub verbose: bool,

    /// Subcommands for the bookmerge application
    #[clap(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Resolves the pretty-printing choice, flags first, then configuration.
    pub fn pretty_output(&self, configured: bool) -> bool {
        if self.pretty {
            true
        } else if self.compact {
            false
        } else {
            configured
        }
    }
}

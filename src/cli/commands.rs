//! CLI command definitions using clap.
//!
//! Defines the main CLI structure and subcommands:
//! - import: load a term file into the store
//! - schedule: allocate and persist study sessions for a term
//! - sessions: show a term's persisted sessions
//! - terms: list imported terms
//! - solve: run the engine on a term file without touching the store

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// studyplan - allocate study sessions across an academic term
#[derive(Parser, Debug)]
#[command(name = "studyplan")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Database path (overrides the config file)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// Main subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Import a term (YAML or JSON) into the store, replacing any previous copy
    Import {
        /// Path to the term file
        file: PathBuf,
    },

    /// Allocate study sessions for an imported term and persist them
    Schedule {
        /// Term ID to schedule
        term_id: String,

        /// Compute and print without replacing persisted sessions
        #[arg(short = 'n', long)]
        dry_run: bool,
    },

    /// Show the persisted study sessions of a term
    Sessions {
        /// Term ID to show
        term_id: String,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// List imported terms
    Terms,

    /// Run the allocator on a term file directly, without the store
    Solve {
        /// Path to the term file
        file: PathBuf,

        /// Print the full outcome as JSON
        #[arg(long)]
        json: bool,
    },
}

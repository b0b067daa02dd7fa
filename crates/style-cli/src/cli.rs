//! CLI argument parsing using clap derive

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use style_core::CatalogSection;

/// Style Sync - Edit style rule filters through a spreadsheet
#[derive(Parser, Debug)]
#[command(name = "stylesync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file (defaults to ./stylesync.toml when present)
    #[arg(short, long, global = true, env = "STYLESYNC_CONFIG")]
    pub config: Option<PathBuf>,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Write the snapshot table joining catalog records to style rules
    ///
    /// Examples:
    ///   stylesync extract
    ///   stylesync extract --section point -o points.csv
    Extract {
        /// Style rule file to scan
        #[arg(long)]
        rules: Option<PathBuf>,

        /// Catalog (TYP source) file
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Snapshot file to write
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Catalog section to extract (line, point or polygon)
        #[arg(long)]
        section: Option<CatalogSection>,

        /// Do not record rule checksums in the snapshot
        #[arg(long)]
        no_checksums: bool,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Apply filter edits from the edited snapshot to the rule file
    ///
    /// Examples:
    ///   stylesync apply --dry-run
    ///   stylesync apply --edited my-edits.csv
    Apply {
        /// Style rule file to patch
        #[arg(long)]
        rules: Option<PathBuf>,

        /// Snapshot written by extract
        #[arg(long)]
        baseline: Option<PathBuf>,

        /// Edited copy of the snapshot
        #[arg(long)]
        edited: Option<PathBuf>,

        /// Show the diff without writing or backing up anything
        #[arg(long)]
        dry_run: bool,

        /// Apply edits even if a rule changed since extraction
        #[arg(long)]
        no_checksums: bool,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },
}

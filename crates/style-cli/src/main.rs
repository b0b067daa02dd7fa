//! Style Sync CLI
//!
//! Round-trips the filters of a style rule file through a CSV snapshot.

mod cli;
mod commands;
mod error;

use clap::Parser;
use colored::Colorize;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use cli::{Cli, Commands};
use error::Result;
use style_core::StyleSyncConfig;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // Setup tracing if verbose
    if cli.verbose {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .with_target(true)
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
            .expect("Failed to set tracing subscriber");
        tracing::debug!("Verbose mode enabled");
    }

    match cli.command {
        Some(cmd) => {
            let cwd = std::env::current_dir()?;
            let config = StyleSyncConfig::load(cli.config.as_deref(), &cwd)?;
            execute_command(cmd, config)
        }
        None => {
            println!("{} Style Sync CLI", "stylesync".green().bold());
            println!();
            println!("Run {} for available commands.", "stylesync --help".cyan());
            Ok(())
        }
    }
}

fn execute_command(cmd: Commands, mut config: StyleSyncConfig) -> Result<()> {
    match cmd {
        Commands::Extract {
            rules,
            catalog,
            output,
            section,
            no_checksums,
            json,
        } => {
            if let Some(rules) = rules {
                config.rule_file = rules;
            }
            if let Some(catalog) = catalog {
                config.catalog_file = catalog;
            }
            if let Some(output) = output {
                config.snapshot = output;
            }
            if let Some(section) = section {
                config.catalog = section.config();
            }
            if no_checksums {
                config.rules.track_checksums = false;
            }
            commands::run_extract(&config, json)
        }
        Commands::Apply {
            rules,
            baseline,
            edited,
            dry_run,
            no_checksums,
            json,
        } => {
            if let Some(rules) = rules {
                config.rule_file = rules;
            }
            if let Some(baseline) = baseline {
                config.snapshot = baseline;
            }
            if let Some(edited) = edited {
                config.edited_snapshot = edited;
            }
            if no_checksums {
                config.rules.track_checksums = false;
            }
            commands::run_apply(&config, dry_run, json)
        }
    }
}

//! Extract command implementation
//!
//! Joins catalog records to style rules and writes the snapshot table.

use colored::Colorize;

use style_core::{StyleSyncConfig, extract};

use super::print_diagnostics;
use crate::error::Result;

/// Run the extract command
pub fn run_extract(config: &StyleSyncConfig, json: bool) -> Result<()> {
    if !json {
        println!(
            "{} Parsing {} and {}...",
            "=>".blue().bold(),
            config.catalog_file.display().to_string().cyan(),
            config.rule_file.display().to_string().cyan()
        );
    }

    let report = extract(config)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "   Found {} {} entries",
        report.records,
        config.catalog.start_marker
    );
    println!("   Found {} type codes with filters", report.type_codes);
    println!();
    println!(
        "{} Wrote {}",
        "OK".green().bold(),
        report.snapshot.display().to_string().yellow()
    );
    println!("   Total rows: {}", report.rows);
    println!("   Rows with matching filters: {}", report.matched_rows);
    println!("   Rows without matching filters: {}", report.unmatched_rows);

    print_diagnostics("Warnings:", &report.diagnostics);
    Ok(())
}

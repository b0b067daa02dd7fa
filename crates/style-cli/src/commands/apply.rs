//! Apply command implementation
//!
//! Diffs the edited snapshot against the baseline and patches the rule file,
//! or previews the patch as a unified diff with `--dry-run`.

use colored::Colorize;
use serde_json::json;
use similar::{ChangeTag, TextDiff};

use style_core::{Resolution, StyleSyncConfig, apply, dry_run, plan};

use super::print_diagnostics;
use crate::error::{CliError, Result};

/// Run the apply command
pub fn run_apply(config: &StyleSyncConfig, preview_only: bool, json: bool) -> Result<()> {
    for (label, path) in [
        ("Baseline snapshot", &config.snapshot),
        ("Edited snapshot", &config.edited_snapshot),
    ] {
        if !path.exists() {
            return Err(CliError::user(format!(
                "{} not found: {} (run 'stylesync extract' and edit a copy of the snapshot)",
                label,
                path.display()
            )));
        }
    }

    let resolution = plan(config)?;

    if resolution.is_empty() {
        if json {
            let output = json!({
                "has_changes": false,
                "diagnostics": resolution.diagnostics,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!("{} No changes found", "OK".green().bold());
            print_diagnostics("Rows ignored:", &resolution.diagnostics);
        }
        return Ok(());
    }

    if preview_only {
        return run_dry_run(config, &resolution, json);
    }

    let report = apply(config, &resolution)?;

    if json {
        let output = json!({
            "has_changes": true,
            "dry_run": false,
            "resolution": resolution,
            "report": report,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    print_plan(&resolution);
    for applied in &report.outcome.applied {
        println!(
            "  {} lines {}-{} ({}): {} -> {}",
            "~".yellow(),
            applied.start_line,
            applied.end_line,
            applied.type_code.cyan(),
            applied.replaced.red(),
            applied.new_filter.green()
        );
    }
    for line in &report.outcome.added {
        println!("  {} {}", "+".green(), line.green());
    }
    print_diagnostics("Skipped:", &report.outcome.diagnostics);

    println!();
    println!("{}", "Summary:".bold());
    println!("  Total changes to apply: {}", resolution.changes.len());
    println!("  Changes applied: {}", report.outcome.applied.len());
    println!("  Changes skipped: {}", report.outcome.skipped());
    println!("  New rules added: {}", report.outcome.added.len());
    println!("  Lines modified: {}", report.outcome.modified_lines.len());
    println!(
        "  Backup created: {}",
        report.backup.display().to_string().yellow()
    );

    Ok(())
}

fn run_dry_run(config: &StyleSyncConfig, resolution: &Resolution, json: bool) -> Result<()> {
    let preview = dry_run(config, resolution)?;
    let rule_file = config.rule_file.display().to_string();
    let diff = TextDiff::from_lines(&preview.before, &preview.after);

    if json {
        let output = json!({
            "has_changes": preview.before != preview.after,
            "dry_run": true,
            "resolution": resolution,
            "outcome": preview.outcome,
            "diff": diff
                .unified_diff()
                .context_radius(2)
                .header(&rule_file, &rule_file)
                .to_string(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    print_plan(resolution);
    print_diagnostics("Would skip:", &preview.outcome.diagnostics);
    println!();
    println!(
        "{} {} {}",
        "Diff".blue().bold(),
        rule_file.yellow(),
        "(dry run)".dimmed()
    );

    for group in diff.grouped_ops(2) {
        for op in &group {
            for change in diff.iter_changes(op) {
                let text = change.value().trim_end_matches(['\r', '\n']);
                match change.tag() {
                    ChangeTag::Delete => println!("{}", format!("-{}", text).red()),
                    ChangeTag::Insert => println!("{}", format!("+{}", text).green()),
                    ChangeTag::Equal => println!(" {}", text.dimmed()),
                }
            }
        }
        println!("{}", "...".dimmed());
    }

    println!();
    println!("Run {} to apply these changes.", "stylesync apply".cyan());
    Ok(())
}

fn print_plan(resolution: &Resolution) {
    println!(
        "{} Found {} changes and {} new rules",
        "=>".blue().bold(),
        resolution.changes.len(),
        resolution.new_rules.len()
    );
    print_diagnostics("Rows ignored:", &resolution.diagnostics);
    println!();
}

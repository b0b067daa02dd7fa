//! The apply workflow: baseline + edited snapshot -> patched rule file.

use crate::config::StyleSyncConfig;
use crate::resolver::{Resolution, resolve};
use crate::snapshot::read_snapshot;
use crate::Result;
use std::path::Path;
use style_blocks::{ApplyReport, Preview, apply_to_file, preview};

/// Reads both snapshots and resolves the edits between them.
///
/// Rows rejected while reading either snapshot are carried as diagnostics
/// of the resolution. Recorded checksums are dropped when
/// `rules.track_checksums` is off.
pub fn plan(config: &StyleSyncConfig) -> Result<Resolution> {
    plan_from(&config.snapshot, &config.edited_snapshot, config.rules.track_checksums)
}

pub fn plan_from(baseline: &Path, edited: &Path, track_checksums: bool) -> Result<Resolution> {
    tracing::info!(
        baseline = %baseline.display(),
        edited = %edited.display(),
        "comparing snapshots"
    );
    let baseline = read_snapshot(baseline)?;
    let edited = read_snapshot(edited)?;

    let mut resolution = resolve(&baseline.rows, &edited.rows);
    if !track_checksums {
        resolution = resolution.without_checksums();
    }

    let mut diagnostics = baseline.diagnostics;
    diagnostics.extend(edited.diagnostics);
    diagnostics.append(&mut resolution.diagnostics);
    resolution.diagnostics = diagnostics;

    Ok(resolution)
}

/// Patches the configured rule file. A backup is always written first.
pub fn apply(config: &StyleSyncConfig, resolution: &Resolution) -> Result<ApplyReport> {
    let report = apply_to_file(
        &config.rule_file,
        &resolution.change_list(),
        &resolution.new_rules,
        &config.rules.patch_options(),
    )?;
    tracing::info!(
        applied = report.outcome.applied.len(),
        skipped = report.outcome.skipped(),
        added = report.outcome.added.len(),
        backup = %report.backup.display(),
        "applied snapshot edits"
    );
    Ok(report)
}

/// Patches the configured rule file in memory only.
pub fn dry_run(config: &StyleSyncConfig, resolution: &Resolution) -> Result<Preview> {
    Ok(preview(
        &config.rule_file,
        &resolution.change_list(),
        &resolution.new_rules,
        &config.rules.patch_options(),
    )?)
}

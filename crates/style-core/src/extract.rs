//! The extract workflow: rule file + catalog -> snapshot.

use crate::catalog::{CatalogExtractor, CatalogScan};
use crate::config::StyleSyncConfig;
use crate::matcher::{MatchRow, match_records};
use crate::snapshot::write_snapshot;
use crate::Result;
use serde::Serialize;
use std::path::PathBuf;
use style_blocks::{Diagnostic, RuleIndex, scan};
use style_fs::io;

/// Rows built from a rule file and a catalog, before they are written.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub rows: Vec<MatchRow>,
    pub index: RuleIndex,
    pub catalog: CatalogScan,
    /// Rule file diagnostics.
    pub diagnostics: Vec<Diagnostic>,
}

impl Extraction {
    /// Scans both texts and joins them. Nothing is read from disk.
    pub fn build(rule_text: &str, catalog_text: &str, extractor: &CatalogExtractor) -> Self {
        let rule_lines: Vec<&str> = rule_text.lines().collect();
        let scanned = scan(&rule_lines);
        let index = RuleIndex::from_scan(&scanned);

        let catalog_lines: Vec<&str> = catalog_text.lines().collect();
        let catalog = extractor.extract(&catalog_lines);
        let rows = match_records(&catalog.records, &index);

        Self {
            rows,
            index,
            catalog,
            diagnostics: scanned.diagnostics,
        }
    }

    pub fn matched_rows(&self) -> usize {
        self.rows.iter().filter(|row| !row.is_unmatched()).count()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ExtractReport {
    pub snapshot: PathBuf,
    /// Catalog records found.
    pub records: usize,
    /// Distinct type codes with at least one rule.
    pub type_codes: usize,
    pub rules: usize,
    pub rows: usize,
    pub matched_rows: usize,
    pub unmatched_rows: usize,
    pub diagnostics: Vec<Diagnostic>,
}

/// Reads the configured rule and catalog files and writes the snapshot.
pub fn extract(config: &StyleSyncConfig) -> Result<ExtractReport> {
    tracing::info!(
        rules = %config.rule_file.display(),
        catalog = %config.catalog_file.display(),
        "extracting snapshot"
    );

    let rule_text = io::read_text(&config.rule_file)?;
    let catalog_text = io::read_text(&config.catalog_file)?;
    let extraction = Extraction::build(
        &rule_text,
        &catalog_text,
        &CatalogExtractor::new(&config.catalog),
    );

    write_snapshot(&config.snapshot, &extraction.rows, config.rules.track_checksums)?;

    let matched_rows = extraction.matched_rows();
    let mut diagnostics = extraction.diagnostics;
    diagnostics.extend(extraction.catalog.diagnostics);

    Ok(ExtractReport {
        snapshot: config.snapshot.clone(),
        records: extraction.catalog.records.len(),
        type_codes: extraction.index.type_count(),
        rules: extraction.index.rule_count(),
        rows: extraction.rows.len(),
        matched_rows,
        unmatched_rows: extraction.rows.len() - matched_rows,
        diagnostics,
    })
}

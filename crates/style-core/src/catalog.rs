//! Catalog record extraction.
//!
//! A catalog (TYP source) file holds records such as:
//! ```text
//! [_line]
//! Type=0x01
//! String1=0x04,Motorway
//! [end]
//! ```

use crate::config::CatalogConfig;
use regex::Regex;
use std::sync::LazyLock;
use style_blocks::{Diagnostic, DiagnosticKind};

/// Value used for keys a record does not carry.
pub const MISSING_VALUE: &str = "N/A";

static TYPE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Type=(\S+)").expect("Invalid type regex"));

static NAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"String1=0x04,([^\n]+)").expect("Invalid name regex"));

/// One sentinel-delimited catalog entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogRecord {
    pub type_code: String,
    pub display_name: String,
    /// The 1-based line of the start sentinel.
    pub source_line: usize,
    /// The record text including both sentinels.
    pub full_entry: String,
}

#[derive(Debug, Clone, Default)]
pub struct CatalogScan {
    pub records: Vec<CatalogRecord>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Extracts records bounded by a start and an end sentinel line.
#[derive(Debug, Clone)]
pub struct CatalogExtractor {
    start_marker: String,
    end_marker: String,
}

impl Default for CatalogExtractor {
    fn default() -> Self {
        Self::new(&CatalogConfig::default())
    }
}

impl CatalogExtractor {
    pub fn new(config: &CatalogConfig) -> Self {
        Self {
            start_marker: config.start_marker.trim().to_string(),
            end_marker: config.end_marker.trim().to_string(),
        }
    }

    /// Extracts every complete record, in file order.
    ///
    /// A start sentinel without a matching end sentinel yields nothing.
    pub fn extract<S: AsRef<str>>(&self, lines: &[S]) -> CatalogScan {
        let mut scan = CatalogScan::default();
        let mut idx = 0;

        while idx < lines.len() {
            if lines[idx].as_ref().trim() != self.start_marker {
                idx += 1;
                continue;
            }

            let end = lines[idx + 1..]
                .iter()
                .position(|line| line.as_ref().trim() == self.end_marker)
                .map(|offset| idx + 1 + offset);

            match end {
                Some(end) => {
                    let body: Vec<&str> = lines[idx + 1..end]
                        .iter()
                        .map(|line| line.as_ref().trim_end())
                        .collect();
                    scan.records
                        .push(self.build_record(&body.join("\n"), idx + 1, &mut scan.diagnostics));
                    idx = end + 1;
                }
                None => {
                    tracing::debug!(line = idx + 1, "dropping catalog record without end marker");
                    idx += 1;
                }
            }
        }

        tracing::debug!(records = scan.records.len(), "extracted catalog records");
        scan
    }

    fn build_record(
        &self,
        body: &str,
        source_line: usize,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> CatalogRecord {
        let mut field = |regex: &Regex, key: &str| match regex.captures(body).and_then(|c| c.get(1)) {
            Some(m) => m.as_str().to_string(),
            None => {
                diagnostics.push(Diagnostic::at(
                    DiagnosticKind::MissingKey,
                    source_line,
                    format!("record has no {} entry", key),
                ));
                MISSING_VALUE.to_string()
            }
        };

        let type_code = field(&*TYPE_REGEX, "Type");
        let display_name = field(&*NAME_REGEX, "String1");

        CatalogRecord {
            type_code,
            display_name,
            source_line,
            full_entry: format!("{}\n{}\n{}", self.start_marker, body, self.end_marker),
        }
    }
}

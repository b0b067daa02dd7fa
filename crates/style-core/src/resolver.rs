//! Change resolution between a baseline and an edited snapshot.

use crate::matcher::{MatchRow, NO_MATCH};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use style_blocks::{Change, Diagnostic, DiagnosticKind, NewRule};

/// Edits found between two snapshots.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Resolution {
    /// Changes keyed by the 1-based rule start line.
    pub changes: BTreeMap<usize, Change>,
    pub new_rules: Vec<NewRule>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Resolution {
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty() && self.new_rules.is_empty()
    }

    pub fn change_list(&self) -> Vec<Change> {
        self.changes.values().cloned().collect()
    }

    /// Drops the recorded block checksums so edits apply regardless of
    /// changes made to the rule file after extraction.
    pub fn without_checksums(mut self) -> Self {
        for change in self.changes.values_mut() {
            change.expected_checksum = None;
        }
        self
    }
}

type RowKey<'a> = (&'a str, &'a str, usize, Option<usize>, usize);

/// Keys rows by type code, display name, catalog line and rule line, plus
/// the position of the row among rows sharing all four.
///
/// The rule line keeps the rows of a record matching several rules apart
/// however the edited table was sorted. The position only separates rows
/// that are identical in every key column.
fn keyed(rows: &[MatchRow]) -> impl Iterator<Item = (RowKey<'_>, &MatchRow)> {
    let mut seen: HashMap<(&str, &str, usize, Option<usize>), usize> = HashMap::new();
    rows.iter().map(move |row| {
        let base = (
            row.type_code.as_str(),
            row.display_name.as_str(),
            row.source_line,
            row.rule_start_line,
        );
        let occurrence = seen.entry(base).or_insert(0);
        let key = (base.0, base.1, base.2, base.3, *occurrence);
        *occurrence += 1;
        (key, row)
    })
}

/// Compares every edited row with its baseline row.
///
/// Edited rows with no baseline counterpart are compared against the
/// sentinel. Baseline rows missing from the edited snapshot are ignored.
pub fn resolve(baseline: &[MatchRow], edited: &[MatchRow]) -> Resolution {
    let baseline: HashMap<RowKey<'_>, &MatchRow> = keyed(baseline).collect();
    let mut resolution = Resolution::default();

    for (key, row) in keyed(edited) {
        let original = baseline.get(&key).copied();
        let old_filter = original.map_or(NO_MATCH, |r| r.filter_text.as_str());
        let new_filter = row.filter_text.trim();

        if new_filter == NO_MATCH || new_filter.is_empty() || old_filter.trim() == new_filter {
            continue;
        }

        let checksum = original
            .and_then(|r| r.rule_checksum.clone())
            .or_else(|| row.rule_checksum.clone());

        match row.rule_start_line {
            Some(line) => {
                tracing::debug!(line, type_code = %row.type_code, "filter edited");
                let change = Change {
                    line,
                    type_code: row.type_code.clone(),
                    display_name: row.display_name.clone(),
                    old_filter: old_filter.to_string(),
                    new_filter: new_filter.to_string(),
                    expected_checksum: checksum,
                };
                if resolution.changes.insert(line, change).is_some() {
                    tracing::warn!(line, "several rows edit the same rule; the last one wins");
                }
            }
            None if old_filter == NO_MATCH => {
                tracing::debug!(type_code = %row.type_code, "new rule requested");
                resolution.new_rules.push(NewRule {
                    type_code: row.type_code.clone(),
                    display_name: row.display_name.clone(),
                    new_filter: new_filter.to_string(),
                });
            }
            None => {
                resolution.diagnostics.push(Diagnostic::at(
                    DiagnosticKind::InvalidRow,
                    row.source_line,
                    format!(
                        "filter of {} '{}' changed but the row has no rule line",
                        row.type_code, row.display_name
                    ),
                ));
            }
        }
    }

    tracing::info!(
        changes = resolution.changes.len(),
        new_rules = resolution.new_rules.len(),
        "resolved snapshot edits"
    );
    resolution
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn row(type_code: &str, source_line: usize, filter: &str, rule_line: Option<usize>) -> MatchRow {
        MatchRow {
            type_code: type_code.into(),
            display_name: format!("Name {}", type_code),
            source_line,
            filter_text: filter.into(),
            rule_start_line: rule_line,
            full_entry: String::new(),
            rule_checksum: rule_line.map(|l| format!("sha256:{}", l)),
        }
    }

    #[test]
    fn test_unchanged_rows_yield_nothing() {
        let rows = vec![row("0x01", 4, "a=b", Some(5)), row("0x02", 9, NO_MATCH, None)];
        let resolution = resolve(&rows, &rows);
        assert!(resolution.is_empty());
        assert!(resolution.diagnostics.is_empty());
    }

    #[test]
    fn test_edited_filter_becomes_change() {
        let baseline = vec![row("0x01", 4, "FILTER_A", Some(5))];
        let edited = vec![row("0x01", 4, "FILTER_B", Some(5))];

        let resolution = resolve(&baseline, &edited);

        let change = &resolution.changes[&5];
        assert_eq!(change.old_filter, "FILTER_A");
        assert_eq!(change.new_filter, "FILTER_B");
        assert_eq!(change.expected_checksum.as_deref(), Some("sha256:5"));
    }

    #[test]
    fn test_filled_sentinel_without_rule_line_becomes_new_rule() {
        let baseline = vec![row("0x02", 9, NO_MATCH, None)];
        let edited = vec![row("0x02", 9, "FILTER_C", None)];

        let resolution = resolve(&baseline, &edited);

        assert!(resolution.changes.is_empty());
        assert_eq!(
            resolution.new_rules,
            vec![NewRule {
                type_code: "0x02".into(),
                display_name: "Name 0x02".into(),
                new_filter: "FILTER_C".into(),
            }]
        );
    }

    #[test]
    fn test_filled_sentinel_with_rule_line_keeps_sentinel_as_old_filter() {
        let baseline = vec![row("0x03", 12, NO_MATCH, None)];
        let edited = vec![row("0x03", 12, "x=y", Some(20))];

        let resolution = resolve(&baseline, &edited);

        assert_eq!(resolution.changes[&20].old_filter, NO_MATCH);
        assert!(resolution.new_rules.is_empty());
    }

    #[test]
    fn test_rows_sharing_a_catalog_key_pair_in_order() {
        let baseline = vec![
            row("0x01", 4, "a=b", Some(5)),
            row("0x01", 4, "c=d", Some(8)),
        ];
        let edited = vec![
            row("0x01", 4, "a=b", Some(5)),
            row("0x01", 4, "c=e", Some(8)),
        ];

        let resolution = resolve(&baseline, &edited);

        assert_eq!(resolution.changes.len(), 1);
        assert_eq!(resolution.changes[&8].old_filter, "c=d");
    }

    #[test]
    fn test_reordered_rows_pair_by_rule_line() {
        let motorway = |rule_line| MatchRow {
            display_name: "Motorway".into(),
            ..row("0x01", 4, "", Some(rule_line))
        };
        let baseline = vec![
            MatchRow { filter_text: "highway=motorway".into(), ..motorway(4) },
            MatchRow { filter_text: "highway=motorway_link".into(), ..motorway(5) },
        ];
        let edited: Vec<MatchRow> = baseline.iter().rev().cloned().collect();

        let resolution = resolve(&baseline, &edited);

        assert!(resolution.is_empty());
        assert!(resolution.diagnostics.is_empty());
    }

    #[test]
    fn test_reordered_rows_keep_their_own_edit() {
        let baseline = vec![
            row("0x01", 4, "highway=motorway", Some(4)),
            row("0x01", 4, "highway=motorway_link", Some(5)),
        ];
        let edited = vec![
            row("0x01", 4, "highway=motorway_link & oneway=yes", Some(5)),
            row("0x01", 4, "highway=motorway", Some(4)),
        ];

        let resolution = resolve(&baseline, &edited);

        assert_eq!(resolution.changes.len(), 1);
        assert_eq!(resolution.changes[&5].old_filter, "highway=motorway_link");
    }

    #[test]
    fn test_edit_without_rule_line_is_reported() {
        let baseline = vec![row("0x01", 4, "a=b", None)];
        let edited = vec![row("0x01", 4, "c=d", None)];

        let resolution = resolve(&baseline, &edited);

        assert!(resolution.is_empty());
        assert_eq!(resolution.diagnostics[0].kind, DiagnosticKind::InvalidRow);
        assert_eq!(resolution.diagnostics[0].line, Some(4));
    }

    #[test]
    fn test_later_row_for_same_line_wins() {
        let baseline = vec![row("0x01", 4, "a=b", Some(5)), row("0x05", 7, "a=b", Some(5))];
        let edited = vec![row("0x01", 4, "first", Some(5)), row("0x05", 7, "second", Some(5))];

        let resolution = resolve(&baseline, &edited);

        assert_eq!(resolution.changes.len(), 1);
        assert_eq!(resolution.changes[&5].new_filter, "second");
    }

    #[test]
    fn test_without_checksums_clears_expectations() {
        let baseline = vec![row("0x01", 4, "a=b", Some(5))];
        let edited = vec![row("0x01", 4, "c=d", Some(5))];

        let resolution = resolve(&baseline, &edited).without_checksums();

        assert_eq!(resolution.changes[&5].expected_checksum, None);
    }
}

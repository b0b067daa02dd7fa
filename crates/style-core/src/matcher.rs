//! Joining catalog records to style rules by type code.

use crate::catalog::CatalogRecord;
use style_blocks::RuleIndex;

/// Filter value of a row whose type code has no style rule.
pub const NO_MATCH: &str = "No matching filters found";

/// One row of the tabular snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRow {
    pub type_code: String,
    pub display_name: String,
    /// The 1-based catalog line of the record.
    pub source_line: usize,
    /// Filter text of the matched rule, or [`NO_MATCH`].
    pub filter_text: String,
    /// The 1-based start line of the matched rule block.
    pub rule_start_line: Option<usize>,
    pub full_entry: String,
    /// Checksum of the matched rule block, when tracked.
    pub rule_checksum: Option<String>,
}

impl MatchRow {
    /// Returns `true` if no rule was found for this row.
    pub fn is_unmatched(&self) -> bool {
        self.filter_text == NO_MATCH
    }
}

/// Expands each record into one row per matching rule, or a single
/// [`NO_MATCH`] row when its type code has no rule.
///
/// Type codes are compared exactly, case included.
pub fn match_records(records: &[CatalogRecord], index: &RuleIndex) -> Vec<MatchRow> {
    let mut rows = Vec::with_capacity(records.len());

    for record in records {
        let rules = index.rules_for(&record.type_code);
        if rules.is_empty() {
            rows.push(MatchRow {
                type_code: record.type_code.clone(),
                display_name: record.display_name.clone(),
                source_line: record.source_line,
                filter_text: NO_MATCH.to_string(),
                rule_start_line: None,
                full_entry: record.full_entry.clone(),
                rule_checksum: None,
            });
            continue;
        }

        rows.extend(rules.iter().map(|rule| MatchRow {
            type_code: record.type_code.clone(),
            display_name: record.display_name.clone(),
            source_line: record.source_line,
            filter_text: rule.filter_text.clone(),
            rule_start_line: Some(rule.start_line),
            full_entry: record.full_entry.clone(),
            rule_checksum: Some(rule.checksum.clone()),
        }));
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use style_blocks::scan;

    fn record(type_code: &str, name: &str, line: usize) -> CatalogRecord {
        CatalogRecord {
            type_code: type_code.into(),
            display_name: name.into(),
            source_line: line,
            full_entry: format!("[_line]\nType={}\n[end]", type_code),
        }
    }

    fn index(lines: &[&str]) -> RuleIndex {
        RuleIndex::from_scan(&scan(lines))
    }

    #[test]
    fn test_unmatched_record_yields_single_sentinel_row() {
        let rows = match_records(&[record("0x01", "Foo", 10)], &index(&["a=b [0x02]"]));
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(
            (row.type_code.as_str(), row.display_name.as_str(), row.source_line),
            ("0x01", "Foo", 10)
        );
        assert_eq!(row.filter_text, NO_MATCH);
        assert!(row.is_unmatched());
        assert_eq!(row.rule_start_line, None);
    }

    #[test]
    fn test_row_count_is_max_of_one_and_rule_count() {
        let idx = index(&["a=b [0x01]", "c=d [0x01]", "e=f [0x02]", "g=h [0x01]"]);
        let records = [record("0x01", "A", 1), record("0x02", "B", 5), record("0x03", "C", 9)];
        let rows = match_records(&records, &idx);

        for r in &records {
            let count = rows.iter().filter(|row| row.source_line == r.source_line).count();
            assert_eq!(count, idx.rules_for(&r.type_code).len().max(1));
        }

        let lines: Vec<Option<usize>> = rows
            .iter()
            .filter(|row| row.type_code == "0x01")
            .map(|row| row.rule_start_line)
            .collect();
        assert_eq!(lines, vec![Some(1), Some(2), Some(4)]);
    }

    #[test]
    fn test_no_prefix_matching() {
        let rows = match_records(&[record("0x1", "Short", 3)], &index(&["a=b [0x10]"]));
        assert!(rows[0].is_unmatched());
    }
}

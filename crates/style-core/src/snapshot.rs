//! CSV snapshot codec
//!
//! The snapshot is the human-editable table written by `extract` and read
//! back, twice, by `apply`: once as the baseline and once as the edited copy.
//! Only the `Matching_Filters` column is meant to be edited.

use crate::matcher::MatchRow;
use crate::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use style_blocks::{Diagnostic, DiagnosticKind};
use style_fs::{checksum, io};

pub const TYPE_COLUMN: &str = "Type";
pub const NAME_COLUMN: &str = "String1_Name";
pub const FILTER_COLUMN: &str = "Matching_Filters";
pub const CATALOG_LINE_COLUMN: &str = "CatalogLineNumber";
pub const RULE_LINE_COLUMN: &str = "StyleLineNumber";
pub const ENTRY_COLUMN: &str = "FullEntry";
pub const CHECKSUM_COLUMN: &str = "StyleChecksum";

/// Required columns with the older header names accepted for each.
const REQUIRED_COLUMNS: [(&str, Option<&str>); 6] = [
    (TYPE_COLUMN, None),
    (NAME_COLUMN, None),
    (FILTER_COLUMN, None),
    (CATALOG_LINE_COLUMN, Some("20011_Line_Number")),
    (RULE_LINE_COLUMN, Some("Style_Line_Number")),
    (ENTRY_COLUMN, Some("Full_Entry")),
];

#[derive(Debug, Deserialize)]
struct RawRow {
    #[serde(rename = "Type")]
    type_code: String,
    #[serde(rename = "String1_Name")]
    display_name: String,
    #[serde(rename = "Matching_Filters")]
    filter_text: String,
    #[serde(rename = "CatalogLineNumber", alias = "20011_Line_Number")]
    source_line: String,
    #[serde(rename = "StyleLineNumber", alias = "Style_Line_Number")]
    rule_line: String,
    #[serde(rename = "FullEntry", alias = "Full_Entry")]
    full_entry: String,
    #[serde(rename = "StyleChecksum", default)]
    checksum: String,
}

/// Rows decoded from a snapshot, plus the rows that were rejected.
#[derive(Debug, Clone, Default)]
pub struct SnapshotRead {
    pub rows: Vec<MatchRow>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Writes `rows` to `path` atomically.
///
/// The checksum column is only written when `with_checksums` is set.
pub fn write_snapshot(path: &Path, rows: &[MatchRow], with_checksums: bool) -> Result<()> {
    let bytes = encode(rows, with_checksums).map_err(|e| Error::snapshot(path, e))?;
    io::write_atomic(path, &bytes)?;
    tracing::info!(path = %path.display(), rows = rows.len(), "wrote snapshot");
    Ok(())
}

fn encode(rows: &[MatchRow], with_checksums: bool) -> std::result::Result<Vec<u8>, csv::Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    let mut header = vec![
        TYPE_COLUMN,
        NAME_COLUMN,
        FILTER_COLUMN,
        CATALOG_LINE_COLUMN,
        RULE_LINE_COLUMN,
        ENTRY_COLUMN,
    ];
    if with_checksums {
        header.push(CHECKSUM_COLUMN);
    }
    writer.write_record(&header)?;

    for row in rows {
        let source_line = row.source_line.to_string();
        let rule_line = row.rule_start_line.map(|l| l.to_string()).unwrap_or_default();
        let mut record = vec![
            row.type_code.as_str(),
            row.display_name.as_str(),
            row.filter_text.as_str(),
            source_line.as_str(),
            rule_line.as_str(),
            row.full_entry.as_str(),
        ];
        if with_checksums {
            record.push(row.rule_checksum.as_deref().unwrap_or(""));
        }
        writer.write_record(&record)?;
    }

    writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))
}

/// Reads a snapshot written by [`write_snapshot`] or by the older tooling.
///
/// A missing required column fails the whole read. A row whose line-number
/// cells are not positive integers, or whose checksum cell is neither empty
/// nor a well-formed checksum, is skipped with an `InvalidRow` diagnostic
/// carrying its CSV line.
pub fn read_snapshot(path: &Path) -> Result<SnapshotRead> {
    let text = io::read_text(path)?;
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| Error::snapshot(path, e))?
        .clone();
    for (column, alias) in REQUIRED_COLUMNS {
        let present = headers
            .iter()
            .any(|h| h == column || Some(h) == alias);
        if !present {
            return Err(Error::MissingColumn {
                path: path.to_path_buf(),
                column: column.to_string(),
            });
        }
    }

    let mut read = SnapshotRead::default();
    for result in reader.records() {
        let record = result.map_err(|e| Error::snapshot(path, e))?;
        let csv_line = record.position().map_or(0, |p| p.line() as usize);

        let raw: RawRow = match record.deserialize(Some(&headers)) {
            Ok(raw) => raw,
            Err(e) => {
                read.diagnostics.push(Diagnostic::at(
                    DiagnosticKind::InvalidRow,
                    csv_line,
                    e.to_string(),
                ));
                continue;
            }
        };

        match into_row(raw) {
            Ok(row) => read.rows.push(row),
            Err(message) => {
                tracing::warn!(line = csv_line, "{}", message);
                read.diagnostics
                    .push(Diagnostic::at(DiagnosticKind::InvalidRow, csv_line, message));
            }
        }
    }

    tracing::debug!(
        path = %path.display(),
        rows = read.rows.len(),
        rejected = read.diagnostics.len(),
        "read snapshot"
    );
    Ok(read)
}

fn into_row(raw: RawRow) -> std::result::Result<MatchRow, String> {
    let source_line = parse_line(&raw.source_line)
        .ok_or_else(|| format!("invalid {} '{}'", CATALOG_LINE_COLUMN, raw.source_line))?;

    let rule_start_line = match raw.rule_line.trim() {
        "" => None,
        cell => Some(
            parse_line(cell).ok_or_else(|| format!("invalid {} '{}'", RULE_LINE_COLUMN, cell))?,
        ),
    };

    let rule_checksum = match raw.checksum.trim() {
        "" => None,
        cell if checksum::is_checksum(cell) => Some(cell.to_string()),
        cell => return Err(format!("invalid {} '{}'", CHECKSUM_COLUMN, cell)),
    };

    Ok(MatchRow {
        type_code: raw.type_code,
        display_name: raw.display_name,
        source_line,
        filter_text: raw.filter_text,
        rule_start_line,
        full_entry: raw.full_entry,
        rule_checksum,
    })
}

fn parse_line(cell: &str) -> Option<usize> {
    cell.trim().parse::<usize>().ok().filter(|&n| n > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::NO_MATCH;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    fn rows() -> Vec<MatchRow> {
        vec![
            MatchRow {
                type_code: "0x01".into(),
                display_name: "Motorway".into(),
                source_line: 4,
                filter_text: "highway=motorway".into(),
                rule_start_line: Some(3),
                full_entry: "[_line]\nType=0x01\nString1=0x04,Motorway\n[end]".into(),
                rule_checksum: Some(style_fs::compute_content_checksum("highway=motorway [0x01]")),
            },
            MatchRow {
                type_code: "0x02".into(),
                display_name: "Foo, Bar".into(),
                source_line: 10,
                filter_text: NO_MATCH.into(),
                rule_start_line: None,
                full_entry: "[_line]\nType=0x02\n[end]".into(),
                rule_checksum: None,
            },
        ]
    }

    #[test]
    fn test_encode_layout() {
        let bytes = encode(&rows(), false).unwrap();
        insta::assert_snapshot!(String::from_utf8(bytes).unwrap(), @r#"
        Type,String1_Name,Matching_Filters,CatalogLineNumber,StyleLineNumber,FullEntry
        0x01,Motorway,highway=motorway,4,3,"[_line]
        Type=0x01
        String1=0x04,Motorway
        [end]"
        0x02,"Foo, Bar",No matching filters found,10,,"[_line]
        Type=0x02
        [end]"
        "#);
    }

    #[test]
    fn test_write_then_read_keeps_rows() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("snapshot.csv");

        write_snapshot(&path, &rows(), true).unwrap();
        let read = read_snapshot(&path).unwrap();

        assert!(read.diagnostics.is_empty());
        assert_eq!(read.rows, rows());
    }

    #[test]
    fn test_reads_legacy_headers_without_checksum() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("legacy.csv");
        fs::write(
            &path,
            "Type,String1_Name,Matching_Filters,20011_Line_Number,Style_Line_Number,Full_Entry\n\
             0x01,Motorway,highway=motorway,4,3,entry\n",
        )
        .unwrap();

        let read = read_snapshot(&path).unwrap();

        assert_eq!(read.rows.len(), 1);
        assert_eq!(read.rows[0].rule_start_line, Some(3));
        assert_eq!(read.rows[0].rule_checksum, None);
    }

    #[test]
    fn test_invalid_line_number_skips_row() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bad.csv");
        fs::write(
            &path,
            "Type,String1_Name,Matching_Filters,CatalogLineNumber,StyleLineNumber,FullEntry\n\
             0x01,A,a=b,4,three,e\n\
             0x02,B,c=d,0,,e\n\
             0x03,C,e=f,9,,e\n",
        )
        .unwrap();

        let read = read_snapshot(&path).unwrap();

        assert_eq!(read.rows.len(), 1);
        assert_eq!(read.rows[0].type_code, "0x03");
        let lines: Vec<_> = read.diagnostics.iter().map(|d| (d.kind, d.line)).collect();
        assert_eq!(
            lines,
            vec![
                (DiagnosticKind::InvalidRow, Some(2)),
                (DiagnosticKind::InvalidRow, Some(3))
            ]
        );
    }

    #[test]
    fn test_malformed_checksum_skips_row() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("edited.csv");
        let valid = style_fs::compute_content_checksum("a=b [0x01]");
        fs::write(
            &path,
            format!(
                "Type,String1_Name,Matching_Filters,CatalogLineNumber,StyleLineNumber,FullEntry,StyleChecksum\n\
                 0x01,A,a=b,4,3,e,{}\n\
                 0x02,B,c=d,9,7,e,sha256:abc\n\
                 0x03,C,e=f,12,11,e,{}x\n",
                valid, valid
            ),
        )
        .unwrap();

        let read = read_snapshot(&path).unwrap();

        assert_eq!(read.rows.len(), 1);
        assert_eq!(read.rows[0].rule_checksum.as_deref(), Some(valid.as_str()));
        let lines: Vec<_> = read.diagnostics.iter().map(|d| (d.kind, d.line)).collect();
        assert_eq!(
            lines,
            vec![
                (DiagnosticKind::InvalidRow, Some(3)),
                (DiagnosticKind::InvalidRow, Some(4))
            ]
        );
        assert!(read.diagnostics[0].message.contains(CHECKSUM_COLUMN));
    }

    #[test]
    fn test_missing_column_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("short.csv");
        fs::write(&path, "Type,String1_Name\n0x01,A\n").unwrap();

        let err = read_snapshot(&path).unwrap_err();
        assert!(matches!(err, Error::MissingColumn { ref column, .. } if column == FILTER_COLUMN));
    }
}

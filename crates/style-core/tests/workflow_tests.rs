//! End-to-end tests for the extract and apply workflows.

use pretty_assertions::assert_eq;
use rstest::rstest;
use style_blocks::DiagnosticKind;
use style_core::{
    CatalogExtractor, Extraction, MatchRow, NO_MATCH, StyleSyncConfig, apply, dry_run, extract,
    plan, read_snapshot, write_snapshot,
};
use style_test_utils::StyleFixture;
use style_test_utils::fixture::{CATALOG_FILE, EDITED_SNAPSHOT, RULE_FILE, SNAPSHOT};
use style_test_utils::samples;

fn config_for(fixture: &StyleFixture) -> StyleSyncConfig {
    StyleSyncConfig {
        rule_file: fixture.path(RULE_FILE),
        catalog_file: fixture.path(CATALOG_FILE),
        snapshot: fixture.path(SNAPSHOT),
        edited_snapshot: fixture.path(EDITED_SNAPSHOT),
        ..StyleSyncConfig::default()
    }
}

#[test]
fn test_extract_writes_one_row_per_rule() {
    let fixture = StyleFixture::with_samples();
    let config = config_for(&fixture);

    let report = extract(&config).unwrap();

    assert_eq!(report.records, 4);
    assert_eq!(report.type_codes, 3);
    assert_eq!(report.rules, 4);
    assert_eq!(report.rows, 5);
    assert_eq!(report.matched_rows, 4);
    assert_eq!(report.unmatched_rows, 1);
    assert!(report.diagnostics.is_empty());

    let read = read_snapshot(&config.snapshot).unwrap();
    let summary: Vec<(&str, &str, usize, &str, Option<usize>)> = read
        .rows
        .iter()
        .map(|r| {
            (
                r.type_code.as_str(),
                r.display_name.as_str(),
                r.source_line,
                r.filter_text.as_str(),
                r.rule_start_line,
            )
        })
        .collect();
    assert_eq!(
        summary,
        vec![
            ("0x01", "Motorway", 6, "highway=motorway", Some(4)),
            ("0x01", "Motorway", 6, "highway=motorway_link", Some(5)),
            ("0x02", "Trunk", 13, "highway=trunk & oneway=yes & surface=paved", Some(8)),
            ("0x03", "Primary", 18, "highway=primary", Some(11)),
            ("0x04", "Secondary", 23, NO_MATCH, None),
        ]
    );
    assert!(read.rows[..4].iter().all(|r| r.rule_checksum.is_some()));
}

#[test]
fn test_record_without_rule_yields_sentinel_row() {
    let mut catalog = "; padding\n".repeat(9);
    catalog.push_str("[_line]\nType=0x01\nString1=0x04,Foo\n[end]\n");

    let extraction = Extraction::build("", &catalog, &CatalogExtractor::default());

    assert_eq!(extraction.rows.len(), 1);
    let row: &MatchRow = &extraction.rows[0];
    assert_eq!(
        (
            row.type_code.as_str(),
            row.display_name.as_str(),
            row.source_line,
            row.filter_text.as_str(),
            row.rule_start_line,
        ),
        ("0x01", "Foo", 10, "No matching filters found", None)
    );
}

#[test]
fn test_unedited_snapshot_plans_nothing() {
    let fixture = StyleFixture::with_samples();
    let config = config_for(&fixture);
    extract(&config).unwrap();
    fixture.write(EDITED_SNAPSHOT, &fixture.read(SNAPSHOT));

    let resolution = plan(&config).unwrap();

    assert!(resolution.is_empty());
    assert!(resolution.diagnostics.is_empty());
}

#[test]
fn test_round_trip_edit_and_new_rule() {
    let fixture = StyleFixture::with_samples();
    let config = config_for(&fixture);
    extract(&config).unwrap();

    fixture.edit_copy(
        SNAPSHOT,
        EDITED_SNAPSHOT,
        ",highway=motorway_link,",
        ",highway=motorway_link & toll=no,",
    );
    fixture.edit_copy(
        EDITED_SNAPSHOT,
        EDITED_SNAPSHOT,
        ",No matching filters found,",
        ",highway=secondary,",
    );

    let resolution = plan(&config).unwrap();
    assert_eq!(resolution.changes.len(), 1);
    assert_eq!(resolution.new_rules.len(), 1);

    let report = apply(&config, &resolution).unwrap();

    assert!(report.written);
    assert_eq!(report.outcome.applied.len(), 1);
    assert!(report.outcome.diagnostics.is_empty());
    assert_eq!(fixture.backups_of(RULE_FILE), vec![report.backup.clone()]);
    assert_eq!(std::fs::read_to_string(&report.backup).unwrap(), samples::RULES);

    let expected = samples::RULES.replacen(
        "highway=motorway_link\n",
        "highway=motorway_link & toll=no\n",
        1,
    ) + "\n# New rules added from CSV edits\n"
        + "highway=secondary [0x04 road_class=0 road_speed=1 resolution 22]\n";
    assert_eq!(fixture.read(RULE_FILE), expected);
}

#[rstest]
#[case::tracked(true, 1, 0)]
#[case::untracked(false, 0, 1)]
fn test_rule_edited_after_extract(
    #[case] track_checksums: bool,
    #[case] conflicts: usize,
    #[case] applied: usize,
) {
    let fixture = StyleFixture::with_samples();
    let mut config = config_for(&fixture);
    config.rules.track_checksums = track_checksums;
    extract(&config).unwrap();

    let hand_edited = samples::RULES.replacen(
        "highway=motorway [0x01",
        "highway=motorway & lanes>2 [0x01",
        1,
    );
    fixture.write(RULE_FILE, &hand_edited);
    fixture.edit_copy(SNAPSHOT, EDITED_SNAPSHOT, ",highway=motorway,", ",highway=trunk,");

    let report = apply(&config, &plan(&config).unwrap()).unwrap();

    let conflict_count = report
        .outcome
        .diagnostics
        .iter()
        .filter(|d| d.kind == DiagnosticKind::Conflict)
        .count();
    assert_eq!(conflict_count, conflicts);
    assert_eq!(report.outcome.applied.len(), applied);
    if applied == 0 {
        assert_eq!(fixture.read(RULE_FILE), hand_edited);
    } else {
        fixture.assert_file_contains(RULE_FILE, "highway=trunk & lanes>2 [0x01");
    }
}

#[test]
fn test_dry_run_leaves_rule_file_alone() {
    let fixture = StyleFixture::with_samples();
    let config = config_for(&fixture);
    extract(&config).unwrap();
    fixture.edit_copy(SNAPSHOT, EDITED_SNAPSHOT, ",highway=primary,", ",highway=primary_link,");

    let preview = dry_run(&config, &plan(&config).unwrap()).unwrap();

    assert!(preview.after.contains("highway=primary_link [0x03"));
    assert_eq!(fixture.read(RULE_FILE), samples::RULES);
    assert!(fixture.backups_of(RULE_FILE).is_empty());
}

#[test]
fn test_invalid_rows_surface_in_plan() {
    let fixture = StyleFixture::with_samples();
    let config = config_for(&fixture);
    extract(&config).unwrap();
    fixture.edit_copy(
        SNAPSHOT,
        EDITED_SNAPSHOT,
        ",highway=primary,18,11,",
        ",highway=primary,18,eleven,",
    );

    let resolution = plan(&config).unwrap();

    assert!(resolution.is_empty());
    assert_eq!(resolution.diagnostics.len(), 1);
    assert_eq!(resolution.diagnostics[0].kind, DiagnosticKind::InvalidRow);
}

#[test]
fn test_sorted_edited_snapshot_has_no_changes() {
    let fixture = StyleFixture::with_samples();
    let config = config_for(&fixture);
    extract(&config).unwrap();

    let mut rows = read_snapshot(&config.snapshot).unwrap().rows;
    rows.sort_by(|a, b| b.filter_text.cmp(&a.filter_text));
    write_snapshot(&config.edited_snapshot, &rows, true).unwrap();

    let resolution = plan(&config).unwrap();

    assert!(resolution.is_empty());
    assert!(resolution.diagnostics.is_empty());
}

#[test]
fn test_repeated_apply_keeps_every_backup() {
    let fixture = StyleFixture::with_samples();
    let config = config_for(&fixture);
    extract(&config).unwrap();
    fixture.edit_copy(SNAPSHOT, EDITED_SNAPSHOT, ",highway=primary,", ",highway=tertiary,");

    let first = apply(&config, &plan(&config).unwrap()).unwrap();
    let second = apply(&config, &plan(&config).unwrap()).unwrap();

    assert_ne!(first.backup, second.backup);
    assert_eq!(fixture.backups_of(RULE_FILE).len(), 2);
    assert_eq!(std::fs::read_to_string(&first.backup).unwrap(), samples::RULES);
    assert!(std::fs::read_to_string(&second.backup)
        .unwrap()
        .contains("highway=tertiary [0x03"));
}

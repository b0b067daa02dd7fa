//! Positional filter patching.
//!
//! A [`Change`] names a rule by the 1-based line its block started on when
//! the snapshot was taken. The patcher re-reads the block at that line,
//! resolves which substring is the filter, swaps it, and records the new
//! lines as a span edit on the [`RuleDocument`]. A [`NewRule`] has no anchor
//! and is appended as a single-line block.
//!
//! Every failure is local to one change and becomes a [`Diagnostic`].

use crate::diagnostic::{Diagnostic, DiagnosticKind};
use crate::document::RuleDocument;
use crate::error::Result;
use crate::scanner::{RuleBlock, is_skippable, is_terminator};
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use style_fs::{create_backup, io};

/// Directive tail used when synthesising a new rule.
pub const DEFAULT_NEW_RULE_DIRECTIVES: &str = "road_class=0 road_speed=1 resolution 22";

/// Comment written once above appended rules.
pub const DEFAULT_NEW_RULES_HEADER: &str = "# New rules added from CSV edits";

/// Edit to the filter of an existing rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Change {
    /// The 1-based line where the rule block starts.
    pub line: usize,
    pub type_code: String,
    pub display_name: String,
    pub old_filter: String,
    pub new_filter: String,
    /// Checksum the block had at extraction time, if it was recorded.
    pub expected_checksum: Option<String>,
}

/// A filter for a type code that had no rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewRule {
    pub type_code: String,
    pub display_name: String,
    pub new_filter: String,
}

impl NewRule {
    /// Renders the rule as `<filter> [<type_code> <directives>]`.
    pub fn render(&self, directives: &str) -> String {
        let directives = directives.trim();
        if directives.is_empty() {
            format!("{} [{}]", self.new_filter, self.type_code)
        } else {
            format!("{} [{} {}]", self.new_filter, self.type_code, directives)
        }
    }
}

#[derive(Debug, Clone)]
pub struct PatchOptions {
    /// Directives appended after the type code of synthesised rules.
    pub new_rule_directives: String,
    /// Comment line written above appended rules, if any.
    pub new_rules_header: Option<String>,
}

impl Default for PatchOptions {
    fn default() -> Self {
        Self {
            new_rule_directives: DEFAULT_NEW_RULE_DIRECTIVES.to_string(),
            new_rules_header: Some(DEFAULT_NEW_RULES_HEADER.to_string()),
        }
    }
}

/// How the old filter was located inside the block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterMatch {
    /// The recorded old filter text occurs verbatim.
    Exact,
    /// Taken from the text in front of `[<type_code>`.
    TypeCode,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppliedChange {
    pub start_line: usize,
    pub end_line: usize,
    pub type_code: String,
    /// The filter text that was actually replaced.
    pub replaced: String,
    pub new_filter: String,
    pub matched_by: FilterMatch,
    /// `true` if the block had to be re-flowed because the filter spanned
    /// several physical lines.
    pub reflowed: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PatchOutcome {
    pub applied: Vec<AppliedChange>,
    /// Rendered lines of the appended rules.
    pub added: Vec<String>,
    /// 1-based original line numbers covered by patched blocks.
    pub modified_lines: BTreeSet<usize>,
    pub diagnostics: Vec<Diagnostic>,
}

impl PatchOutcome {
    pub fn skipped(&self) -> usize {
        self.diagnostics.len()
    }
}

/// Applies `changes` in ascending line order, then appends `new_rules`.
pub fn patch(
    doc: &mut RuleDocument,
    changes: &[Change],
    new_rules: &[NewRule],
    options: &PatchOptions,
) -> PatchOutcome {
    let mut outcome = PatchOutcome::default();

    let mut ordered: Vec<&Change> = changes.iter().collect();
    ordered.sort_by_key(|c| c.line);

    for change in ordered {
        tracing::debug!(
            line = change.line,
            type_code = %change.type_code,
            old = %change.old_filter,
            new = %change.new_filter,
            "processing change"
        );
        match apply_change(doc, change) {
            Ok(applied) => {
                tracing::info!(
                    start = applied.start_line,
                    end = applied.end_line,
                    type_code = %applied.type_code,
                    "updated rule"
                );
                outcome
                    .modified_lines
                    .extend(applied.start_line..=applied.end_line);
                outcome.applied.push(applied);
            }
            Err(diagnostic) => {
                tracing::warn!("{}", diagnostic);
                outcome.diagnostics.push(diagnostic);
            }
        }
    }

    if !new_rules.is_empty() {
        if let Some(header) = &options.new_rules_header {
            doc.append_line("");
            doc.append_line(header.as_str());
        }
        for rule in new_rules {
            let line = rule.render(&options.new_rule_directives);
            tracing::info!(type_code = %rule.type_code, rule = %line, "appending new rule");
            doc.append_line(line.as_str());
            outcome.added.push(line);
        }
    }

    outcome
}

fn apply_change(
    doc: &mut RuleDocument,
    change: &Change,
) -> std::result::Result<AppliedChange, Diagnostic> {
    let line_count = doc.line_count();
    if change.line == 0 || change.line > line_count {
        return Err(Diagnostic::at(
            DiagnosticKind::OutOfRangeLine,
            change.line,
            format!("line number exceeds file length ({})", line_count),
        ));
    }

    let start = change.line - 1;
    let block = RuleBlock::at(doc.lines(), start).ok_or_else(|| {
        Diagnostic::at(
            DiagnosticKind::MalformedBlock,
            change.line,
            "could not find end of rule",
        )
    })?;
    let end = block.end_line - 1;
    let current = block.text();

    if let Some(expected) = change
        .expected_checksum
        .as_deref()
        .filter(|c| !c.is_empty())
        && block.checksum() != expected
    {
        return Err(Diagnostic::at(
            DiagnosticKind::Conflict,
            change.line,
            "rule changed since the snapshot was taken",
        ));
    }

    let (pos, old) = resolve_filter(&current, &change.old_filter, &change.type_code)
        .ok_or_else(|| {
            Diagnostic::at(
                DiagnosticKind::UnresolvedFilter,
                change.line,
                format!("could not find filter in rule: {}", excerpt(&current)),
            )
        })?;
    let matched_by = if old == change.old_filter {
        FilterMatch::Exact
    } else {
        FilterMatch::TypeCode
    };

    let span = &doc.lines()[start..=end];
    let (replacement, reflowed) = match replace_in_line(span, pos, old.len(), &change.new_filter)
    {
        Some(lines) => (lines, false),
        None => {
            let mut updated = String::with_capacity(current.len() + change.new_filter.len());
            updated.push_str(&current[..pos]);
            updated.push_str(&change.new_filter);
            updated.push_str(&current[pos + old.len()..]);
            (reflow_span(span, &updated), true)
        }
    };

    let replaced = old.to_string();
    doc.replace_span(start..=end, replacement).map_err(|existing| {
        Diagnostic::at(
            DiagnosticKind::Conflict,
            change.line,
            format!(
                "overlaps lines {}-{} already patched",
                existing.start() + 1,
                existing.end() + 1
            ),
        )
    })?;

    Ok(AppliedChange {
        start_line: block.start_line,
        end_line: block.end_line,
        type_code: change.type_code.clone(),
        replaced,
        new_filter: change.new_filter.clone(),
        matched_by,
        reflowed,
    })
}

/// Locates the filter to replace in a joined rule, returning its byte offset
/// and text.
///
/// The recorded old filter is used when it occurs verbatim (first
/// occurrence). Otherwise the text between the nearest `{` or `[` before
/// `[<type_code>` and that token is taken.
pub fn resolve_filter<'a>(
    rule: &'a str,
    old_filter: &str,
    type_code: &str,
) -> Option<(usize, &'a str)> {
    if !old_filter.is_empty()
        && let Some(pos) = rule.find(old_filter)
    {
        return Some((pos, &rule[pos..pos + old_filter.len()]));
    }

    if type_code.is_empty() {
        return None;
    }
    let type_pos = rule.find(&format!("[{}", type_code)).filter(|&p| p > 0)?;
    let head = &rule[..type_pos];
    let from = head.rfind(['{', '[']).map_or(0, |p| p + 1);
    let region = &head[from..];
    let filter = region.trim();
    if filter.is_empty() {
        return None;
    }
    let offset = from + (region.len() - region.trim_start().len());
    Some((offset, filter))
}

/// Replaces `len` bytes at joined offset `pos` inside a single physical line,
/// leaving every other line of the span untouched.
///
/// Returns `None` if the range crosses a line boundary.
fn replace_in_line(span: &[String], pos: usize, len: usize, new: &str) -> Option<Vec<String>> {
    let mut offset = 0;
    for (idx, line) in span.iter().enumerate() {
        if is_skippable(line) {
            continue;
        }
        let trimmed = line.trim();
        if pos >= offset && pos + len <= offset + trimmed.len() {
            let local = leading_whitespace(line).len() + pos - offset;
            let mut lines = span.to_vec();
            lines[idx] = format!("{}{}{}", &line[..local], new, &line[local + len..]);
            return Some(lines);
        }
        // the joined rule separates lines with a single space
        offset += trimmed.len() + 1;
        if offset > pos {
            return None;
        }
    }
    None
}

/// Splits a joined rule into physical lines, closing a line after every
/// token that ends in `}` or `]`.
pub fn reflow(rule: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for token in rule.split(' ').filter(|t| !t.is_empty()) {
        current.push(token);
        if is_terminator(token) {
            lines.push(current.join(" "));
            current.clear();
        }
    }
    if !current.is_empty() {
        lines.push(current.join(" "));
    }
    lines
}

/// Re-flows an updated rule over the span it came from.
///
/// Comment and blank lines of the span are kept in order ahead of the rule.
/// Each new line takes the indentation of the original rule line in the same
/// position, or of the last rule line when there are more new lines.
fn reflow_span(span: &[String], updated: &str) -> Vec<String> {
    let (kept, rule_lines): (Vec<&String>, Vec<&String>) =
        span.iter().partition(|line| is_skippable(line));

    let mut lines: Vec<String> = kept.into_iter().cloned().collect();
    for (idx, line) in reflow(updated).into_iter().enumerate() {
        let indent = rule_lines
            .get(idx)
            .or(rule_lines.last())
            .map_or("", |original| leading_whitespace(original));
        lines.push(format!("{}{}", indent, line));
    }
    lines
}

fn leading_whitespace(line: &str) -> &str {
    &line[..line.len() - line.trim_start().len()]
}

fn excerpt(rule: &str) -> String {
    const MAX: usize = 100;
    match rule.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}...", &rule[..cut]),
        None => rule.to_string(),
    }
}

/// Result of patching a rule file on disk.
#[derive(Debug, Clone, Serialize)]
pub struct ApplyReport {
    pub outcome: PatchOutcome,
    /// Copy of the file taken before anything was written.
    pub backup: PathBuf,
    /// Whether the rule file was rewritten.
    pub written: bool,
}

/// Patches the rule file at `path`.
///
/// A backup is always created first, even when there is nothing to apply.
/// The file is rewritten atomically only if a block was patched or a rule
/// appended. A file that is not valid UTF-8 is refused before the backup.
pub fn apply_to_file(
    path: &Path,
    changes: &[Change],
    new_rules: &[NewRule],
    options: &PatchOptions,
) -> Result<ApplyReport> {
    let text = io::read_text_strict(path)?;
    let backup = create_backup(path)?;

    let mut doc = RuleDocument::parse(&text);
    let outcome = patch(&mut doc, changes, new_rules, options);

    let written = doc.is_modified();
    if written {
        io::write_text(path, &doc.render())?;
    }

    Ok(ApplyReport {
        outcome,
        backup,
        written,
    })
}

/// Before and after text of a patch that was not written.
#[derive(Debug, Clone)]
pub struct Preview {
    pub before: String,
    pub after: String,
    pub outcome: PatchOutcome,
}

/// Patches the rule file in memory only. No backup is taken.
pub fn preview(
    path: &Path,
    changes: &[Change],
    new_rules: &[NewRule],
    options: &PatchOptions,
) -> Result<Preview> {
    let before = io::read_text_strict(path)?;
    let mut doc = RuleDocument::parse(&before);
    let outcome = patch(&mut doc, changes, new_rules, options);
    let after = doc.render();
    Ok(Preview {
        before,
        after,
        outcome,
    })
}

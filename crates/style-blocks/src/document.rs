//! In-memory rule file with deferred span edits.
//!
//! The original lines are never mutated. Edits are recorded against original
//! 0-based line ranges and only materialised by [`RuleDocument::render`], so
//! every lookup by recorded line number sees the file as it was extracted.

use std::collections::BTreeMap;
use std::ops::RangeInclusive;

#[derive(Debug, Clone, PartialEq, Eq)]
struct SpanEdit {
    end: usize,
    replacement: Vec<String>,
}

/// A rule file's lines plus pending replacements and appended lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleDocument {
    lines: Vec<String>,
    line_ending: &'static str,
    trailing_newline: bool,
    edits: BTreeMap<usize, SpanEdit>,
    appended: Vec<String>,
}

impl RuleDocument {
    /// Splits text into lines, remembering the line ending style and whether
    /// the text ends with a newline.
    pub fn parse(text: &str) -> Self {
        let line_ending = if text.contains("\r\n") { "\r\n" } else { "\n" };
        Self {
            lines: text.lines().map(str::to_string).collect(),
            line_ending,
            trailing_newline: text.ends_with('\n'),
            edits: BTreeMap::new(),
            appended: Vec::new(),
        }
    }

    /// The original, unedited lines.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Returns `true` once any span edit or append has been recorded.
    pub fn is_modified(&self) -> bool {
        !self.edits.is_empty() || !self.appended.is_empty()
    }

    /// Returns the range of an already recorded edit overlapping `range`.
    pub fn overlapping_edit(&self, range: &RangeInclusive<usize>) -> Option<RangeInclusive<usize>> {
        self.edits
            .range(..=*range.end())
            .next_back()
            .filter(|(_, edit)| edit.end >= *range.start())
            .map(|(start, edit)| *start..=edit.end)
    }

    /// Records that original lines `range` are replaced by `replacement`.
    ///
    /// Fails with the conflicting range if `range` overlaps an earlier edit.
    pub fn replace_span(
        &mut self,
        range: RangeInclusive<usize>,
        replacement: Vec<String>,
    ) -> std::result::Result<(), RangeInclusive<usize>> {
        if let Some(existing) = self.overlapping_edit(&range) {
            return Err(existing);
        }
        self.edits.insert(
            *range.start(),
            SpanEdit {
                end: *range.end(),
                replacement,
            },
        );
        Ok(())
    }

    /// Queues a line to be written after the last original line.
    pub fn append_line(&mut self, line: impl Into<String>) {
        self.appended.push(line.into());
    }

    /// Serialises the document with all edits applied.
    pub fn render(&self) -> String {
        let mut out: Vec<&str> = Vec::with_capacity(self.lines.len() + self.appended.len());
        let mut idx = 0;
        while idx < self.lines.len() {
            match self.edits.get(&idx) {
                Some(edit) => {
                    out.extend(edit.replacement.iter().map(String::as_str));
                    idx = edit.end + 1;
                }
                None => {
                    out.push(&self.lines[idx]);
                    idx += 1;
                }
            }
        }
        out.extend(self.appended.iter().map(String::as_str));

        let mut text = out.join(self.line_ending);
        if !out.is_empty() && (self.trailing_newline || !self.appended.is_empty()) {
            text.push_str(self.line_ending);
        }
        text
    }
}

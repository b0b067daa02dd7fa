//! Reconstruction of logical rule blocks from physical lines.
//!
//! A block opens on the first line that is neither blank nor a `#` comment
//! and closes, inclusively, on the first such line whose trimmed text ends
//! with `}` or `]`. Blank and comment lines inside a block are skipped.

use crate::diagnostic::{Diagnostic, DiagnosticKind};
use style_fs::compute_content_checksum;

/// Marker that starts a comment line.
pub const COMMENT_MARKER: char = '#';

/// Returns `true` for blank and comment lines.
pub fn is_skippable(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty() || trimmed.starts_with(COMMENT_MARKER)
}

/// Returns `true` if the line closes a block.
pub fn is_terminator(line: &str) -> bool {
    let trimmed = line.trim_end();
    trimmed.ends_with('}') || trimmed.ends_with(']')
}

/// Finds the 0-based index of the line that closes the block starting at
/// `start`, or `None` if the file ends first.
pub fn block_end<S: AsRef<str>>(lines: &[S], start: usize) -> Option<usize> {
    lines
        .iter()
        .enumerate()
        .skip(start)
        .find(|(_, line)| {
            let line: &str = (*line).as_ref();
            !is_skippable(line) && is_terminator(line)
        })
        .map(|(idx, _)| idx)
}

/// A contiguous run of physical lines forming one logical rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleBlock {
    /// The 1-based line number of the first physical line.
    pub start_line: usize,
    /// The 1-based line number of the closing line.
    pub end_line: usize,
    /// Trimmed rule lines, with blank and comment lines left out.
    pub lines: Vec<String>,
}

impl RuleBlock {
    /// Builds the block that starts at 0-based index `start`.
    pub fn at<S: AsRef<str>>(lines: &[S], start: usize) -> Option<Self> {
        let end = block_end(lines, start)?;
        let body = lines[start..=end]
            .iter()
            .map(AsRef::<str>::as_ref)
            .filter(|l| !is_skippable(l))
            .map(|l| l.trim().to_string())
            .collect();
        Some(Self {
            start_line: start + 1,
            end_line: end + 1,
            lines: body,
        })
    }

    /// The logical rule: rule lines joined with single spaces.
    pub fn text(&self) -> String {
        self.lines.join(" ")
    }

    /// Content identity of the block, stable across the extract/apply passes.
    pub fn checksum(&self) -> String {
        compute_content_checksum(&self.text())
    }
}

/// Result of scanning a rule file.
#[derive(Debug, Clone, Default)]
pub struct Scan {
    pub blocks: Vec<RuleBlock>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Splits `lines` into rule blocks, in file order.
///
/// An unterminated trailing block is dropped and reported as
/// [`DiagnosticKind::MalformedBlock`].
pub fn scan<S: AsRef<str>>(lines: &[S]) -> Scan {
    let mut result = Scan::default();
    let mut idx = 0;

    while idx < lines.len() {
        if is_skippable(lines[idx].as_ref()) {
            idx += 1;
            continue;
        }

        match RuleBlock::at(lines, idx) {
            Some(block) => {
                // end_line is 1-based, so it is also the next 0-based index
                idx = block.end_line;
                result.blocks.push(block);
            }
            None => {
                tracing::debug!(line = idx + 1, "dropping unterminated block");
                result.diagnostics.push(Diagnostic::at(
                    DiagnosticKind::MalformedBlock,
                    idx + 1,
                    "no closing '}' or ']' before end of file",
                ));
                break;
            }
        }
    }

    tracing::debug!(blocks = result.blocks.len(), "scanned rule file");
    result
}

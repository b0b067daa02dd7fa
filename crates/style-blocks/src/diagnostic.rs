//! Structured diagnostics for skipped units of work.

use serde::Serialize;
use std::fmt;

/// What went wrong with a skipped block, record, row or change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// A block has no closing `}` or `]` before end of file.
    MalformedBlock,
    /// Neither the old filter text nor the type-code fallback matched.
    UnresolvedFilter,
    /// A recorded line number is outside the file.
    OutOfRangeLine,
    /// A catalog record lacks an expected key; a default was used.
    MissingKey,
    /// The block at a recorded line no longer matches what was extracted,
    /// or two edits target overlapping lines.
    Conflict,
    /// A snapshot row could not be interpreted.
    InvalidRow,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::MalformedBlock => "malformed block",
            Self::UnresolvedFilter => "unresolved filter",
            Self::OutOfRangeLine => "line out of range",
            Self::MissingKey => "missing key",
            Self::Conflict => "conflict",
            Self::InvalidRow => "invalid row",
        };
        f.write_str(name)
    }
}

/// A recoverable problem, located by 1-based line number where known.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub line: Option<usize>,
    pub message: String,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, line: Option<usize>, message: impl Into<String>) -> Self {
        Self {
            kind,
            line,
            message: message.into(),
        }
    }

    pub fn at(kind: DiagnosticKind, line: usize, message: impl Into<String>) -> Self {
        Self::new(kind, Some(line), message)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "line {}: {}: {}", line, self.kind, self.message),
            None => write!(f, "{}: {}", self.kind, self.message),
        }
    }
}

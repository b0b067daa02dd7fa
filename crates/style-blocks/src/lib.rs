//! Rule-block scanning and positional patching for Style Sync.
//!
//! A style rule file is a line-oriented list of rules. Each rule is one or
//! more physical lines ending on a line whose last character is `}` or `]`:
//!
//! ```text
//! # comment
//! highway=primary & surface=paved
//!     [0x02 road_class=3 road_speed=5 resolution 20]
//! ```
//!
//! The crate is organised leaf-first:
//!
//! - [`scanner`] reconstructs logical rule blocks from physical lines
//! - [`rule`] extracts the type code and filter text from a block
//! - [`document`] holds the file's lines with deferred span edits
//! - [`patcher`] relocates a block by line number and swaps its filter
//!
//! Recoverable problems never abort a pass; they are collected as
//! [`Diagnostic`] values with a kind and a line number.

pub mod diagnostic;
pub mod document;
pub mod error;
pub mod patcher;
pub mod rule;
pub mod scanner;

pub use diagnostic::{Diagnostic, DiagnosticKind};
pub use document::RuleDocument;
pub use error::{Error, Result};
pub use patcher::{
    AppliedChange, ApplyReport, Change, FilterMatch, NewRule, PatchOptions, PatchOutcome,
    Preview, apply_to_file, patch, preview,
};
pub use rule::{RuleIndex, RuleText, StyleRule};
pub use scanner::{RuleBlock, Scan, scan};

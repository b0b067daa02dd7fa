//! Style rule extraction.
//!
//! A logical rule reads `<filter> {<actions>} [<type code> <directives>]`.
//! Only two things matter here: the filter expression in front of the first
//! bracket group, and the hexadecimal type code leading a `[...]` group.

use crate::scanner::{RuleBlock, Scan};
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

/// Matches the first square-bracket group led by a hex literal.
static TYPE_CODE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[(0x[0-9a-fA-F]+)[^\]]*\]").expect("Invalid type code regex")
});

/// A logical rule split into its lexical parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleText<'a> {
    /// Trimmed text in front of the first `{`, or the first `[` if the rule
    /// has no `{`.
    pub filter: &'a str,
    /// Everything from that bracket onwards.
    pub directives: &'a str,
    /// Hex literal of the first `[0x..]` group, if any.
    pub type_code: Option<&'a str>,
}

impl<'a> RuleText<'a> {
    /// Splits a logical rule.
    ///
    /// # Example
    /// ```
    /// use style_blocks::RuleText;
    ///
    /// let rule = RuleText::parse("highway=primary [0x02 road_class=3]");
    /// assert_eq!(rule.filter, "highway=primary");
    /// assert_eq!(rule.type_code, Some("0x02"));
    /// ```
    pub fn parse(text: &'a str) -> Self {
        let split = text.find('{').or_else(|| text.find('['));
        let (filter, directives) = match split {
            Some(pos) => (text[..pos].trim(), &text[pos..]),
            None => (text.trim(), ""),
        };
        let type_code = TYPE_CODE_REGEX
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str());

        Self {
            filter,
            directives,
            type_code,
        }
    }
}

/// A rule that carries both a type code and a non-empty filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleRule {
    pub type_code: String,
    pub filter_text: String,
    /// The 1-based line number where the rule block starts.
    pub start_line: usize,
    /// Checksum of the block's logical text.
    pub checksum: String,
}

impl StyleRule {
    /// Extracts a rule from a scanned block.
    ///
    /// Returns `None` when the block has no bracketed hex type code or its
    /// filter text is empty.
    pub fn extract(block: &RuleBlock) -> Option<Self> {
        let text = block.text();
        let parsed = RuleText::parse(&text);
        let type_code = parsed.type_code?;

        if parsed.filter.is_empty() {
            tracing::debug!(line = block.start_line, type_code, "skipping rule without filter");
            return None;
        }

        Some(Self {
            type_code: type_code.to_string(),
            filter_text: parsed.filter.to_string(),
            start_line: block.start_line,
            checksum: block.checksum(),
        })
    }
}

/// Style rules grouped by type code, each group in file order.
#[derive(Debug, Clone, Default)]
pub struct RuleIndex {
    by_type: HashMap<String, Vec<StyleRule>>,
}

impl RuleIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the index from every extractable block of a scan.
    pub fn from_scan(scan: &Scan) -> Self {
        let mut index = Self::new();
        for rule in scan.blocks.iter().filter_map(StyleRule::extract) {
            index.insert(rule);
        }
        tracing::debug!(
            type_codes = index.type_count(),
            rules = index.rule_count(),
            "indexed style rules"
        );
        index
    }

    pub fn insert(&mut self, rule: StyleRule) {
        self.by_type
            .entry(rule.type_code.clone())
            .or_default()
            .push(rule);
    }

    /// Rules for a type code (exact, case-sensitive match).
    pub fn rules_for(&self, type_code: &str) -> &[StyleRule] {
        self.by_type
            .get(type_code)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Number of distinct type codes with at least one rule.
    pub fn type_count(&self) -> usize {
        self.by_type.len()
    }

    pub fn rule_count(&self) -> usize {
        self.by_type.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_type.is_empty()
    }
}

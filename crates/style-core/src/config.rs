//! Tool configuration
//!
//! Loaded from an optional `stylesync.toml` (or `.json` / `.yaml`). Every key
//! has a default, so an empty or missing file is valid.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use style_blocks::PatchOptions;
use style_blocks::patcher::{DEFAULT_NEW_RULE_DIRECTIVES, DEFAULT_NEW_RULES_HEADER};
use style_fs::ConfigStore;

/// Default config file name looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "stylesync.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleSyncConfig {
    /// The style rule file that gets patched
    pub rule_file: PathBuf,
    /// The catalog (TYP source) file
    pub catalog_file: PathBuf,
    /// Snapshot written by extract and used as the apply baseline
    pub snapshot: PathBuf,
    /// The human-edited copy of the snapshot
    pub edited_snapshot: PathBuf,
    pub catalog: CatalogConfig,
    pub rules: RulesConfig,
}

impl Default for StyleSyncConfig {
    fn default() -> Self {
        Self {
            rule_file: PathBuf::from("my-style/lines"),
            catalog_file: PathBuf::from("typ-files/20011.txt"),
            snapshot: PathBuf::from("20011_lines_spreadsheet.csv"),
            edited_snapshot: PathBuf::from("20011_lines_spreadsheet_edited.csv"),
            catalog: CatalogConfig::default(),
            rules: RulesConfig::default(),
        }
    }
}

/// Sentinels delimiting catalog records
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub start_marker: String,
    pub end_marker: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        CatalogSection::Line.config()
    }
}

/// Catalog section kinds of a TYP source file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogSection {
    Line,
    Point,
    Polygon,
}

impl CatalogSection {
    pub fn start_marker(self) -> &'static str {
        match self {
            Self::Line => "[_line]",
            Self::Point => "[_point]",
            Self::Polygon => "[_polygon]",
        }
    }

    pub fn config(self) -> CatalogConfig {
        CatalogConfig {
            start_marker: self.start_marker().to_string(),
            end_marker: "[end]".to_string(),
        }
    }
}

impl FromStr for CatalogSection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "line" | "lines" => Ok(Self::Line),
            "point" | "points" => Ok(Self::Point),
            "polygon" | "polygons" => Ok(Self::Polygon),
            _ => Err(Error::InvalidConfig {
                message: format!("unknown catalog section '{}' (expected line, point or polygon)", s),
            }),
        }
    }
}

/// How rules are written back
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Directives placed after the type code of appended rules
    pub new_rule_directives: String,
    /// Comment written above appended rules; empty disables it
    pub new_rules_header: String,
    /// Record block checksums in snapshots and refuse edits to blocks that
    /// changed since extraction
    pub track_checksums: bool,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            new_rule_directives: DEFAULT_NEW_RULE_DIRECTIVES.to_string(),
            new_rules_header: DEFAULT_NEW_RULES_HEADER.to_string(),
            track_checksums: true,
        }
    }
}

impl RulesConfig {
    pub fn patch_options(&self) -> PatchOptions {
        PatchOptions {
            new_rule_directives: self.new_rule_directives.clone(),
            new_rules_header: Some(self.new_rules_header.clone()).filter(|h| !h.trim().is_empty()),
        }
    }
}

impl StyleSyncConfig {
    /// Load the config from `path`, or from `stylesync.toml` in `dir` when
    /// no path is given. A missing default file yields the defaults; a
    /// missing explicit file is an error.
    pub fn load(path: Option<&Path>, dir: &Path) -> Result<Self> {
        let store = ConfigStore::new();
        match path {
            Some(path) => Ok(store.load(path)?),
            None => Ok(store.load_or_default(&dir.join(CONFIG_FILE_NAME))?),
        }
    }
}

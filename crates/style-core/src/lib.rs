//! Catalog matching, CSV snapshots and change resolution for Style Sync.
//!
//! Two batch workflows sit on top of [`style_blocks`]:
//!
//! - [`extract()`]: scan the rule file, extract catalog records, join them by
//!   type code and write the snapshot table
//! - [`plan()`] then [`apply()`]: diff the baseline snapshot against its
//!   edited copy and patch the rule file in place

pub mod apply;
pub mod catalog;
pub mod config;
pub mod error;
pub mod extract;
pub mod matcher;
pub mod resolver;
pub mod snapshot;

pub use apply::{apply, dry_run, plan, plan_from};
pub use catalog::{CatalogExtractor, CatalogRecord, CatalogScan, MISSING_VALUE};
pub use config::{CONFIG_FILE_NAME, CatalogConfig, CatalogSection, RulesConfig, StyleSyncConfig};
pub use error::{Error, Result};
pub use extract::{ExtractReport, Extraction, extract};
pub use matcher::{MatchRow, NO_MATCH, match_records};
pub use resolver::{Resolution, resolve};
pub use snapshot::{SnapshotRead, read_snapshot, write_snapshot};

//! Filesystem primitives for Style Sync
//!
//! Provides atomic text I/O, timestamped backups, content checksums and
//! format-agnostic configuration loading.

pub mod backup;
pub mod checksum;
pub mod config;
pub mod error;
pub mod io;

pub use backup::{backup_path_for, create_backup, create_backup_at};
pub use checksum::compute_content_checksum;
pub use config::ConfigStore;
pub use error::{Error, Result};

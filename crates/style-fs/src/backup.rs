//! Timestamped sibling backups
//!
//! Before a rule file is rewritten, a byte-identical copy is placed next to
//! it as `<name>.backup_<YYYYMMDD_HHMMSS>`. Backups taken within the same
//! second get a `_1`, `_2`, ... suffix; an existing backup is never replaced.

use crate::{Error, Result};
use chrono::{DateTime, Local, TimeZone};
use std::fs::{File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Timestamp format used in backup file names (second resolution).
pub const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Compute the backup path for `path` at the given instant.
pub fn backup_path_for<Tz: TimeZone>(path: &Path, at: &DateTime<Tz>) -> PathBuf
where
    Tz::Offset: std::fmt::Display,
{
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(format!(".backup_{}", at.format(BACKUP_TIMESTAMP_FORMAT)));
    path.with_file_name(name)
}

/// Copy `path` to a timestamped sibling and return the backup path.
pub fn create_backup(path: &Path) -> Result<PathBuf> {
    create_backup_at(path, &Local::now())
}

/// Copy `path` to a sibling named for `at`, without replacing any file.
///
/// If the timestamped name is taken the first free `_<n>` suffix is used.
pub fn create_backup_at<Tz: TimeZone>(path: &Path, at: &DateTime<Tz>) -> Result<PathBuf>
where
    Tz::Offset: std::fmt::Display,
{
    let mut source = File::open(path).map_err(|e| Error::io(path, e))?;
    let base = backup_path_for(path, at);

    let mut attempt = 0usize;
    let (backup, mut target) = loop {
        let candidate = if attempt == 0 {
            base.clone()
        } else {
            let mut name = base.clone().into_os_string();
            name.push(format!("_{}", attempt));
            PathBuf::from(name)
        };
        match OpenOptions::new().write(true).create_new(true).open(&candidate) {
            Ok(file) => break (candidate, file),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => attempt += 1,
            Err(e) => return Err(Error::io(&candidate, e)),
        }
    };

    std::io::copy(&mut source, &mut target).map_err(|e| Error::io(&backup, e))?;
    target.sync_all().map_err(|e| Error::io(&backup, e))?;

    tracing::info!(source = %path.display(), backup = %backup.display(), "created backup");
    Ok(backup)
}

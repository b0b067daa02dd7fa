//! [`StyleFixture`] builder for Style Sync test scenarios.

use crate::samples;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Default relative location of the rule file.
pub const RULE_FILE: &str = "my-style/lines";
/// Default relative location of the catalog.
pub const CATALOG_FILE: &str = "typ-files/20011.txt";
/// Default relative location of the extracted snapshot.
pub const SNAPSHOT: &str = "20011_lines_spreadsheet.csv";
/// Default relative location of the edited snapshot.
pub const EDITED_SNAPSHOT: &str = "20011_lines_spreadsheet_edited.csv";

/// A temporary working directory laid out like a style project.
///
/// # Example
///
/// ```rust,no_run
/// use style_test_utils::StyleFixture;
///
/// let fixture = StyleFixture::with_samples();
/// fixture.assert_file_contains("my-style/lines", "highway=motorway");
/// ```
pub struct StyleFixture {
    temp_dir: TempDir,
}

impl Default for StyleFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl StyleFixture {
    /// Create an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    /// Create a directory holding [`samples::RULES`] and [`samples::CATALOG`]
    /// at their default locations.
    pub fn with_samples() -> Self {
        let fixture = Self::new();
        fixture.write(RULE_FILE, samples::RULES);
        fixture.write(CATALOG_FILE, samples::CATALOG);
        fixture
    }

    /// Return the root path of the temporary directory.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Absolute path of `rel` inside the fixture.
    pub fn path(&self, rel: &str) -> PathBuf {
        self.root().join(rel)
    }

    /// Write `content` to `rel`, creating parent directories.
    pub fn write(&self, rel: &str, content: &str) -> PathBuf {
        let path = self.path(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    pub fn read(&self, rel: &str) -> String {
        let path = self.path(rel);
        fs::read_to_string(&path)
            .unwrap_or_else(|_| panic!("Could not read file: {}", path.display()))
    }

    /// Copy `from` to `to`, replacing the first occurrence of `find`.
    ///
    /// # Panics
    /// Panics if `find` does not occur in `from`.
    pub fn edit_copy(&self, from: &str, to: &str, find: &str, replace: &str) -> PathBuf {
        let content = self.read(from);
        assert!(
            content.contains(find),
            "{} does not contain {:?}",
            from,
            find
        );
        self.write(to, &content.replacen(find, replace, 1))
    }

    /// Backups of the file at `rel`, sorted by name.
    pub fn backups_of(&self, rel: &str) -> Vec<PathBuf> {
        let path = self.path(rel);
        let dir = path.parent().unwrap_or(self.root());
        let prefix = format!(
            "{}.backup_",
            path.file_name().unwrap_or_default().to_string_lossy()
        );
        let mut backups: Vec<PathBuf> = fs::read_dir(dir)
            .unwrap()
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|p| {
                p.file_name()
                    .is_some_and(|name| name.to_string_lossy().starts_with(&prefix))
            })
            .collect();
        backups.sort();
        backups
    }

    /// Assert that the file at `rel` contains `content`.
    ///
    /// # Panics
    /// Panics if the file cannot be read or does not contain `content`.
    pub fn assert_file_contains(&self, rel: &str, content: &str) {
        let file_content = self.read(rel);
        assert!(
            file_content.contains(content),
            "File {} does not contain expected content.\nExpected: {}\nActual: {}",
            rel,
            content,
            file_content
        );
    }
}

//! Error types for style-core

use std::path::PathBuf;

/// Result type for style-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in style-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A snapshot file could not be read or written as CSV
    #[error("Snapshot error in {path}: {source}")]
    Snapshot {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Snapshot header lacks a required column
    #[error("Snapshot {path} has no '{column}' column")]
    MissingColumn { path: PathBuf, column: String },

    /// Configuration value that cannot be used
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    // Transparent wrappers for underlying crate errors
    /// Filesystem error from style-fs
    #[error(transparent)]
    Fs(#[from] style_fs::Error),

    /// Patching error from style-blocks
    #[error(transparent)]
    Blocks(#[from] style_blocks::Error),
}

impl Error {
    pub fn snapshot(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        Self::Snapshot {
            path: path.into(),
            source,
        }
    }
}

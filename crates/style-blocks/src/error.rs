//! Error types for style-blocks

pub type Result<T> = std::result::Result<T, Error>;

/// Unrecoverable failures. Everything block-level is a [`crate::Diagnostic`].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Filesystem error: {0}")]
    Fs(#[from] style_fs::Error),
}

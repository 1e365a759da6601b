//! Error types for the library layer.
//!
//! Per-document problems (`MalformedHeader`, `Yaml`, `Read`) are recoverable:
//! the index builder records them and moves on. `OutputWrite` is fatal.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, LibraryError>;

#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed metadata header: {0}")]
    MalformedHeader(String),

    #[error("invalid YAML metadata: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid index JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to write index to {}: {source}", path.display())]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config error: {0}")]
    Config(String),
}

impl LibraryError {
    /// Whether this error concerns a single document rather than the build.
    #[must_use]
    pub fn is_document_error(&self) -> bool {
        matches!(
            self,
            Self::Read { .. } | Self::MalformedHeader(_) | Self::Yaml(_)
        )
    }
}

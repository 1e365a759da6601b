//! Reading and writing the snapshot file.

use std::path::Path;

use tracing::info;

use super::models::PromptIndex;
use crate::error::{LibraryError, Result};

/// Write `index` as pretty JSON, creating parent directories as needed.
pub fn write_index(path: impl AsRef<Path>, index: &PromptIndex) -> Result<()> {
    let path = path.as_ref();
    let output_error = |source| LibraryError::OutputWrite {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(output_error)?;
    }

    let json = serde_json::to_string_pretty(index)?;
    std::fs::write(path, json).map_err(output_error)?;

    info!(path = %path.display(), "wrote index");
    Ok(())
}

/// Load a snapshot previously written by [`write_index`].
pub fn read_index(path: impl AsRef<Path>) -> Result<PromptIndex> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path).map_err(|source| LibraryError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&raw)?)
}

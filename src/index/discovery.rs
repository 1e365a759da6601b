//! Finding documents on disk.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

/// Every file under `root` whose extension is `extension`, depth first.
///
/// Entries are visited in file-name order at each level so the result does
/// not depend on filesystem enumeration order. Symlinks are followed; link
/// loops are logged and skipped. A missing root yields nothing.
pub fn discover(root: &Path, extension: &str) -> Vec<PathBuf> {
    if !root.is_dir() {
        debug!(root = %root.display(), "document root not found, treating as empty");
        return Vec::new();
    }

    let extension = extension.trim_start_matches('.');
    let mut files = Vec::new();
    for entry in WalkDir::new(root).follow_links(true).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!(error = %err, "skipping unreadable directory entry");
                continue;
            }
        };
        if entry.file_type().is_file() && has_extension(entry.path(), extension) {
            files.push(entry.into_path());
        }
    }

    debug!(root = %root.display(), count = files.len(), "discovered documents");
    files
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some(extension)
}

/// File name with the document extension removed.
pub fn stem(path: &Path, extension: &str) -> String {
    let extension = extension.trim_start_matches('.');
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    match file_name.strip_suffix(&format!(".{extension}")) {
        Some(stem) => stem.to_string(),
        None => file_name,
    }
}

/// `path` relative to `root`, `/`-separated. Falls back to the full path.
pub fn relative_path(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

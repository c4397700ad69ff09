//! Artifact file discovery.

use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::{IngestError, Result};

/// Lists all JSON files in a directory.
///
/// Returns files sorted by filename.
pub fn list_json_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    let entries = std::fs::read_dir(dir).map_err(|e| IngestError::DirectoryRead {
        path: dir.to_path_buf(),
        source: e,
    })?;

    for entry_result in entries {
        let entry = entry_result.map_err(|e| IngestError::DirectoryRead {
            path: dir.to_path_buf(),
            source: e,
        })?;

        let path = entry.path();

        // Skip directories
        if !path.is_file() {
            continue;
        }

        if is_json(&path) {
            files.push(path);
        }
    }

    // Sort by filename
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    Ok(files)
}

/// Expands files and directories into the list of artifact files to load.
///
/// Directories contribute their `*.json` files (sorted, not recursive);
/// anything else that is not a JSON file is skipped with a warning.
pub fn discover_artifacts(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_dir() {
            files.extend(list_json_files(path)?);
        } else if path.is_file() && is_json(path) {
            files.push(path.clone());
        } else {
            warn!(path = %path.display(), "skipping unsupported path");
        }
    }

    if files.is_empty() {
        return Err(IngestError::NoArtifacts);
    }
    Ok(files)
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

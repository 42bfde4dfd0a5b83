//! Temporary output management.
//!
//! The encoder never writes to a destination directly. It writes to a
//! sibling named `<stem>.pptfix-tmp-XXXXXX.mp4`, which is renamed onto the
//! destination once the encode succeeded. The `tempfile` crate's
//! [`TempPath`] removes the temporary file when dropped, so failed encodes
//! clean up after themselves on every exit path.

use crate::config::OUTPUT_EXTENSION;
use crate::error::CoreResult;

use std::path::{Path, PathBuf};
use tempfile::{Builder as TempFileBuilder, TempPath};

/// Marker embedded in every temporary output name.
pub const TEMP_MARKER: &str = ".pptfix-tmp-";

/// Reserves a unique temporary path next to `destination`.
///
/// The placeholder file created to reserve the name is removed again so the
/// encoder creates the real file with ordinary permissions. The returned
/// guard deletes whatever exists at the path when dropped.
pub fn create_temp_output(destination: &Path) -> CoreResult<TempPath> {
    let dir = destination
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let stem = destination
        .file_stem()
        .map_or_else(|| "output".into(), |s| s.to_string_lossy());

    let temp_path = TempFileBuilder::new()
        .prefix(&format!("{stem}{TEMP_MARKER}"))
        .suffix(&format!(".{OUTPUT_EXTENSION}"))
        .tempfile_in(dir)?
        .into_temp_path();
    std::fs::remove_file(&temp_path)?;

    Ok(temp_path)
}

/// Whether `path` looks like a temporary output of this tool.
#[must_use]
pub fn is_temp_artifact(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|name| {
            name.contains(TEMP_MARKER) && name.ends_with(&format!(".{OUTPUT_EXTENSION}"))
        })
}

/// Removes temporary outputs left in `dir` by an interrupted earlier run.
///
/// Only the top level of `dir` is examined. Files that cannot be removed
/// are logged and left alone. Returns the paths that were removed.
pub fn sweep_orphaned_temp_files(dir: &Path) -> CoreResult<Vec<PathBuf>> {
    let mut removed = Vec::new();
    if !dir.is_dir() {
        return Ok(removed);
    }

    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() || !is_temp_artifact(&path) {
            continue;
        }
        match std::fs::remove_file(&path) {
            Ok(()) => {
                log::debug!("Removed leftover temporary file: {}", path.display());
                removed.push(path);
            }
            Err(e) => log::warn!(
                "Could not remove leftover temporary file {}: {}",
                path.display(),
                e
            ),
        }
    }

    removed.sort();
    Ok(removed)
}

//! File discovery module for finding video files to process.
//!
//! Scans an input directory (optionally recursively) for files whose
//! extension is in [`SUPPORTED_EXTENSIONS`], compared case-insensitively.
//! Results are sorted by path so repeated runs see the same order.

use crate::config::{OUTPUT_EXTENSION, SUPPORTED_EXTENSIONS};
use crate::error::{CoreError, CoreResult};
use crate::utils::display_name;

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A discovered input file.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct SourceFile {
    pub path: PathBuf,
    /// Extension as found on disk (original case, no dot)
    pub extension: String,
}

impl SourceFile {
    /// Wraps `path` if its extension is supported.
    pub fn from_path(path: PathBuf) -> Option<Self> {
        let extension = supported_extension(&path)?.to_string();
        Some(Self { path, extension })
    }

    /// File name for display, lossily converted.
    pub fn file_name(&self) -> String {
        display_name(&self.path)
    }

    /// Destination inside `output_dir`: the source stem plus `.mp4`.
    pub fn output_path(&self, output_dir: &Path) -> PathBuf {
        output_path_for(&self.path, output_dir)
    }
}

/// Builds `<output_dir>/<stem>.mp4` for `source`.
///
/// The stem keeps any inner dots ("talk.v2.mov" becomes "talk.v2.mp4").
pub fn output_path_for(source: &Path, output_dir: &Path) -> PathBuf {
    let stem = source
        .file_stem()
        .unwrap_or_else(|| OsStr::new("output"))
        .to_string_lossy();
    output_dir.join(format!("{stem}.{OUTPUT_EXTENSION}"))
}

/// Returns the extension of `path` if it is one of [`SUPPORTED_EXTENSIONS`].
fn supported_extension(path: &Path) -> Option<&str> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|supported| ext.eq_ignore_ascii_case(supported))
        })
}

/// Finds supported video files under `input_dir`.
///
/// Only the top level is scanned unless `recursive` is set. Symlinked
/// files are followed, symlinked directories are not. An empty result is
/// not an error here; deciding what "nothing to do" means is left to the
/// caller.
///
/// # Errors
///
/// * `CoreError::DirectoryNotFound` - `input_dir` does not exist
/// * `CoreError::PathError` - `input_dir` is not a directory
/// * `CoreError::Walkdir` - the directory could not be read
///
/// # Examples
///
/// ```rust,no_run
/// use pptfix_core::find_processable_files;
/// use std::path::Path;
///
/// let files = find_processable_files(Path::new("data/input"), false).unwrap();
/// for file in &files {
///     println!("{}", file.path.display());
/// }
/// ```
pub fn find_processable_files(input_dir: &Path, recursive: bool) -> CoreResult<Vec<SourceFile>> {
    if !input_dir.exists() {
        return Err(CoreError::DirectoryNotFound(input_dir.to_path_buf()));
    }
    if !input_dir.is_dir() {
        return Err(CoreError::PathError(format!(
            "{} is not a directory",
            input_dir.display()
        )));
    }

    let walker = if recursive {
        WalkDir::new(input_dir).min_depth(1)
    } else {
        WalkDir::new(input_dir).min_depth(1).max_depth(1)
    };

    let mut files = Vec::new();
    let mut skipped = 0usize;
    for entry in walker {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        match SourceFile::from_path(path.to_path_buf()) {
            Some(file) => files.push(file),
            None => skipped += 1,
        }
    }

    files.sort();

    if skipped > 0 {
        log::debug!(
            "Skipped {} unsupported files in {}",
            skipped,
            input_dir.display()
        );
    }
    log::debug!("Found {} video files in {}", files.len(), input_dir.display());

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_path_keeps_inner_dots() {
        let out = Path::new("/out");
        assert_eq!(
            output_path_for(Path::new("/in/talk.v2.mov"), out),
            PathBuf::from("/out/talk.v2.mp4")
        );
        assert_eq!(
            output_path_for(Path::new("/in/CLIP.MP4"), out),
            PathBuf::from("/out/CLIP.mp4")
        );
    }

    #[test]
    fn extension_match_ignores_case() {
        assert!(SourceFile::from_path(PathBuf::from("a.MoV")).is_some());
        assert!(SourceFile::from_path(PathBuf::from("a.ts")).is_some());
        assert!(SourceFile::from_path(PathBuf::from("a.txt")).is_none());
        assert!(SourceFile::from_path(PathBuf::from("mov")).is_none());
    }

    #[test]
    fn source_file_keeps_original_extension_case() {
        let file = SourceFile::from_path(PathBuf::from("dir/Intro.AVI")).unwrap();
        assert_eq!(file.extension, "AVI");
        assert_eq!(file.file_name(), "Intro.AVI");
    }
}

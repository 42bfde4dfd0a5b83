// pptfix-core/tests/discovery_tests.rs

use pptfix_core::discovery::{find_processable_files, output_path_for};
use pptfix_core::error::CoreError;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn names(files: &[pptfix_core::SourceFile]) -> Vec<String> {
    files.iter().map(|f| f.file_name()).collect()
}

#[test]
fn test_find_processable_files_filters_and_sorts() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let input_dir = dir.path();

    // Created out of order on purpose.
    File::create(input_dir.join("b.avi"))?;
    File::create(input_dir.join("note.txt"))?;
    File::create(input_dir.join("a.mov"))?;
    File::create(input_dir.join("C.MKV"))?;
    File::create(input_dir.join("image.jpg"))?;
    File::create(input_dir.join("noextension"))?;

    let files = find_processable_files(input_dir, false)?;

    assert_eq!(names(&files), vec!["C.MKV", "a.mov", "b.avi"]);
    assert_eq!(files[0].extension, "MKV");
    Ok(())
}

#[test]
fn test_find_processable_files_recursion() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let input_dir = dir.path();

    File::create(input_dir.join("top.mp4"))?;
    fs::create_dir_all(input_dir.join("sub").join("deeper"))?;
    File::create(input_dir.join("sub").join("mid.webm"))?;
    File::create(input_dir.join("sub").join("deeper").join("low.ts"))?;
    // A directory with a video-like name is not a file.
    fs::create_dir(input_dir.join("folder.mov"))?;

    let flat = find_processable_files(input_dir, false)?;
    assert_eq!(names(&flat), vec!["top.mp4"]);

    let deep = find_processable_files(input_dir, true)?;
    let relative: Vec<PathBuf> = deep
        .iter()
        .map(|f| f.path.strip_prefix(input_dir).unwrap().to_path_buf())
        .collect();
    assert_eq!(
        relative,
        vec![
            Path::new("sub").join("deeper").join("low.ts"),
            Path::new("sub").join("mid.webm"),
            PathBuf::from("top.mp4"),
        ]
    );
    Ok(())
}

#[test]
fn test_find_processable_files_empty_is_ok() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    File::create(dir.path().join("document.txt"))?;

    let files = find_processable_files(dir.path(), true)?;
    assert!(files.is_empty());
    Ok(())
}

#[test]
fn test_find_processable_files_nonexistent_dir() {
    let missing = PathBuf::from("surely_this_does_not_exist_42_integration");
    match find_processable_files(&missing, false) {
        Err(CoreError::DirectoryNotFound(path)) => assert_eq!(path, missing),
        other => panic!("Unexpected result: {other:?}"),
    }
}

#[test]
fn test_output_path_keeps_inner_dots() {
    let out = Path::new("out");
    assert_eq!(output_path_for(Path::new("in/talk.v2.mov"), out), out.join("talk.v2.mp4"));
    assert_eq!(output_path_for(Path::new("in/clip.MP4"), out), out.join("clip.mp4"));
}

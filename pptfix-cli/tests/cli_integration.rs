use assert_cmd::Command;
use predicates::str::contains;
use std::error::Error;
use std::fs;
use tempfile::tempdir;

// Helper function to get the path to the compiled binary
fn pptfix_cmd() -> Command {
    let mut cmd = Command::cargo_bin("pptfix").expect("Failed to find pptfix binary");
    // Keep the caller's environment from supplying directories.
    cmd.env_remove("PPTFIX_INPUT").env_remove("PPTFIX_OUTPUT");
    cmd
}

#[test]
fn test_help_lists_subcommands() {
    pptfix_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("convert"))
        .stdout(contains("verify"));
}

#[test]
fn test_convert_help_shows_defaults() {
    pptfix_cmd()
        .args(["convert", "--help"])
        .assert()
        .success()
        .stdout(contains("data/input"))
        .stdout(contains("160k"))
        .stdout(contains("PPTFIX_INPUT"));
}

#[test]
fn test_crf_out_of_range_is_rejected_before_running() -> Result<(), Box<dyn Error>> {
    let work = tempdir()?;
    let output_dir = work.path().join("out");

    pptfix_cmd()
        .args(["convert", "--crf", "40", "-i"])
        .arg(work.path())
        .arg("-o")
        .arg(&output_dir)
        .assert()
        .code(2)
        .stderr(contains("--crf"));

    // Nothing was touched.
    assert!(!output_dir.exists());
    Ok(())
}

#[test]
fn test_zero_max_width_is_rejected() {
    pptfix_cmd()
        .args(["convert", "--max-width", "0"])
        .assert()
        .code(2);
}

#[test]
fn test_invalid_audio_bitrate_is_critical() -> Result<(), Box<dyn Error>> {
    let work = tempdir()?;

    pptfix_cmd()
        .args(["convert", "--audio-bitrate", "loud", "-i"])
        .arg(work.path())
        .arg("-o")
        .arg(work.path().join("out"))
        .assert()
        .code(2)
        .stderr(contains("Critical error:"))
        .stderr(contains("Invalid audio bitrate"));
    Ok(())
}

#[test]
fn test_missing_input_directory_is_fatal() -> Result<(), Box<dyn Error>> {
    let work = tempdir()?;

    // Whether ffmpeg is installed or not, this cannot succeed: either the
    // encoder or the input directory is missing.
    pptfix_cmd()
        .args(["convert", "-i"])
        .arg(work.path().join("missing"))
        .arg("-o")
        .arg(work.path().join("out"))
        .assert()
        .code(2)
        .stderr(contains("Critical error:"));
    Ok(())
}

#[test]
fn test_verify_missing_directory_is_fatal() -> Result<(), Box<dyn Error>> {
    let work = tempdir()?;

    pptfix_cmd()
        .args(["verify", "-o"])
        .arg(work.path().join("missing"))
        .assert()
        .code(2)
        .stderr(contains("Critical error:"));
    Ok(())
}

#[test]
fn test_log_dir_receives_run_log() -> Result<(), Box<dyn Error>> {
    let work = tempdir()?;
    let log_dir = work.path().join("logs");

    pptfix_cmd()
        .arg("--log-dir")
        .arg(&log_dir)
        .args(["convert", "--audio-bitrate", "loud"])
        .assert()
        .code(2);

    let logs: Vec<_> = fs::read_dir(&log_dir)?
        .map(|e| e.map(|e| e.path()))
        .collect::<Result<_, _>>()?;
    assert_eq!(logs.len(), 1);

    let name = logs[0].file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("pptfix_run_") && name.ends_with(".log"), "{name}");

    let content = fs::read_to_string(&logs[0])?;
    assert!(content.contains("[ERROR] Critical error:"), "{content}");
    Ok(())
}

#[test]
fn test_unknown_subcommand_is_usage_error() {
    pptfix_cmd().arg("encode").assert().code(2);
}

#[test]
fn test_bare_invocation_runs_convert() -> Result<(), Box<dyn Error>> {
    let work = tempdir()?;

    // A usage error would not say "Critical error:"; only a convert run does.
    pptfix_cmd()
        .env("PPTFIX_INPUT", work.path().join("missing"))
        .env("PPTFIX_OUTPUT", work.path().join("out"))
        .assert()
        .code(2)
        .stderr(contains("Critical error:"));
    Ok(())
}

#[test]
fn test_max_width_of_one_is_rejected() {
    pptfix_cmd()
        .args(["convert", "--max-width", "1"])
        .assert()
        .code(2)
        .stderr(contains("--max-width"));
}

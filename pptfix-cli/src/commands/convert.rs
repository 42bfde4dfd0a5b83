//! Implementation of the 'convert' subcommand.
//!
//! Builds the run configuration from the arguments, runs the batch and,
//! unless disabled, the compatibility check over the output directory.
//! The exit status reflects the batch only; the check is informational.

use super::make_reporter;
use crate::cli::ConvertArgs;
use crate::error::{CliResult, EXIT_FAILURES, EXIT_SUCCESS};

use pptfix_core::{
    BatchRunner, CoreError, CrateFfprobeExecutor, RunConfig, RunConfigBuilder, SidecarSpawner,
    verify_directory,
};

use log::debug;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

/// Creates a RunConfig from CLI arguments.
pub fn create_run_config(args: &ConvertArgs) -> CliResult<RunConfig> {
    RunConfigBuilder::new()
        .input_dir(&args.input_dir)
        .output_dir(&args.output_dir)
        .recursive(args.recursive)
        .overwrite(args.overwrite)
        .quality(args.crf)
        .audio_bitrate(args.audio_bitrate.as_str())
        .max_resolution(args.max_width, args.max_height)
        .quiet(args.quiet)
        .build()
}

/// Main entry point for the convert command.
pub fn run_convert(args: ConvertArgs, interrupt: Arc<AtomicBool>) -> CliResult<u8> {
    let config = create_run_config(&args)?;
    debug!("Run configuration: {config:?}");

    let reporter = make_reporter(args.progress_json);
    let runner = BatchRunner::new(SidecarSpawner, CrateFfprobeExecutor::new(), reporter.clone())
        .with_interrupt_flag(Arc::clone(&interrupt));
    let summary = runner.run(&config)?;

    if args.no_verify {
        debug!("Compatibility check skipped (--no-verify)");
    } else {
        match verify_directory(
            &CrateFfprobeExecutor::new(),
            reporter.as_ref(),
            &config.output_dir,
            Some(&interrupt),
        ) {
            Ok(report) => debug!(
                "Compatibility check: {} passed, {} failed",
                report.passed_count(),
                report.failed_count()
            ),
            Err(CoreError::NoFilesFound(dir)) => {
                reporter.warning(&format!("No MP4 files found in {}", dir.display()));
            }
            Err(CoreError::Interrupted) => return Err(CoreError::Interrupted),
            Err(e) => reporter.warning(&format!("Compatibility check could not run: {e}")),
        }
    }

    Ok(if summary.has_failures() {
        EXIT_FAILURES
    } else {
        EXIT_SUCCESS
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;

    fn parse(args: &[&str]) -> ConvertArgs {
        let mut argv = vec!["pptfix", "convert"];
        argv.extend_from_slice(args);
        match Cli::parse_from(argv).command {
            Some(Commands::Convert(args)) => args,
            other => panic!("Expected convert command, got {other:?}"),
        }
    }

    #[test]
    fn test_config_from_args() {
        let args = parse(&["-i", "in", "-o", "out", "--crf", "28", "--max-width", "1280"]);
        let config = create_run_config(&args).unwrap();

        assert_eq!(config.input_dir, std::path::PathBuf::from("in"));
        assert_eq!(config.output_dir, std::path::PathBuf::from("out"));
        assert_eq!(config.quality, 28);
        assert_eq!(config.max_width, 1280);
        assert_eq!(config.max_height, pptfix_core::config::DEFAULT_MAX_HEIGHT);
    }

    #[test]
    fn test_bad_bitrate_is_config_error() {
        let args = parse(&["--audio-bitrate", "loud"]);
        let err = create_run_config(&args).unwrap_err();
        assert!(matches!(err, CoreError::Config(_)));
        assert_eq!(err.exit_code(), 2);
    }
}

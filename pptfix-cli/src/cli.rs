// pptfix-cli/src/cli.rs
//
// Defines the command-line argument structures using clap.

use clap::{Args, Command, FromArgMatches, Parser, Subcommand};
use pptfix_core::config::{
    DEFAULT_AUDIO_BITRATE, DEFAULT_INPUT_DIR, DEFAULT_MAX_HEIGHT, DEFAULT_MAX_WIDTH,
    DEFAULT_OUTPUT_DIR, DEFAULT_QUALITY, MIN_DIMENSION, QUALITY_RANGE,
};
use std::path::PathBuf;

// --- CLI Argument Definition ---

#[derive(Parser, Debug)]
#[command(
    author,
    version, // Reads from Cargo.toml via "cargo" feature in clap
    about = "pptfix: PowerPoint-compatible video re-encoder",
    long_about = "Re-encodes a directory of videos to H.264 High@4.1 / yuv420p / AAC-LC MP4 \
                  using ffmpeg, then checks the results with ffprobe."
)]
pub struct Cli {
    /// Subcommand to run; `convert` with its defaults when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable debug output (ffmpeg command lines, probe results)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Also write a timestamped log file into this directory
    #[arg(long, global = true, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Converts every supported video in the input directory
    Convert(ConvertArgs),
    /// Checks the .mp4 files in a directory for PowerPoint compatibility
    Verify(VerifyArgs),
}

#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Directory containing the source videos
    #[arg(
        short = 'i',
        long = "input",
        value_name = "DIR",
        env = "PPTFIX_INPUT",
        default_value = DEFAULT_INPUT_DIR
    )]
    pub input_dir: PathBuf,

    /// Directory where converted .mp4 files are written
    #[arg(
        short = 'o',
        long = "output",
        value_name = "DIR",
        env = "PPTFIX_OUTPUT",
        default_value = DEFAULT_OUTPUT_DIR
    )]
    pub output_dir: PathBuf,

    /// Scan subdirectories of the input directory too
    #[arg(short, long)]
    pub recursive: bool,

    /// Replace existing outputs instead of skipping them
    #[arg(long)]
    pub overwrite: bool,

    /// x264 constant rate factor (lower is better quality)
    #[arg(long, value_name = "N", default_value_t = DEFAULT_QUALITY, value_parser = parse_crf)]
    pub crf: u8,

    /// AAC audio bitrate passed to ffmpeg
    #[arg(long, value_name = "RATE", default_value = DEFAULT_AUDIO_BITRATE)]
    pub audio_bitrate: String,

    /// Downscale clips wider than this
    #[arg(long, value_name = "PX", default_value_t = DEFAULT_MAX_WIDTH,
          value_parser = clap::value_parser!(u32).range(i64::from(MIN_DIMENSION)..))]
    pub max_width: u32,

    /// Downscale clips taller than this
    #[arg(long, value_name = "PX", default_value_t = DEFAULT_MAX_HEIGHT,
          value_parser = clap::value_parser!(u32).range(i64::from(MIN_DIMENSION)..))]
    pub max_height: u32,

    /// Suppress encoder progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Skip the compatibility check after converting
    #[arg(long)]
    pub no_verify: bool,

    /// Emit progress as JSON lines on stdout
    #[arg(long)]
    pub progress_json: bool,
}

#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Directory containing the .mp4 files to check
    #[arg(
        short = 'o',
        long = "output",
        value_name = "DIR",
        env = "PPTFIX_OUTPUT",
        default_value = DEFAULT_OUTPUT_DIR
    )]
    pub output_dir: PathBuf,

    /// Emit results as JSON lines on stdout
    #[arg(long)]
    pub progress_json: bool,
}

impl Cli {
    /// The subcommand to run. A bare `pptfix` converts with the default
    /// (or environment supplied) directories and settings.
    pub fn command_or_default(&mut self) -> Result<Commands, clap::Error> {
        match self.command.take() {
            Some(command) => Ok(command),
            None => ConvertArgs::with_defaults().map(Commands::Convert),
        }
    }
}

impl ConvertArgs {
    /// `convert` arguments as if none were given on the command line.
    pub fn with_defaults() -> Result<Self, clap::Error> {
        let matches = Self::augment_args(Command::new("convert")).try_get_matches_from(["convert"])?;
        Self::from_arg_matches(&matches)
    }
}

fn parse_crf(value: &str) -> Result<u8, String> {
    let crf: u8 = value
        .parse()
        .map_err(|_| format!("'{value}' is not a whole number"))?;
    if QUALITY_RANGE.contains(&crf) {
        Ok(crf)
    } else {
        Err(format!(
            "must be between {} and {}",
            QUALITY_RANGE.start(),
            QUALITY_RANGE.end()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    fn convert_args(cli: Cli) -> ConvertArgs {
        match cli.command {
            Some(Commands::Convert(args)) => args,
            other => panic!("Expected convert command, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_convert_flags() {
        let cli = Cli::parse_from([
            "pptfix",
            "--verbose",
            "convert",
            "-i",
            "clips",
            "-o",
            "out",
            "-r",
            "--overwrite",
            "--crf",
            "18",
            "--audio-bitrate",
            "192k",
            "--max-width",
            "1280",
            "--max-height",
            "720",
            "--quiet",
            "--no-verify",
        ]);
        assert!(cli.verbose);
        let args = convert_args(cli);

        assert_eq!(args.input_dir, PathBuf::from("clips"));
        assert_eq!(args.output_dir, PathBuf::from("out"));
        assert!(args.recursive && args.overwrite && args.quiet && args.no_verify);
        assert_eq!(args.crf, 18);
        assert_eq!(args.audio_bitrate, "192k");
        assert_eq!((args.max_width, args.max_height), (1280, 720));
        assert!(!args.progress_json);
    }

    #[test]
    fn test_crf_range_is_enforced() {
        for bad in ["17", "36", "40", "abc"] {
            let err = Cli::try_parse_from(["pptfix", "convert", "--crf", bad]).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::ValueValidation, "crf {bad}");
        }
        let ok = Cli::try_parse_from(["pptfix", "convert", "--crf", "35"]).unwrap();
        assert_eq!(convert_args(ok).crf, 35);
    }

    #[test]
    fn test_max_size_below_two_is_rejected() {
        for (flag, value) in [("--max-width", "0"), ("--max-width", "1"), ("--max-height", "1")] {
            let err = Cli::try_parse_from(["pptfix", "convert", flag, value]).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::ValueValidation, "{flag} {value}");
        }
        let ok = Cli::try_parse_from(["pptfix", "convert", "--max-width", "2"]).unwrap();
        assert!(matches!(ok.command, Some(Commands::Convert(ref args)) if args.max_width == 2));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["pptfix", "verify", "-o", "out", "--log-dir", "logs", "-v"]);
        assert!(cli.verbose);
        assert_eq!(cli.log_dir, Some(PathBuf::from("logs")));
        match cli.command {
            Some(Commands::Verify(args)) => assert_eq!(args.output_dir, PathBuf::from("out")),
            other => panic!("Expected verify command, got {other:?}"),
        }
    }

    #[test]
    fn test_bare_invocation_converts_with_defaults() {
        let mut cli = Cli::parse_from(["pptfix", "-v"]);
        assert!(cli.command.is_none());

        match cli.command_or_default().unwrap() {
            Commands::Convert(args) => {
                assert_eq!(args.crf, DEFAULT_QUALITY);
                assert_eq!(args.audio_bitrate, DEFAULT_AUDIO_BITRATE);
                assert_eq!((args.max_width, args.max_height), (DEFAULT_MAX_WIDTH, DEFAULT_MAX_HEIGHT));
                assert!(!args.recursive && !args.overwrite && !args.no_verify);
            }
            other => panic!("Expected convert command, got {other:?}"),
        }
    }
}

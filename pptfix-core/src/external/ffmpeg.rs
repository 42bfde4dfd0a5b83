//! FFmpeg command building for the PowerPoint-compatible profile.
//!
//! The codec settings are fixed: H.264 High@4.1 in yuv420p, AAC-LC audio,
//! and the moov atom moved to the front of the file. Only the quality
//! factor, audio bitrate, frame rate and target size vary per file.

use crate::processing::geometry::Dimensions;

use ffmpeg_sidecar::command::FfmpegCommand;
use std::path::PathBuf;

pub const VIDEO_CODEC: &str = "libx264";
pub const VIDEO_PRESET: &str = "medium";
pub const VIDEO_PROFILE: &str = "high";
pub const VIDEO_LEVEL: &str = "4.1";
pub const PIXEL_FORMAT: &str = "yuv420p";
pub const AUDIO_CODEC: &str = "aac";

/// Parameters for one encode.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodeParams {
    pub input_path: PathBuf,
    /// Temporary path the encoder writes to
    pub output_path: PathBuf,
    /// x264 CRF
    pub quality: u8,
    pub audio_bitrate: String,
    pub frame_rate: f64,
    /// Target size when the source has to be downscaled
    pub scale: Option<Dimensions>,
}

/// Builds the ffmpeg invocation for `params`.
///
/// Produces
/// `-hide_banner -y -i IN -map 0:v:0 -map 0:a:0? [-vf scale=W:H] -c:v libx264
/// -preset medium -crf Q -profile:v high -level 4.1 -pix_fmt yuv420p -r FPS
/// -c:a aac -b:a RATE -movflags +faststart OUT`.
#[must_use]
pub fn build_encode_command(params: &EncodeParams) -> FfmpegCommand {
    let mut cmd = FfmpegCommand::new();
    cmd.arg("-hide_banner");
    cmd.arg("-y");
    cmd.input(params.input_path.to_string_lossy().as_ref());

    // First video stream and, if there is one, first audio stream.
    cmd.args(["-map", "0:v:0"]);
    cmd.args(["-map", "0:a:0?"]);

    if let Some(size) = params.scale {
        cmd.args(["-vf", &format!("scale={}:{}", size.width, size.height)]);
    }

    cmd.args(["-c:v", VIDEO_CODEC]);
    cmd.args(["-preset", VIDEO_PRESET]);
    cmd.args(["-crf", &params.quality.to_string()]);
    cmd.args(["-profile:v", VIDEO_PROFILE]);
    cmd.args(["-level", VIDEO_LEVEL]);
    cmd.args(["-pix_fmt", PIXEL_FORMAT]);
    cmd.args(["-r", &format_frame_rate(params.frame_rate)]);

    cmd.args(["-c:a", AUDIO_CODEC]);
    cmd.args(["-b:a", &params.audio_bitrate]);

    cmd.args(["-movflags", "+faststart"]);

    cmd.output(params.output_path.to_string_lossy().as_ref());
    cmd
}

/// Formats a frame rate with at most three decimals ("30", "29.97").
#[must_use]
pub fn format_frame_rate(rate: f64) -> String {
    let formatted = format!("{rate:.3}");
    formatted
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args_of(cmd: &FfmpegCommand) -> Vec<String> {
        cmd.get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    fn value_after<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
        args.iter()
            .position(|a| a == flag)
            .and_then(|i| args.get(i + 1))
            .map(String::as_str)
    }

    fn params() -> EncodeParams {
        EncodeParams {
            input_path: PathBuf::from("/in/a.mov"),
            output_path: PathBuf::from("/out/a.pptfix-tmp-x.mp4"),
            quality: 22,
            audio_bitrate: "160k".to_string(),
            frame_rate: 30.0,
            scale: None,
        }
    }

    #[test]
    fn fixed_profile_arguments() {
        let args = args_of(&build_encode_command(&params()));

        assert_eq!(value_after(&args, "-i"), Some("/in/a.mov"));
        assert_eq!(value_after(&args, "-c:v"), Some("libx264"));
        assert_eq!(value_after(&args, "-crf"), Some("22"));
        assert_eq!(value_after(&args, "-profile:v"), Some("high"));
        assert_eq!(value_after(&args, "-level"), Some("4.1"));
        assert_eq!(value_after(&args, "-pix_fmt"), Some("yuv420p"));
        assert_eq!(value_after(&args, "-r"), Some("30"));
        assert_eq!(value_after(&args, "-c:a"), Some("aac"));
        assert_eq!(value_after(&args, "-b:a"), Some("160k"));
        assert_eq!(value_after(&args, "-movflags"), Some("+faststart"));
        assert_eq!(args.last().map(String::as_str), Some("/out/a.pptfix-tmp-x.mp4"));
        assert!(!args.iter().any(|a| a == "-vf"));
    }

    #[test]
    fn scale_filter_only_when_downscaling() {
        let mut p = params();
        p.scale = Some(Dimensions::new(1280, 720));
        let args = args_of(&build_encode_command(&p));
        assert_eq!(value_after(&args, "-vf"), Some("scale=1280:720"));
    }

    #[test]
    fn frame_rate_formatting() {
        assert_eq!(format_frame_rate(30.0), "30");
        assert_eq!(format_frame_rate(25.0), "25");
        assert_eq!(format_frame_rate(30000.0 / 1001.0), "29.97");
        assert_eq!(format_frame_rate(23.976), "23.976");
    }
}

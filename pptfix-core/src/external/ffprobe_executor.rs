//! FFprobe integration for source inspection and output verification.
//!
//! Two questions are asked of ffprobe: the geometry and frame rate of a
//! source clip before it is encoded, and the codec attributes of the first
//! video or audio stream of a produced file.

use super::check_dependency;
use crate::error::{CoreError, CoreResult, command_failed_error, command_start_error};
use crate::utils::parse_frame_rate;

use ffprobe::{FfProbe, FfProbeError, Stream, ffprobe};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// Geometry and timing of a source clip.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VideoProperties {
    pub width: u32,
    pub height: u32,
    /// None when ffprobe reports no usable rate (e.g. "0/0")
    pub frame_rate: Option<f64>,
    pub duration_secs: Option<f64>,
}

/// Which stream of a file to probe. Always the first one of that kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamSelector {
    Video,
    Audio,
}

impl StreamSelector {
    /// ffprobe `codec_type` value for this selector.
    #[must_use]
    pub fn codec_type(self) -> &'static str {
        match self {
            StreamSelector::Video => "video",
            StreamSelector::Audio => "audio",
        }
    }

    /// Attribute names reported for this kind of stream.
    #[must_use]
    pub fn attribute_names(self) -> &'static [&'static str] {
        match self {
            StreamSelector::Video => &["codec_name", "profile", "level", "pix_fmt"],
            StreamSelector::Audio => &["codec_name", "profile"],
        }
    }
}

impl fmt::Display for StreamSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.codec_type())
    }
}

/// Attribute name to value, as ffprobe reports them. Absent attributes are
/// left out rather than stored empty.
pub type StreamAttributes = BTreeMap<String, String>;

/// Trait for the media prober.
pub trait FfprobeExecutor {
    /// Fails with `CoreError::DependencyNotFound` when ffprobe cannot run.
    fn ensure_available(&self) -> CoreResult<()>;

    /// Reads dimensions, frame rate and duration of the first video stream.
    fn get_video_properties(&self, input_path: &Path) -> CoreResult<VideoProperties>;

    /// Reads the codec attributes of the first stream matching `selector`.
    fn probe_stream(&self, input_path: &Path, selector: StreamSelector)
    -> CoreResult<StreamAttributes>;
}

/// `FfprobeExecutor` backed by the `ffprobe` crate.
#[derive(Debug, Clone, Default)]
pub struct CrateFfprobeExecutor;

impl CrateFfprobeExecutor {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl FfprobeExecutor for CrateFfprobeExecutor {
    fn ensure_available(&self) -> CoreResult<()> {
        check_dependency("ffprobe")
    }

    fn get_video_properties(&self, input_path: &Path) -> CoreResult<VideoProperties> {
        log::debug!("Running ffprobe for video properties on: {}", input_path.display());
        let metadata = ffprobe(input_path).map_err(|e| map_ffprobe_error(e, "video properties"))?;
        video_properties_from(&metadata, input_path)
    }

    fn probe_stream(
        &self,
        input_path: &Path,
        selector: StreamSelector,
    ) -> CoreResult<StreamAttributes> {
        log::debug!("Running ffprobe for {} stream on: {}", selector, input_path.display());
        let metadata =
            ffprobe(input_path).map_err(|e| map_ffprobe_error(e, selector.codec_type()))?;
        let stream = first_stream(&metadata, selector).ok_or_else(|| {
            CoreError::VideoInfoError(format!(
                "No {} stream found in {}",
                selector,
                input_path.display()
            ))
        })?;
        let attributes = stream_attributes(stream, selector);
        log::debug!("{} attributes for {}: {:?}", selector, input_path.display(), attributes);
        Ok(attributes)
    }
}

fn first_stream(metadata: &FfProbe, selector: StreamSelector) -> Option<&Stream> {
    metadata
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some(selector.codec_type()))
}

fn stream_attributes(stream: &Stream, selector: StreamSelector) -> StreamAttributes {
    let mut attributes = StreamAttributes::new();
    let mut insert = |name: &str, value: Option<String>| {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            attributes.insert(name.to_string(), value);
        }
    };

    insert("codec_name", stream.codec_name.clone());
    insert("profile", stream.profile.clone());
    if selector == StreamSelector::Video {
        insert("level", stream.level.map(|l| l.to_string()));
        insert("pix_fmt", stream.pix_fmt.clone());
    }
    attributes
}

fn video_properties_from(metadata: &FfProbe, input_path: &Path) -> CoreResult<VideoProperties> {
    let video_stream = first_stream(metadata, StreamSelector::Video).ok_or_else(|| {
        CoreError::VideoInfoError(format!("No video stream found in {}", input_path.display()))
    })?;

    let (width, height) = match (video_stream.width, video_stream.height) {
        (Some(w), Some(h)) if w > 0 && h > 0 => (w as u32, h as u32),
        (w, h) => {
            return Err(CoreError::VideoInfoError(format!(
                "Invalid dimensions in {}: width={:?}, height={:?}",
                input_path.display(),
                w,
                h
            )));
        }
    };

    let frame_rate = parse_frame_rate(&video_stream.avg_frame_rate)
        .or_else(|| parse_frame_rate(&video_stream.r_frame_rate));

    let duration_secs = metadata
        .format
        .duration
        .as_deref()
        .and_then(|d| d.parse::<f64>().ok())
        .filter(|d| *d > 0.0);

    Ok(VideoProperties {
        width,
        height,
        frame_rate,
        duration_secs,
    })
}

fn map_ffprobe_error(err: FfProbeError, context: &str) -> CoreError {
    match err {
        FfProbeError::Io(io_err) => command_start_error(format!("ffprobe ({context})"), io_err),
        FfProbeError::Status(output) => {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            command_failed_error(format!("ffprobe ({context})"), output.status, stderr)
        }
        FfProbeError::Deserialize(err) => {
            CoreError::FfprobeParse(format!("ffprobe {context} output deserialization: {err}"))
        }
        _ => CoreError::FfprobeParse(format!("Unknown ffprobe error during {context}: {err:?}")),
    }
}

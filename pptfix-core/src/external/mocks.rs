// pptfix-core/src/external/mocks.rs

// --- Mocking Infrastructure (for testing) ---

// Compiled for unit tests and, through the "test-mocks" feature, for the
// integration tests under tests/.

use super::{FfmpegProcess, FfmpegSpawner, FfprobeExecutor, StreamAttributes, StreamSelector, VideoProperties};
use crate::error::{CoreError, CoreResult};
use ffmpeg_sidecar::command::FfmpegCommand;
use ffmpeg_sidecar::event::FfmpegEvent;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use std::rc::Rc;

/// Bytes written by the mock encoder when it "produces" an output file.
pub const MOCK_OUTPUT_CONTENT: &[u8] = b"mock encoded mp4";

fn exit_status(code: i32) -> ExitStatus {
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        ExitStatus::from_raw(code << 8)
    }
    #[cfg(windows)]
    {
        use std::os::windows::process::ExitStatusExt;
        ExitStatus::from_raw(code as u32)
    }
}

/// Mock implementation of FfmpegProcess.
#[derive(Clone)]
pub struct MockFfmpegProcess {
    /// Events to emit when handle_events is called.
    pub events_to_emit: Vec<FfmpegEvent>,
    /// Exit status to return when wait is called.
    pub exit_status: ExitStatus,
}

impl FfmpegProcess for MockFfmpegProcess {
    fn handle_events<F>(&mut self, mut handler: F) -> CoreResult<()>
    where
        F: FnMut(FfmpegEvent) -> CoreResult<()>,
    {
        for event in self.events_to_emit.clone() {
            handler(event)?;
        }
        Ok(())
    }

    fn wait(&mut self) -> CoreResult<ExitStatus> {
        Ok(self.exit_status)
    }
}

/// Represents an expected ffmpeg command call and its mock result.
pub struct MockFfmpegExpectation {
    pub arg_pattern: String,
    pub result: CoreResult<MockFfmpegProcess>,
    pub create_dummy_output: bool,
}

/// Mock implementation of FfmpegSpawner supporting multiple expectations.
///
/// Each spawn consumes the first expectation whose pattern is contained in
/// any argument. A spawn without a matching expectation panics.
#[derive(Clone, Default)]
pub struct MockFfmpegSpawner {
    expectations: Rc<RefCell<Vec<MockFfmpegExpectation>>>,
    received_calls: Rc<RefCell<Vec<Vec<String>>>>,
    unavailable: Rc<Cell<bool>>,
}

impl MockFfmpegSpawner {
    pub fn new() -> Self {
        Default::default()
    }

    /// Makes `ensure_available` fail as if ffmpeg were not installed.
    pub fn set_unavailable(&self) {
        self.unavailable.set(true);
    }

    pub fn add_expectation(
        &self,
        arg_pattern: &str,
        result: CoreResult<MockFfmpegProcess>,
        create_dummy_output: bool,
    ) {
        self.expectations.borrow_mut().push(MockFfmpegExpectation {
            arg_pattern: arg_pattern.to_string(),
            result,
            create_dummy_output,
        });
    }

    /// Expect a successful encode; writes [`MOCK_OUTPUT_CONTENT`] to the output path.
    pub fn add_success_expectation(&self, arg_pattern: &str, events: Vec<FfmpegEvent>) {
        let process = MockFfmpegProcess {
            events_to_emit: events,
            exit_status: exit_status(0),
        };
        self.add_expectation(arg_pattern, Ok(process), true);
    }

    pub fn add_spawn_error_expectation(&self, arg_pattern: &str, error: CoreError) {
        self.add_expectation(arg_pattern, Err(error), false);
    }

    /// Expect an encode that exits non-zero. With `partial_output` the
    /// encoder leaves a half-written file behind before failing.
    pub fn add_exit_error_expectation(
        &self,
        arg_pattern: &str,
        events: Vec<FfmpegEvent>,
        exit_code: i32,
        partial_output: bool,
    ) {
        let process = MockFfmpegProcess {
            events_to_emit: events,
            exit_status: exit_status(exit_code),
        };
        self.add_expectation(arg_pattern, Ok(process), partial_output);
    }

    pub fn get_received_calls(&self) -> Vec<Vec<String>> {
        self.received_calls.borrow().clone()
    }

    pub fn pending_expectations(&self) -> usize {
        self.expectations.borrow().len()
    }
}

impl FfmpegSpawner for MockFfmpegSpawner {
    type Process = MockFfmpegProcess;

    fn ensure_available(&self) -> CoreResult<()> {
        if self.unavailable.get() {
            Err(CoreError::DependencyNotFound("ffmpeg".to_string()))
        } else {
            Ok(())
        }
    }

    fn spawn(&self, cmd: FfmpegCommand) -> CoreResult<Self::Process> {
        let args: Vec<String> = cmd
            .get_args()
            .map(|s| s.to_string_lossy().into_owned())
            .collect();
        self.received_calls.borrow_mut().push(args.clone());

        let expectation = {
            let mut expectations = self.expectations.borrow_mut();
            let index = expectations
                .iter()
                .position(|exp| args.iter().any(|arg| arg.contains(&exp.arg_pattern)));
            match index {
                Some(index) => expectations.remove(index),
                None => panic!("MockFfmpegSpawner: No expectation found for command args: {args:?}"),
            }
        };
        log::debug!(
            "MockFfmpegSpawner: Matched expectation with pattern '{}'",
            expectation.arg_pattern
        );

        if expectation.create_dummy_output {
            if let Some(output_path) = args.last() {
                if let Err(e) = std::fs::write(output_path, MOCK_OUTPUT_CONTENT) {
                    log::error!("MockFfmpegSpawner failed to create output {output_path}: {e}");
                }
            }
        }

        expectation.result
    }
}

/// Mock implementation of FfprobeExecutor.
///
/// Results are stored per path. Errors are stored as messages and returned
/// as `CoreError::FfprobeParse`.
#[derive(Clone, Default)]
pub struct MockFfprobeExecutor {
    video_properties: Rc<RefCell<HashMap<PathBuf, Result<VideoProperties, String>>>>,
    default_properties: Rc<RefCell<Option<VideoProperties>>>,
    streams: Rc<RefCell<HashMap<(PathBuf, StreamSelector), Result<StreamAttributes, String>>>>,
    probe_calls: Rc<RefCell<Vec<(PathBuf, StreamSelector)>>>,
}

impl MockFfprobeExecutor {
    pub fn new() -> Self {
        Default::default()
    }

    /// Properties returned for any path without an explicit expectation.
    pub fn with_default_properties(self, props: VideoProperties) -> Self {
        *self.default_properties.borrow_mut() = Some(props);
        self
    }

    pub fn expect_video_properties(&self, input_path: &Path, result: Result<VideoProperties, String>) {
        self.video_properties
            .borrow_mut()
            .insert(input_path.to_path_buf(), result);
    }

    pub fn expect_stream(
        &self,
        input_path: &Path,
        selector: StreamSelector,
        result: Result<StreamAttributes, String>,
    ) {
        self.streams
            .borrow_mut()
            .insert((input_path.to_path_buf(), selector), result);
    }

    /// Convenience for `expect_stream` with literal pairs.
    pub fn expect_stream_attributes(
        &self,
        input_path: &Path,
        selector: StreamSelector,
        pairs: &[(&str, &str)],
    ) {
        let attributes = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        self.expect_stream(input_path, selector, Ok(attributes));
    }

    pub fn get_probe_calls(&self) -> Vec<(PathBuf, StreamSelector)> {
        self.probe_calls.borrow().clone()
    }
}

impl FfprobeExecutor for MockFfprobeExecutor {
    fn ensure_available(&self) -> CoreResult<()> {
        Ok(())
    }

    fn get_video_properties(&self, input_path: &Path) -> CoreResult<VideoProperties> {
        match self.video_properties.borrow().get(input_path) {
            Some(Ok(props)) => Ok(props.clone()),
            Some(Err(msg)) => Err(CoreError::FfprobeParse(msg.clone())),
            None => self.default_properties.borrow().clone().ok_or_else(|| {
                CoreError::FfprobeParse(format!(
                    "MockFfprobeExecutor: No expectation set for path {}",
                    input_path.display()
                ))
            }),
        }
    }

    fn probe_stream(
        &self,
        input_path: &Path,
        selector: StreamSelector,
    ) -> CoreResult<StreamAttributes> {
        self.probe_calls
            .borrow_mut()
            .push((input_path.to_path_buf(), selector));
        match self
            .streams
            .borrow()
            .get(&(input_path.to_path_buf(), selector))
        {
            Some(Ok(attributes)) => Ok(attributes.clone()),
            Some(Err(msg)) => Err(CoreError::FfprobeParse(msg.clone())),
            None => Err(CoreError::FfprobeParse(format!(
                "MockFfprobeExecutor: No {} stream expectation for {}",
                selector,
                input_path.display()
            ))),
        }
    }
}

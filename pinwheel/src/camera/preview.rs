use std::fmt::{Display, Formatter};
use std::time::{Duration, Instant};

use log::{debug, error, info, warn};

use crate::camera::{Camera, CameraManager, CaptureDevice};
use crate::errors::CameraError::{AcquireFailed, NoCamera, OpenFailed};
use crate::errors::Error;

/// Key code of the ESC key.
pub const ESC_KEY: u8 = 27;

/// Settings of the camera preview.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreviewSettings {
    /// Title of the display window (default: "Camera Feed").
    pub window: String,
    /// How long to wait for a key press after each frame (default: 10ms).
    pub key_poll: Duration,
    /// Key ending the preview (default: ESC).
    pub exit_key: u8,
    /// Resolution requested when configuring the camera (default: camera's own).
    pub resolution: Option<(u32, u32)>,
    /// Ends the preview after that long (default: none, runs until the exit key or stream end).
    pub max_duration: Option<Duration>,
}

impl Default for PreviewSettings {
    fn default() -> Self {
        Self {
            window: String::from("Camera Feed"),
            key_poll: Duration::from_millis(10),
            exit_key: ESC_KEY,
            resolution: None,
            max_duration: None,
        }
    }
}

impl PreviewSettings {
    pub fn set_window<S: Into<String>>(mut self, window: S) -> Self {
        self.window = window.into();
        self
    }

    pub fn set_exit_key(mut self, exit_key: u8) -> Self {
        self.exit_key = exit_key;
        self
    }

    pub fn set_resolution(mut self, width: u32, height: u32) -> Self {
        self.resolution = Some((width, height));
        self
    }

    pub fn set_max_duration(mut self, max_duration: Option<Duration>) -> Self {
        self.max_duration = max_duration;
        self
    }
}

/// Why a preview stopped.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StopReason {
    /// The capture returned an empty frame.
    EndOfStream,
    /// The exit key was pressed.
    ExitKey,
    /// The maximum duration elapsed.
    Elapsed,
}

/// Result of a preview that ended normally.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PreviewOutcome {
    pub reason: StopReason,
    /// Number of frames displayed.
    pub frames: usize,
}

impl PreviewOutcome {
    /// A preview that ended normally always exits with status 0.
    pub fn exit_code(&self) -> i32 {
        0
    }
}

impl Display for PreviewOutcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?} after {} frame(s)", self.reason, self.frames)
    }
}

/// Displays the feed of the first available camera until the exit key is pressed or the stream
/// ends.
///
/// The whole preview is blocking and runs on the calling thread.
#[derive(Clone, Debug, Default)]
pub struct Preview {
    settings: PreviewSettings,
}

impl Preview {
    pub fn new(settings: PreviewSettings) -> Self {
        Self { settings }
    }

    pub fn get_settings(&self) -> &PreviewSettings {
        &self.settings
    }

    /// Runs the preview: start the camera stack, acquire and configure the first camera, open a
    /// capture on it and display frames until stopped. Everything acquired is released on the
    /// way out, whatever the outcome.
    ///
    /// # Errors
    /// * `NoCamera`: the manager lists no camera.
    /// * `AcquireFailed`: the first camera could not be acquired.
    /// * `OpenFailed`: the capture could not be opened on the camera.
    /// * any error raised by the collaborators while streaming.
    pub fn run<M, C>(&self, manager: &mut M, capture: &mut C) -> Result<PreviewOutcome, Error>
    where
        M: CameraManager,
        C: CaptureDevice,
    {
        manager.start()?;
        let result = self.run_camera(manager, capture);
        manager.stop();
        match &result {
            Ok(outcome) => info!("Preview ended: {}", outcome),
            Err(err) => error!("Preview failed: {}", err),
        }
        result
    }

    fn run_camera<M, C>(&self, manager: &M, capture: &mut C) -> Result<PreviewOutcome, Error>
    where
        M: CameraManager,
        C: CaptureDevice,
    {
        let mut camera = manager.cameras().into_iter().next().ok_or(NoCamera)?;
        let name = camera.name().to_string();
        if let Err(err) = camera.acquire() {
            debug!("Acquiring '{}': {}", name, err);
            return Err(AcquireFailed { name }.into());
        }
        info!("Camera '{}' acquired", name);

        let result = self.stream(&mut camera, capture);
        if let Err(err) = camera.release() {
            warn!("Releasing camera '{}': {}", name, err);
        }
        result
    }

    fn stream<K, C>(&self, camera: &mut K, capture: &mut C) -> Result<PreviewOutcome, Error>
    where
        K: Camera,
        C: CaptureDevice,
    {
        camera.configure(self.settings.resolution)?;
        let name = camera.name().to_string();
        if let Err(err) = capture.open(&name) {
            debug!("Opening capture on '{}': {}", name, err);
            return Err(OpenFailed { name }.into());
        }
        if !capture.is_opened() {
            return Err(OpenFailed { name }.into());
        }

        let result = self.display(capture);
        if let Err(err) = capture.close() {
            warn!("Closing capture on '{}': {}", name, err);
        }
        result
    }

    fn display<C: CaptureDevice>(&self, capture: &mut C) -> Result<PreviewOutcome, Error> {
        let started = Instant::now();
        let mut frames = 0;

        loop {
            if let Some(max_duration) = self.settings.max_duration {
                if started.elapsed() >= max_duration {
                    return Ok(PreviewOutcome {
                        reason: StopReason::Elapsed,
                        frames,
                    });
                }
            }

            let frame = capture.fetch_frame()?;
            if frame.is_empty() {
                return Ok(PreviewOutcome {
                    reason: StopReason::EndOfStream,
                    frames,
                });
            }
            capture.show(&self.settings.window, &frame)?;
            frames += 1;

            if capture.poll_key(self.settings.key_poll)? == Some(self.settings.exit_key) {
                return Ok(PreviewOutcome {
                    reason: StopReason::ExitKey,
                    frames,
                });
            }
        }
    }
}

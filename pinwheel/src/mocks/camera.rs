use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;

use crate::camera::{Camera, CameraManager, CaptureDevice, Frame};
use crate::errors::CameraError::NotOpened;
use crate::errors::{Error, Unknown};

/// Shared, ordered record of the calls made on the mocked camera stack.
type CallLog = Arc<RwLock<Vec<String>>>;

/// Mock [`Camera`]: clones share their state and the call log of their manager.
#[derive(Clone, Debug)]
pub struct MockCamera {
    name: String,
    fail_acquire: bool,
    acquired: Arc<RwLock<bool>>,
    resolution: Arc<RwLock<Option<(u32, u32)>>>,
    calls: CallLog,
}

impl MockCamera {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            fail_acquire: false,
            acquired: Arc::new(RwLock::new(false)),
            resolution: Arc::new(RwLock::new(None)),
            calls: CallLog::default(),
        }
    }

    /// A camera that cannot be acquired (already in use).
    pub fn failing_acquire(mut self) -> Self {
        self.fail_acquire = true;
        self
    }

    pub fn is_acquired(&self) -> bool {
        *self.acquired.read()
    }

    /// Returns the resolution the camera has been configured with.
    pub fn get_resolution(&self) -> Option<(u32, u32)> {
        *self.resolution.read()
    }

    fn log(&self, call: &str) {
        self.calls.write().push(format!("camera.{}({})", call, self.name));
    }
}

impl Camera for MockCamera {
    fn name(&self) -> &str {
        &self.name
    }

    fn acquire(&mut self) -> Result<(), Error> {
        self.log("acquire");
        if self.fail_acquire {
            return Err(Unknown {
                info: String::from("device busy"),
            });
        }
        *self.acquired.write() = true;
        Ok(())
    }

    fn configure(&mut self, resolution: Option<(u32, u32)>) -> Result<(), Error> {
        self.log("configure");
        *self.resolution.write() = resolution;
        Ok(())
    }

    fn release(&mut self) -> Result<(), Error> {
        self.log("release");
        *self.acquired.write() = false;
        Ok(())
    }
}

/// Mock [`CameraManager`] listing a fixed set of cameras.
#[derive(Clone, Debug)]
pub struct MockCameraManager {
    cameras: Vec<MockCamera>,
    started: bool,
    calls: CallLog,
}

impl MockCameraManager {
    pub fn new(cameras: Vec<MockCamera>) -> Self {
        let calls = CallLog::default();
        let cameras = cameras
            .into_iter()
            .map(|mut camera| {
                camera.calls = calls.clone();
                camera
            })
            .collect();
        Self {
            cameras,
            started: false,
            calls,
        }
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Creates a capture replaying `frames`, logging its calls along with this manager's.
    pub fn capture(&self, frames: Vec<Frame>) -> MockCapture {
        MockCapture {
            calls: Some(self.calls.clone()),
            ..MockCapture::new(frames)
        }
    }

    /// Returns every call made on the manager, its cameras and its captures, in order.
    pub fn get_calls(&self) -> Vec<String> {
        self.calls.read().clone()
    }
}

impl CameraManager for MockCameraManager {
    type Camera = MockCamera;

    fn start(&mut self) -> Result<(), Error> {
        self.calls.write().push(String::from("manager.start"));
        self.started = true;
        Ok(())
    }

    fn cameras(&self) -> Vec<Self::Camera> {
        self.cameras.clone()
    }

    fn stop(&mut self) {
        self.calls.write().push(String::from("manager.stop"));
        self.started = false;
    }
}

/// Mock [`CaptureDevice`] replaying scripted frames and key presses.
///
/// Once the scripted frames run out, it returns empty frames (end of stream). Once the scripted
/// keys run out, no key is ever pressed.
#[derive(Clone, Debug, Default)]
pub struct MockCapture {
    frames: VecDeque<Frame>,
    keys: VecDeque<Option<u8>>,
    fail_open: bool,
    opened: bool,
    device: Option<String>,
    window: Option<String>,
    shown: usize,
    calls: Option<CallLog>,
}

impl MockCapture {
    pub fn new(frames: Vec<Frame>) -> Self {
        Self {
            frames: frames.into(),
            ..Default::default()
        }
    }

    /// Scripts the result of successive key polls.
    pub fn with_keys(mut self, keys: Vec<Option<u8>>) -> Self {
        self.keys = keys.into();
        self
    }

    /// A capture that never opens.
    pub fn failing_open(mut self) -> Self {
        self.fail_open = true;
        self
    }

    /// Returns the number of frames shown.
    pub fn get_shown(&self) -> usize {
        self.shown
    }

    /// Returns the device the capture was opened on.
    pub fn get_device(&self) -> Option<String> {
        self.device.clone()
    }

    /// Returns the window frames were shown in.
    pub fn get_window(&self) -> Option<String> {
        self.window.clone()
    }

    fn log(&self, call: String) {
        if let Some(calls) = &self.calls {
            calls.write().push(call);
        }
    }
}

impl CaptureDevice for MockCapture {
    fn open(&mut self, device: &str) -> Result<(), Error> {
        self.log(format!("capture.open({})", device));
        self.device = Some(device.to_string());
        self.opened = !self.fail_open;
        Ok(())
    }

    fn is_opened(&self) -> bool {
        self.opened
    }

    fn fetch_frame(&mut self) -> Result<Frame, Error> {
        if !self.opened {
            return Err(NotOpened.into());
        }
        Ok(self.frames.pop_front().unwrap_or_default())
    }

    fn show(&mut self, window: &str, _: &Frame) -> Result<(), Error> {
        self.window = Some(window.to_string());
        self.shown += 1;
        Ok(())
    }

    fn poll_key(&mut self, _: Duration) -> Result<Option<u8>, Error> {
        Ok(self.keys.pop_front().flatten())
    }

    fn close(&mut self) -> Result<(), Error> {
        self.log(String::from("capture.close"));
        self.opened = false;
        Ok(())
    }
}

//! Defines the camera preview: the collaborators it relies on and the display loop itself.
//!
//! Camera management (libcamera-like) and frame capture/display (OpenCV-like) are external
//! collaborators: this module only describes the narrow interface the preview needs from them.

mod preview;

use std::fmt::{Debug, Display, Formatter};
use std::time::Duration;

use crate::errors::Error;
pub use preview::{Preview, PreviewOutcome, PreviewSettings, StopReason, ESC_KEY};

/// A single captured frame. An empty frame signals the end of the stream.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl Frame {
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            data,
        }
    }

    /// Checks if the frame holds no image.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl Display for Frame {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "FRAME [{}x{}, {} bytes]",
            self.width,
            self.height,
            self.data.len()
        )
    }
}

/// A camera as enumerated by a [`CameraManager`].
pub trait Camera: Debug {
    /// Returns the device name, used to open a capture on it.
    fn name(&self) -> &str;
    /// Acquires exclusive access to the camera.
    fn acquire(&mut self) -> Result<(), Error>;
    /// Configures the camera stream, optionally at a given resolution.
    fn configure(&mut self, resolution: Option<(u32, u32)>) -> Result<(), Error>;
    /// Releases the camera.
    fn release(&mut self) -> Result<(), Error>;
}

/// Owns the camera stack: must be started before cameras can be enumerated.
pub trait CameraManager: Debug {
    type Camera: Camera;

    fn start(&mut self) -> Result<(), Error>;
    /// Lists the available cameras, in the stack's order.
    fn cameras(&self) -> Vec<Self::Camera>;
    fn stop(&mut self);
}

/// A capture channel able to fetch frames from a device and show them in a window.
pub trait CaptureDevice: Debug {
    /// Opens the capture on the named device.
    fn open(&mut self, device: &str) -> Result<(), Error>;
    fn is_opened(&self) -> bool;
    /// Blocks until the next frame is available. An empty frame means the stream ended.
    fn fetch_frame(&mut self) -> Result<Frame, Error>;
    /// Displays a frame in the named window.
    fn show(&mut self, window: &str, frame: &Frame) -> Result<(), Error>;
    /// Waits up to `timeout` for a key press.
    fn poll_key(&mut self, timeout: Duration) -> Result<Option<u8>, Error>;
    /// Closes the capture and every window it opened.
    fn close(&mut self) -> Result<(), Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame() {
        assert!(Frame::default().is_empty());
        let frame = Frame::new(2, 1, vec![0; 6]);
        assert!(!frame.is_empty());
        assert_eq!(format!("{}", frame), "FRAME [2x1, 6 bytes]");
    }
}

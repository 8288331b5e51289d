//! Capture device port
//!
//! A `CaptureDevice` hands out at most one live `VideoStream` at a time.
//! Stopping a stream is final; a new one must be opened to capture again.

use image::RgbImage;

use crate::domain::result::DeviceAccessError;

/// Preferred capture resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoConstraints {
    pub width: u32,
    pub height: u32,
}

impl Default for VideoConstraints {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
        }
    }
}

/// Source of live video streams
pub trait CaptureDevice: Send + Sync {
    /// Short name for diagnostics (e.g. "ffmpeg:/dev/video0")
    fn name(&self) -> String;

    /// Request access and start streaming
    fn open(&self, constraints: &VideoConstraints) -> Result<Box<dyn VideoStream>, DeviceAccessError>;
}

/// A live stream holding the device open until stopped
pub trait VideoStream: Send {
    /// Actual frame size delivered
    fn resolution(&self) -> (u32, u32);

    /// Read the current frame
    fn read_frame(&mut self) -> Result<RgbImage, DeviceAccessError>;

    /// Stop every underlying track. Idempotent.
    fn stop(&mut self);

    /// True until `stop` has been called (or the device went away)
    fn is_live(&self) -> bool;
}

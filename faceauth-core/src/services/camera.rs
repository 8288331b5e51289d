//! Camera controller
//!
//! Owns at most one live stream. Capturing a frame is one-shot: the frame
//! is encoded, the preview switches to the still, and the device is
//! released straight away.

use std::sync::Arc;

use crate::domain::result::DeviceAccessError;
use crate::domain::EncodedImage;
use crate::ports::{CaptureDevice, VideoConstraints, VideoStream};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraState {
    Idle,
    Acquiring,
    Active,
    Captured,
}

/// What the preview area currently shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewContent {
    Empty,
    Live { width: u32, height: u32 },
    Still(EncodedImage),
    /// Acquisition failed; human-readable cause
    Message(String),
}

/// Which camera buttons are shown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CameraButtons {
    pub start: bool,
    pub capture: bool,
    pub retake: bool,
}

pub struct CameraController {
    device: Arc<dyn CaptureDevice>,
    constraints: VideoConstraints,
    quality: u8,
    stream: Option<Box<dyn VideoStream>>,
    state: CameraState,
    captured: Option<EncodedImage>,
    preview: PreviewContent,
}

impl CameraController {
    /// `quality` is the JPEG quality, 1-100
    pub fn new(device: Arc<dyn CaptureDevice>, constraints: VideoConstraints, quality: u8) -> Self {
        Self {
            device,
            constraints,
            quality,
            stream: None,
            state: CameraState::Idle,
            captured: None,
            preview: PreviewContent::Empty,
        }
    }

    pub fn state(&self) -> CameraState {
        self.state
    }

    pub fn preview(&self) -> &PreviewContent {
        &self.preview
    }

    pub fn captured_image(&self) -> Option<&EncodedImage> {
        self.captured.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.stream.is_some()
    }

    pub fn device_name(&self) -> String {
        self.device.name()
    }

    /// Open the device and bind the live stream to the preview
    pub fn acquire(&mut self) -> Result<(), DeviceAccessError> {
        if self.stream.is_some() || self.state == CameraState::Acquiring {
            return Err(DeviceAccessError::Busy);
        }

        self.state = CameraState::Acquiring;
        match self.device.open(&self.constraints) {
            Ok(stream) => {
                let (width, height) = stream.resolution();
                tracing::debug!(device = %self.device.name(), width, height, "camera acquired");
                self.preview = PreviewContent::Live { width, height };
                self.stream = Some(stream);
                self.state = CameraState::Active;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(device = %self.device.name(), error = %e, "camera acquisition failed");
                self.preview = PreviewContent::Message(e.preview_message());
                self.state = CameraState::Idle;
                Err(e)
            }
        }
    }

    /// Snapshot the current frame and release the device.
    ///
    /// Returns `None` when no stream is active. A frame that cannot be read
    /// or encoded also yields `None` and leaves the stream running.
    pub fn capture(&mut self) -> Option<EncodedImage> {
        let Some(stream) = self.stream.as_mut() else {
            tracing::debug!("capture requested with no active camera");
            return None;
        };

        let frame = match stream.read_frame() {
            Ok(frame) => frame,
            Err(e) => {
                tracing::warn!(error = %e, "failed to read camera frame");
                return None;
            }
        };

        let image = match EncodedImage::from_frame(&frame, self.quality) {
            Ok(image) => image,
            Err(e) => {
                tracing::warn!(error = %e, "failed to encode camera frame");
                return None;
            }
        };

        self.release();
        tracing::debug!(fingerprint = %image.fingerprint(), bytes = image.len(), "frame captured");
        self.preview = PreviewContent::Still(image.clone());
        self.captured = Some(image.clone());
        self.state = CameraState::Captured;
        Some(image)
    }

    /// Stop every track and drop the stream. Safe to call repeatedly.
    pub fn release(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.stop();
            tracing::debug!(device = %self.device.name(), "camera released");
        }
        if self.state == CameraState::Active {
            self.state = CameraState::Idle;
            self.preview = PreviewContent::Empty;
        }
    }

    /// Release and forget the captured image
    pub fn reset(&mut self) {
        self.release();
        self.captured = None;
        self.preview = PreviewContent::Empty;
        self.state = CameraState::Idle;
    }

    pub fn retake(&mut self) -> Result<(), DeviceAccessError> {
        self.reset();
        self.acquire()
    }

    pub fn buttons(&self, with_retake: bool) -> CameraButtons {
        match self.state {
            CameraState::Idle | CameraState::Acquiring => CameraButtons {
                start: true,
                capture: false,
                retake: false,
            },
            CameraState::Active => CameraButtons {
                start: false,
                capture: true,
                retake: false,
            },
            CameraState::Captured => CameraButtons {
                start: !with_retake,
                capture: false,
                retake: with_retake,
            },
        }
    }
}

impl Drop for CameraController {
    fn drop(&mut self) {
        self.release();
    }
}

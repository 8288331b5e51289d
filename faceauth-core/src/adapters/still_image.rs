//! Still-image capture device
//!
//! Serves a fixed picture as if it were a camera. Used for headless runs,
//! demos and machines without a webcam.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use image::imageops::FilterType;
use image::RgbImage;

use crate::domain::result::DeviceAccessError;
use crate::ports::{CaptureDevice, VideoConstraints, VideoStream};

#[derive(Debug, Clone)]
pub struct StillImageCamera {
    path: PathBuf,
}

impl StillImageCamera {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CaptureDevice for StillImageCamera {
    fn name(&self) -> String {
        format!("still:{}", self.path.display())
    }

    fn open(&self, constraints: &VideoConstraints) -> Result<Box<dyn VideoStream>, DeviceAccessError> {
        let bytes = std::fs::read(&self.path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => DeviceAccessError::NotFound,
            ErrorKind::PermissionDenied => DeviceAccessError::PermissionDenied,
            _ => DeviceAccessError::Other(e.to_string()),
        })?;

        let decoded = image::load_from_memory(&bytes)
            .map_err(|e| DeviceAccessError::Other(format!("unreadable image: {}", e)))?;

        // Behave like a camera honouring the preferred resolution
        let frame = image::imageops::resize(
            &decoded.to_rgb8(),
            constraints.width,
            constraints.height,
            FilterType::Triangle,
        );

        tracing::debug!(path = %self.path.display(), "still image camera opened");
        Ok(Box::new(StillImageStream {
            frame,
            live: true,
        }))
    }
}

struct StillImageStream {
    frame: RgbImage,
    live: bool,
}

impl VideoStream for StillImageStream {
    fn resolution(&self) -> (u32, u32) {
        self.frame.dimensions()
    }

    fn read_frame(&mut self) -> Result<RgbImage, DeviceAccessError> {
        if !self.live {
            return Err(DeviceAccessError::Other("stream stopped".to_string()));
        }
        Ok(self.frame.clone())
    }

    fn stop(&mut self) {
        self.live = false;
    }

    fn is_live(&self) -> bool {
        self.live
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_is_not_found() {
        let camera = StillImageCamera::new("/definitely/not/here.png");
        let err = camera.open(&VideoConstraints::default()).err().unwrap();
        assert_eq!(err, DeviceAccessError::NotFound);
    }

    #[test]
    fn test_frames_are_resized_to_constraints() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("face.png");
        RgbImage::from_pixel(32, 32, Rgb([200, 150, 100])).save(&path).unwrap();

        let camera = StillImageCamera::new(&path);
        let mut stream = camera.open(&VideoConstraints { width: 64, height: 48 }).unwrap();
        assert_eq!(stream.resolution(), (64, 48));
        assert_eq!(stream.read_frame().unwrap().dimensions(), (64, 48));

        stream.stop();
        assert!(!stream.is_live());
        assert!(stream.read_frame().is_err());
    }

    #[test]
    fn test_garbage_file_is_other() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("face.png");
        std::fs::write(&path, b"not an image").unwrap();
        let err = StillImageCamera::new(&path)
            .open(&VideoConstraints::default())
            .err()
            .unwrap();
        assert!(matches!(err, DeviceAccessError::Other(_)));
    }
}

//! faceauth core - client library for a face-recognition login service
//!
//! Laid out along hexagonal lines:
//!
//! - **domain**: users, forms and validation, encoded images, status messages
//! - **ports**: traits for the backend, capture devices, storage and the hosting shell
//! - **services**: camera controller, session store, page controllers, doctor, event log
//! - **adapters**: HTTP gateway, ffmpeg and still-image cameras, file storage

pub mod adapters;
pub mod config;
pub mod domain;
mod log_migrations;
pub mod ports;
pub mod services;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use adapters::ffmpeg::FfmpegCamera;
use adapters::file_store::{JsonFileStore, MemoryStore};
use adapters::http::HttpGateway;
use adapters::still_image::StillImageCamera;
use config::{CameraSource, Config};
use ports::{AuthGateway, CaptureDevice, KeyValueStore, Navigator, StatusView};
use services::{DoctorService, PageEnv, SessionStore};

pub use domain::result::Error;
pub use domain::{EncodedImage, Page, User};

/// Per-run overrides layered on top of settings.json
#[derive(Debug, Clone, Default)]
pub struct ContextOptions {
    pub api_url: Option<String>,
    /// Serve camera frames from this image instead of a device
    pub image: Option<PathBuf>,
    pub device: Option<String>,
    /// Keep the session in memory only
    pub ephemeral: bool,
}

/// Everything a command needs, wired from configuration
pub struct FaceAuthContext {
    pub config: Config,
    pub faceauth_dir: PathBuf,
    pub gateway: Arc<dyn AuthGateway>,
    pub session: SessionStore,
    pub camera: Arc<dyn CaptureDevice>,
    pub doctor_service: DoctorService,
}

impl FaceAuthContext {
    pub fn new(faceauth_dir: &Path, options: &ContextOptions) -> Result<Self> {
        let mut config = Config::load(faceauth_dir)?;

        if let Some(url) = &options.api_url {
            config.api.base_url = url.clone();
        }
        if let Some(device) = &options.device {
            config.camera.source = CameraSource::Ffmpeg;
            config.camera.device = device.clone();
        }
        if let Some(image) = &options.image {
            config.camera.source = CameraSource::Still;
            config.camera.still_image = Some(image.clone());
        }

        let gateway: Arc<dyn AuthGateway> =
            Arc::new(HttpGateway::new(&config.api).context("Failed to set up backend client")?);

        let store: Arc<dyn KeyValueStore> = if options.ephemeral {
            Arc::new(MemoryStore::new())
        } else {
            Arc::new(JsonFileStore::in_dir(faceauth_dir))
        };
        let session = SessionStore::new(store);

        let camera: Arc<dyn CaptureDevice> = match (config.camera.source, &config.camera.still_image) {
            (CameraSource::Still, Some(path)) => Arc::new(StillImageCamera::new(path)),
            (CameraSource::Still, None) => {
                anyhow::bail!("camera.source is 'still' but camera.stillImage is not set")
            }
            (CameraSource::Ffmpeg, _) => Arc::new(FfmpegCamera::new(config.camera.device.clone())),
        };
        tracing::debug!(camera = %camera.name(), api = %config.api.base_url, "context ready");

        let doctor_service = DoctorService::new(
            Arc::clone(&gateway),
            session.clone(),
            config.api.clone(),
            config.camera.clone(),
        );

        Ok(Self {
            config,
            faceauth_dir: faceauth_dir.to_path_buf(),
            gateway,
            session,
            camera,
            doctor_service,
        })
    }

    /// Collaborators for page controllers hosted by `navigator` and `status_view`
    pub fn page_env(&self, navigator: Arc<dyn Navigator>, status_view: Arc<dyn StatusView>) -> PageEnv {
        PageEnv {
            gateway: Arc::clone(&self.gateway),
            session: self.session.clone(),
            navigator,
            status_view,
            camera: Arc::clone(&self.camera),
            camera_config: self.config.camera.clone(),
            ui: self.config.ui.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_image_option_selects_still_camera() {
        let dir = tempdir().unwrap();
        let options = ContextOptions {
            image: Some(dir.path().join("face.jpg")),
            ephemeral: true,
            ..ContextOptions::default()
        };
        let context = FaceAuthContext::new(dir.path(), &options).unwrap();
        assert!(context.camera.name().starts_with("still:"));
        assert_eq!(context.config.camera.source, CameraSource::Still);
    }

    #[test]
    fn test_ephemeral_session_leaves_no_file() {
        let dir = tempdir().unwrap();
        let options = ContextOptions {
            ephemeral: true,
            ..ContextOptions::default()
        };
        let context = FaceAuthContext::new(dir.path(), &options).unwrap();
        context.session.set_user(&User::new(1, "alice", "a@x.com")).unwrap();
        assert!(!dir.path().join(adapters::file_store::STORAGE_FILE).exists());
    }

    #[test]
    fn test_bad_api_url_is_rejected() {
        let dir = tempdir().unwrap();
        let options = ContextOptions {
            api_url: Some("not a url".to_string()),
            ..ContextOptions::default()
        };
        assert!(FaceAuthContext::new(dir.path(), &options).is_err());
    }
}

//! What every page controller is built from

use std::sync::Arc;

use crate::config::{CameraConfig, UiConfig};
use crate::domain::User;
use crate::ports::{AuthGateway, CaptureDevice, Navigator, StatusView};
use crate::services::camera::CameraController;
use crate::services::session::SessionStore;
use crate::services::status::StatusReporter;

/// Shared collaborators handed to each page on load
#[derive(Clone)]
pub struct PageEnv {
    pub gateway: Arc<dyn AuthGateway>,
    pub session: SessionStore,
    pub navigator: Arc<dyn Navigator>,
    pub status_view: Arc<dyn StatusView>,
    pub camera: Arc<dyn CaptureDevice>,
    pub camera_config: CameraConfig,
    pub ui: UiConfig,
}

impl PageEnv {
    pub(crate) fn status_reporter(&self) -> StatusReporter {
        StatusReporter::new(Arc::clone(&self.status_view), self.ui.status_clear_delay())
    }

    pub(crate) fn camera_controller(&self) -> CameraController {
        CameraController::new(
            Arc::clone(&self.camera),
            self.camera_config.constraints(),
            self.camera_config.encoder_quality(),
        )
    }

    /// The signed-in user, treating unreadable storage as signed out
    pub(crate) fn signed_in_user(&self) -> Option<User> {
        match self.session.get_user() {
            Ok(user) => user,
            Err(e) => {
                tracing::warn!(error = %e, "could not read session");
                None
            }
        }
    }
}

/// Result of loading a page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The page is showing
    Ready,
    /// A navigation was issued instead
    Redirected,
}

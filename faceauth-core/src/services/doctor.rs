//! Doctor service: setup checks for backend, camera, session and config

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use serde_json::json;

use crate::adapters::ffmpeg::FfmpegCamera;
use crate::config::{ApiConfig, CameraConfig, CameraSource};
use crate::domain::result::DeviceAccessError;
use crate::ports::AuthGateway;
use crate::services::session::{SessionState, SessionStore};

pub struct DoctorService {
    gateway: Arc<dyn AuthGateway>,
    session: SessionStore,
    api: ApiConfig,
    camera: CameraConfig,
}

impl DoctorService {
    pub fn new(gateway: Arc<dyn AuthGateway>, session: SessionStore, api: ApiConfig, camera: CameraConfig) -> Self {
        Self {
            gateway,
            session,
            api,
            camera,
        }
    }

    /// Run all checks. Individual failures are reported, never returned.
    pub fn run_checks(&self) -> DoctorResult {
        let mut checks = BTreeMap::new();

        checks.insert("config".to_string(), self.check_config());
        checks.insert("backend".to_string(), self.check_backend());
        checks.insert("camera".to_string(), self.check_camera());
        checks.insert("session".to_string(), self.check_session());

        let passed = checks.values().filter(|c| c.status == "pass").count() as i64;
        let warnings = checks.values().filter(|c| c.status == "warning").count() as i64;
        let errors = checks.values().filter(|c| c.status == "error").count() as i64;

        DoctorResult {
            checks,
            summary: DoctorSummary {
                passed,
                warnings,
                errors,
            },
        }
    }

    fn check_config(&self) -> CheckResult {
        match self.api.parsed_base_url() {
            Ok(url) => CheckResult::pass(format!("Backend URL is {}", url)),
            Err(e) => CheckResult::error(format!("Invalid backend URL: {}", e)),
        }
    }

    fn check_backend(&self) -> CheckResult {
        match self.gateway.health() {
            Ok(health) if health.is_healthy() => {
                let mut result = CheckResult::pass(
                    health
                        .message
                        .clone()
                        .unwrap_or_else(|| "Backend is reachable".to_string()),
                );
                if let Some(database) = &health.database {
                    result.details = Some(vec![json!({ "database": database })]);
                }
                result
            }
            Ok(health) => CheckResult::warning(format!(
                "Backend answered but reports status '{}'",
                health.status.as_deref().unwrap_or("unknown")
            )),
            Err(e) => CheckResult::error(format!("Backend unreachable at {}: {}", self.api.base_url, e)),
        }
    }

    fn check_camera(&self) -> CheckResult {
        match self.camera.source {
            CameraSource::Still => match &self.camera.still_image {
                Some(path) if path.is_file() => CheckResult::pass(format!("Using still image {}", path.display())),
                Some(path) => CheckResult::error(format!("Still image not found: {}", path.display())),
                None => CheckResult::error("Camera source is 'still' but no stillImage is set"),
            },
            CameraSource::Ffmpeg => {
                let camera = FfmpegCamera::new(self.camera.device.clone());
                let Some(ffmpeg) = camera.ffmpeg_path() else {
                    return CheckResult::error("ffmpeg not found on PATH; install it or use --image");
                };
                let details = Some(vec![json!({
                    "ffmpeg": ffmpeg.display().to_string(),
                    "device": camera.device(),
                })]);
                let mut result = match camera.probe_device() {
                    Ok(()) => CheckResult::pass(format!("Camera {} is available", camera.device())),
                    Err(DeviceAccessError::PermissionDenied) => CheckResult::error(format!(
                        "No permission to open {}; check video group membership",
                        camera.device()
                    )),
                    Err(e) => CheckResult::error(format!("{}: {}", camera.device(), e)),
                };
                result.details = details;
                result
            }
        }
    }

    fn check_session(&self) -> CheckResult {
        match self.session.inspect() {
            Ok(SessionState::Absent) => CheckResult::pass("Not signed in"),
            Ok(SessionState::Present(user)) => CheckResult::pass(format!("Signed in as {}", user.username)),
            Ok(SessionState::Corrupted(reason)) => {
                let mut result = CheckResult::warning("Session record is corrupted; run `faceauth logout`");
                result.details = Some(vec![json!({ "reason": reason })]);
                result
            }
            Err(e) => CheckResult::error(format!("Session storage unreadable: {}", e)),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DoctorResult {
    pub checks: BTreeMap<String, CheckResult>,
    pub summary: DoctorSummary,
}

#[derive(Debug, Serialize)]
pub struct CheckResult {
    pub status: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<serde_json::Value>>,
}

impl CheckResult {
    fn with_status(status: &str, message: impl Into<String>) -> Self {
        Self {
            status: status.to_string(),
            message: message.into(),
            details: None,
        }
    }

    fn pass(message: impl Into<String>) -> Self {
        Self::with_status("pass", message)
    }

    fn warning(message: impl Into<String>) -> Self {
        Self::with_status("warning", message)
    }

    fn error(message: impl Into<String>) -> Self {
        Self::with_status("error", message)
    }
}

#[derive(Debug, Serialize)]
pub struct DoctorSummary {
    pub passed: i64,
    pub warnings: i64,
    pub errors: i64,
}

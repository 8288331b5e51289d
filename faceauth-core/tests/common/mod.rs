//! Shared fakes for the page-flow tests
//!
//! Everything records what it was asked to do so tests can assert on calls
//! without a terminal, a camera or a backend.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use image::{Rgb, RgbImage};

use faceauth_core::adapters::file_store::MemoryStore;
use faceauth_core::config::{CameraConfig, UiConfig};
use faceauth_core::domain::result::{DeviceAccessError, GatewayError};
use faceauth_core::domain::{Page, StatusKind, StatusMessage, User};
use faceauth_core::ports::{
    AuthGateway, CaptureDevice, Credentials, FaceLoginRequest, HealthStatus, LoginResponse,
    Navigator, RegisterRequest, StatusView, VideoConstraints, VideoStream,
};
use faceauth_core::services::{PageEnv, SessionStore};

// ============================================================================
// Gateway
// ============================================================================

/// Calls seen by the gateway, in order
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayCall {
    Register { username: String, email: String },
    Login { username: String, password: String },
    FaceLogin { username: String, fingerprint: String },
    GetUser(i64),
    Health,
}

/// Gateway returning canned results
pub struct RecordingGateway {
    pub calls: Mutex<Vec<GatewayCall>>,
    pub register_result: Mutex<Result<User, GatewayError>>,
    pub login_result: Mutex<Result<LoginResponse, GatewayError>>,
    pub user_result: Mutex<Result<User, GatewayError>>,
}

impl RecordingGateway {
    pub fn new() -> Self {
        let alice = User::new(1, "alice", "a@x.com");
        Self {
            calls: Mutex::new(Vec::new()),
            register_result: Mutex::new(Ok(alice.clone())),
            login_result: Mutex::new(Ok(LoginResponse {
                user: alice.clone(),
                message: None,
            })),
            user_result: Mutex::new(Ok(alice)),
        }
    }

    pub fn failing_with(status: u16, message: &str) -> Self {
        let gateway = Self::new();
        let error = GatewayError::Server {
            status,
            message: message.to_string(),
        };
        *gateway.register_result.lock().unwrap() = Err(error.clone());
        *gateway.login_result.lock().unwrap() = Err(error.clone());
        *gateway.user_result.lock().unwrap() = Err(error);
        gateway
    }

    pub fn calls(&self) -> Vec<GatewayCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: GatewayCall) {
        self.calls.lock().unwrap().push(call);
    }
}

impl AuthGateway for RecordingGateway {
    fn register(&self, request: &RegisterRequest) -> Result<User, GatewayError> {
        self.record(GatewayCall::Register {
            username: request.username.clone(),
            email: request.email.clone(),
        });
        self.register_result.lock().unwrap().clone()
    }

    fn login(&self, credentials: &Credentials) -> Result<LoginResponse, GatewayError> {
        self.record(GatewayCall::Login {
            username: credentials.username.clone(),
            password: credentials.password.clone(),
        });
        self.login_result.lock().unwrap().clone()
    }

    fn face_login(&self, request: &FaceLoginRequest) -> Result<LoginResponse, GatewayError> {
        self.record(GatewayCall::FaceLogin {
            username: request.username.clone(),
            fingerprint: request.face_image.fingerprint(),
        });
        self.login_result.lock().unwrap().clone()
    }

    fn get_user(&self, id: i64) -> Result<User, GatewayError> {
        self.record(GatewayCall::GetUser(id));
        self.user_result.lock().unwrap().clone()
    }

    fn health(&self) -> Result<HealthStatus, GatewayError> {
        self.record(GatewayCall::Health);
        Ok(HealthStatus::default())
    }
}

// ============================================================================
// Camera
// ============================================================================

/// Camera whose stream state is visible from the test
pub struct ScriptedCamera {
    pub fail_with: Option<DeviceAccessError>,
    pub live_streams: Arc<AtomicUsize>,
    pub opens: AtomicUsize,
    pub broken_frames: Arc<AtomicBool>,
}

impl ScriptedCamera {
    pub fn new() -> Self {
        Self {
            fail_with: None,
            live_streams: Arc::new(AtomicUsize::new(0)),
            opens: AtomicUsize::new(0),
            broken_frames: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn failing(error: DeviceAccessError) -> Self {
        Self {
            fail_with: Some(error),
            ..Self::new()
        }
    }

    pub fn live(&self) -> usize {
        self.live_streams.load(Ordering::SeqCst)
    }

    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }
}

struct ScriptedStream {
    width: u32,
    height: u32,
    live: bool,
    live_streams: Arc<AtomicUsize>,
    broken_frames: Arc<AtomicBool>,
}

impl CaptureDevice for ScriptedCamera {
    fn name(&self) -> String {
        "scripted".to_string()
    }

    fn open(&self, constraints: &VideoConstraints) -> Result<Box<dyn VideoStream>, DeviceAccessError> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = &self.fail_with {
            return Err(error.clone());
        }
        self.live_streams.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(ScriptedStream {
            width: constraints.width,
            height: constraints.height,
            live: true,
            live_streams: Arc::clone(&self.live_streams),
            broken_frames: Arc::clone(&self.broken_frames),
        }))
    }
}

impl VideoStream for ScriptedStream {
    fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn read_frame(&mut self) -> Result<RgbImage, DeviceAccessError> {
        if self.broken_frames.load(Ordering::SeqCst) {
            return Err(DeviceAccessError::Other("frame dropped".to_string()));
        }
        Ok(RgbImage::from_fn(self.width, self.height, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, 90])
        }))
    }

    fn stop(&mut self) {
        if self.live {
            self.live = false;
            self.live_streams.fetch_sub(1, Ordering::SeqCst);
        }
    }

    fn is_live(&self) -> bool {
        self.live
    }
}

// ============================================================================
// Shell
// ============================================================================

#[derive(Default)]
pub struct RecordingNavigator {
    pub navigations: Mutex<Vec<(Page, Duration)>>,
}

impl RecordingNavigator {
    pub fn navigations(&self) -> Vec<(Page, Duration)> {
        self.navigations.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, page: Page, delay: Duration) {
        self.navigations.lock().unwrap().push((page, delay));
    }
}

#[derive(Default)]
pub struct RecordingStatusView {
    pub rendered: Mutex<Vec<(StatusKind, String)>>,
}

impl RecordingStatusView {
    pub fn last(&self) -> Option<(StatusKind, String)> {
        self.rendered.lock().unwrap().last().cloned()
    }
}

impl StatusView for RecordingStatusView {
    fn render(&self, message: &StatusMessage) {
        self.rendered
            .lock()
            .unwrap()
            .push((message.kind, message.text.clone()));
    }

    fn clear(&self) {}
}

// ============================================================================
// Harness
// ============================================================================

pub struct Harness {
    pub gateway: Arc<RecordingGateway>,
    pub camera: Arc<ScriptedCamera>,
    pub navigator: Arc<RecordingNavigator>,
    pub status: Arc<RecordingStatusView>,
    pub session: SessionStore,
}

impl Harness {
    pub fn new() -> Self {
        Self::with(RecordingGateway::new(), ScriptedCamera::new())
    }

    pub fn with(gateway: RecordingGateway, camera: ScriptedCamera) -> Self {
        Self {
            gateway: Arc::new(gateway),
            camera: Arc::new(camera),
            navigator: Arc::new(RecordingNavigator::default()),
            status: Arc::new(RecordingStatusView::default()),
            session: SessionStore::new(Arc::new(MemoryStore::new())),
        }
    }

    pub fn env(&self) -> PageEnv {
        PageEnv {
            gateway: self.gateway.clone(),
            session: self.session.clone(),
            navigator: self.navigator.clone(),
            status_view: self.status.clone(),
            camera: self.camera.clone(),
            camera_config: CameraConfig {
                width: 64,
                height: 48,
                ..CameraConfig::default()
            },
            ui: UiConfig::default(),
        }
    }
}

//! Login page controller
//!
//! Two tabs: username/password and face. Either path stores the returned
//! user as the session and moves to the dashboard after a short delay.

use std::time::Duration;

use crate::domain::result::{Error, Result, ValidationError};
use crate::domain::{EncodedImage, LoginForm, Page, User};
use crate::ports::{Credentials, FaceLoginRequest};
use crate::services::camera::CameraController;
use crate::services::control::Control;
use crate::services::page::{LoadOutcome, PageEnv};
use crate::services::status::StatusReporter;

pub const LOGIN_SUCCESS_MESSAGE: &str = "Login successful! Redirecting...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginTab {
    Password,
    Face,
}

pub struct LoginPage {
    env: PageEnv,
    status: StatusReporter,
    camera: CameraController,
    tab: LoginTab,
    face_username: String,
    login_control: Control,
    face_login_control: Control,
    start_camera_control: Control,
}

impl LoginPage {
    pub fn new(env: PageEnv) -> Self {
        let status = env.status_reporter();
        let camera = env.camera_controller();
        Self {
            env,
            status,
            camera,
            tab: LoginTab::Password,
            face_username: String::new(),
            login_control: Control::new("Login"),
            face_login_control: Control::hidden("Login with Face"),
            start_camera_control: Control::new("Start Camera"),
        }
    }

    /// Skip straight to the dashboard when a session already exists
    pub fn load(&mut self) -> LoadOutcome {
        if self.env.signed_in_user().is_some() {
            self.env.navigator.navigate(Page::Dashboard, Duration::ZERO);
            return LoadOutcome::Redirected;
        }
        LoadOutcome::Ready
    }

    pub fn tab(&self) -> LoginTab {
        self.tab
    }

    /// Switching tabs always drops the camera and any captured frame
    pub fn select_tab(&mut self, tab: LoginTab) {
        self.tab = tab;
        self.camera.reset();
        self.refresh_face_control();
    }

    pub fn start_camera(&mut self) -> Result<()> {
        let _loading = self.start_camera_control.begin()?;
        self.camera.acquire()?;
        Ok(())
    }

    pub fn capture_photo(&mut self) -> Option<EncodedImage> {
        let image = self.camera.capture();
        self.refresh_face_control();
        image
    }

    pub fn set_face_username(&mut self, username: impl Into<String>) {
        self.face_username = username.into();
        self.refresh_face_control();
    }

    pub fn face_username(&self) -> &str {
        &self.face_username
    }

    fn refresh_face_control(&self) {
        let ready = !self.face_username.is_empty() && self.camera.captured_image().is_some();
        self.face_login_control.set_visible(ready);
    }

    pub fn submit_password(&mut self, username: &str, password: &str) -> Result<User> {
        let form = LoginForm::new(username, password);
        if let Err(e) = form.validate() {
            return Err(self.fail(e.into()));
        }

        let response = {
            let _loading = self.login_control.begin()?;
            self.env.gateway.login(&Credentials {
                username: form.username.clone(),
                password: form.password.clone(),
            })
        };

        match response {
            Ok(response) => {
                tracing::info!(username = %form.username, "password login succeeded");
                self.complete_login(response.user, LOGIN_SUCCESS_MESSAGE.to_string())
            }
            Err(e) => {
                tracing::info!(username = %form.username, error = %e, "password login failed");
                Err(self.fail(e.into()))
            }
        }
    }

    pub fn submit_face(&mut self) -> Result<User> {
        if self.face_username.is_empty() {
            return Err(self.fail(ValidationError::MissingUsername.into()));
        }
        let Some(face_image) = self.camera.captured_image().cloned() else {
            return Err(self.fail(ValidationError::MissingFaceCapture.into()));
        };

        let response = {
            let _loading = self.face_login_control.begin()?;
            self.env.gateway.face_login(&FaceLoginRequest {
                username: self.face_username.clone(),
                face_image,
            })
        };

        match response {
            Ok(response) => {
                tracing::info!(username = %self.face_username, "face login succeeded");
                let message = response
                    .message
                    .filter(|m| !m.is_empty())
                    .unwrap_or_else(|| LOGIN_SUCCESS_MESSAGE.to_string());
                self.complete_login(response.user, message)
            }
            Err(e) => {
                tracing::info!(username = %self.face_username, error = %e, "face login failed");
                Err(self.fail(e.into()))
            }
        }
    }

    pub fn go_to_register(&mut self) {
        self.camera.release();
        self.env.navigator.navigate(Page::Register, Duration::ZERO);
    }

    /// Persist the user, announce, then head to the dashboard
    fn complete_login(&mut self, user: User, message: String) -> Result<User> {
        if let Err(e) = self.env.session.set_user(&user) {
            return Err(self.fail(e));
        }
        self.status.success(message);
        self.env
            .navigator
            .navigate(Page::Dashboard, self.env.ui.login_redirect_delay());
        Ok(user)
    }

    fn fail(&mut self, error: Error) -> Error {
        self.status.error(error.to_string());
        error
    }

    pub fn status(&self) -> &StatusReporter {
        &self.status
    }

    pub fn status_mut(&mut self) -> &mut StatusReporter {
        &mut self.status
    }

    pub fn camera(&self) -> &CameraController {
        &self.camera
    }

    pub fn login_control(&self) -> &Control {
        &self.login_control
    }

    pub fn face_login_control(&self) -> &Control {
        &self.face_login_control
    }

    pub fn start_camera_control(&self) -> &Control {
        &self.start_camera_control
    }
}

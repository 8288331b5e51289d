//! Registration page controller

use std::time::Duration;

use crate::domain::result::{Error, Result, ValidationError};
use crate::domain::{EncodedImage, Page, RegistrationField, RegistrationForm, User};
use crate::ports::RegisterRequest;
use crate::services::camera::CameraController;
use crate::services::control::Control;
use crate::services::page::{LoadOutcome, PageEnv};
use crate::services::status::StatusReporter;

pub const REGISTER_SUCCESS_MESSAGE: &str = "Registration successful! You can now log in.";

pub struct RegisterPage {
    env: PageEnv,
    status: StatusReporter,
    camera: CameraController,
    form: RegistrationForm,
    submit_control: Control,
    start_camera_control: Control,
}

impl RegisterPage {
    pub fn new(env: PageEnv) -> Self {
        let status = env.status_reporter();
        let camera = env.camera_controller();
        let submit_control = Control::new("Register");
        submit_control.set_enabled(false);
        Self {
            env,
            status,
            camera,
            form: RegistrationForm::default(),
            submit_control,
            start_camera_control: Control::new("Start Camera"),
        }
    }

    pub fn load(&mut self) -> LoadOutcome {
        if self.env.signed_in_user().is_some() {
            self.env.navigator.navigate(Page::Dashboard, Duration::ZERO);
            return LoadOutcome::Redirected;
        }
        LoadOutcome::Ready
    }

    pub fn form(&self) -> &RegistrationForm {
        &self.form
    }

    /// Update one field and re-evaluate the submit control
    pub fn set_field(&mut self, field: RegistrationField, value: impl Into<String>) {
        self.form.set(field, value);
        self.refresh_submit();
    }

    pub fn confirm_password_hint(&self) -> Option<&'static str> {
        self.form.confirm_password_hint()
    }

    fn has_image(&self) -> bool {
        self.camera.captured_image().is_some()
    }

    fn refresh_submit(&self) {
        self.submit_control
            .set_enabled(self.form.is_submittable(self.has_image()));
    }

    pub fn start_camera(&mut self) -> Result<()> {
        let _loading = self.start_camera_control.begin()?;
        self.camera.acquire()?;
        Ok(())
    }

    pub fn capture_photo(&mut self) -> Option<EncodedImage> {
        let image = self.camera.capture();
        self.refresh_submit();
        image
    }

    /// Discard the captured photo and restart the camera
    pub fn retake(&mut self) -> Result<()> {
        let result = {
            let _loading = self.start_camera_control.begin()?;
            self.camera.retake()
        };
        self.refresh_submit();
        result.map_err(Error::from)
    }

    pub fn submit(&mut self) -> Result<User> {
        if let Err(e) = self.form.validate(self.has_image()) {
            return Err(self.fail(e.into()));
        }
        let Some(face_image) = self.camera.captured_image().cloned() else {
            return Err(self.fail(ValidationError::MissingImage.into()));
        };

        let request = RegisterRequest {
            username: self.form.username.clone(),
            email: self.form.email.clone(),
            password: self.form.password.clone(),
            face_image,
        };

        let response = {
            let _loading = self.submit_control.begin()?;
            self.env.gateway.register(&request)
        };

        match response {
            Ok(user) => {
                tracing::info!(username = %user.username, user_id = ?user.id, "registration succeeded");
                self.status.success(REGISTER_SUCCESS_MESSAGE);
                self.env
                    .navigator
                    .navigate(Page::Login, self.env.ui.register_redirect_delay());
                Ok(user)
            }
            Err(e) => {
                tracing::info!(username = %request.username, error = %e, "registration failed");
                Err(self.fail(e.into()))
            }
        }
    }

    pub fn go_to_login(&mut self) {
        self.camera.release();
        self.env.navigator.navigate(Page::Login, Duration::ZERO);
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

    pub fn submit_control(&self) -> &Control {
        &self.submit_control
    }

    pub fn start_camera_control(&self) -> &Control {
        &self.start_camera_control
    }
}

//! Terminal host for the page controllers
//!
//! Implements page navigation and status rendering on top of the terminal,
//! plus the prompt-driven camera flow shared by the login and register
//! pages.

use std::sync::Mutex;
use std::time::Duration;

use anyhow::{bail, Result};
use dialoguer::Confirm;
use indicatif::{ProgressBar, ProgressStyle};

use faceauth_core::domain::{StatusKind, StatusMessage};
use faceauth_core::ports::{Navigator, StatusView};
use faceauth_core::services::{CameraController, LoginPage, PreviewContent, RegisterPage};
use faceauth_core::{EncodedImage, Page};

use crate::output;

/// Remembers the last requested navigation until the host acts on it
#[derive(Default)]
pub struct TerminalNavigator {
    pending: Mutex<Option<(Page, Duration)>>,
}

impl TerminalNavigator {
    pub fn take(&self) -> Option<(Page, Duration)> {
        self.pending.lock().ok().and_then(|mut p| p.take())
    }
}

impl Navigator for TerminalNavigator {
    fn navigate(&self, page: Page, delay: Duration) {
        tracing::debug!(%page, delay_ms = delay.as_millis() as u64, "navigation requested");
        if let Ok(mut pending) = self.pending.lock() {
            *pending = Some((page, delay));
        }
    }
}

/// Prints status messages as colored lines
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalStatusView {
    /// Suppress output (for --json runs)
    pub quiet: bool,
}

impl StatusView for TerminalStatusView {
    fn render(&self, message: &StatusMessage) {
        if self.quiet {
            return;
        }
        match message.kind {
            StatusKind::Success => output::success(&message.text),
            StatusKind::Error => output::error(&message.text),
            StatusKind::Info => output::info(&message.text),
        }
    }

    // Printed lines stay on screen
    fn clear(&self) {}
}

/// Show a spinner for the redirect delay, then return the target page
pub fn follow(navigation: (Page, Duration), quiet: bool) -> Page {
    let (page, delay) = navigation;
    if delay.is_zero() || quiet {
        return page;
    }
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner());
    spinner.set_message(format!("Opening {}...", page));
    spinner.enable_steady_tick(Duration::from_millis(80));
    std::thread::sleep(delay);
    spinner.finish_and_clear();
    page
}

pub fn spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

/// Pages with a camera panel
pub trait CameraPage {
    fn start_camera(&mut self) -> faceauth_core::domain::result::Result<()>;
    fn capture_photo(&mut self) -> Option<EncodedImage>;
    fn camera(&self) -> &CameraController;
}

impl CameraPage for LoginPage {
    fn start_camera(&mut self) -> faceauth_core::domain::result::Result<()> {
        LoginPage::start_camera(self)
    }

    fn capture_photo(&mut self) -> Option<EncodedImage> {
        LoginPage::capture_photo(self)
    }

    fn camera(&self) -> &CameraController {
        LoginPage::camera(self)
    }
}

impl CameraPage for RegisterPage {
    fn start_camera(&mut self) -> faceauth_core::domain::result::Result<()> {
        RegisterPage::start_camera(self)
    }

    fn capture_photo(&mut self) -> Option<EncodedImage> {
        RegisterPage::capture_photo(self)
    }

    fn camera(&self) -> &CameraController {
        RegisterPage::camera(self)
    }
}

pub fn describe_preview(preview: &PreviewContent) -> Option<String> {
    match preview {
        PreviewContent::Empty => None,
        PreviewContent::Live { width, height } => Some(format!("Camera on ({}x{})", width, height)),
        PreviewContent::Still(image) => Some(format!(
            "Photo captured ({}, {})",
            output::format_size(image.len() as u64),
            image.fingerprint()
        )),
        PreviewContent::Message(message) => Some(message.clone()),
    }
}

/// Start the camera, wait for the user, capture one frame
pub fn capture_with_prompt<P: CameraPage>(page: &mut P, interactive: bool, quiet: bool) -> Result<EncodedImage> {
    if let Err(e) = page.start_camera() {
        if let PreviewContent::Message(message) = page.camera().preview() {
            bail!("{}", message);
        }
        bail!("{}", e);
    }
    if !quiet {
        if let Some(line) = describe_preview(page.camera().preview()) {
            output::info(&line);
        }
    }

    if interactive {
        let ready = Confirm::new()
            .with_prompt("Look at the camera. Capture now?")
            .default(true)
            .interact()?;
        if !ready {
            bail!("Capture cancelled");
        }
    }

    let Some(image) = page.capture_photo() else {
        bail!("Could not capture a photo from {}", page.camera().device_name());
    };
    if !quiet {
        if let Some(line) = describe_preview(page.camera().preview()) {
            output::success(&line);
        }
    }
    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_navigator_keeps_latest_request() {
        let navigator = TerminalNavigator::default();
        assert!(navigator.take().is_none());
        navigator.navigate(Page::Register, Duration::ZERO);
        navigator.navigate(Page::Dashboard, Duration::from_millis(1500));
        assert_eq!(navigator.take(), Some((Page::Dashboard, Duration::from_millis(1500))));
        assert!(navigator.take().is_none());
    }

    #[test]
    fn test_follow_without_delay_is_immediate() {
        assert_eq!(follow((Page::Login, Duration::ZERO), false), Page::Login);
        assert_eq!(follow((Page::Dashboard, Duration::from_secs(60)), true), Page::Dashboard);
    }

    #[test]
    fn test_describe_preview() {
        assert_eq!(describe_preview(&PreviewContent::Empty), None);
        assert_eq!(
            describe_preview(&PreviewContent::Live { width: 640, height: 480 }).unwrap(),
            "Camera on (640x480)"
        );
    }
}

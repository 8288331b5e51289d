//! Configuration management
//!
//! Settings live in `settings.json` inside the faceauth directory:
//! ```json
//! {
//!   "api": { "baseUrl": "http://localhost:8000", "faceLoginStyle": "usernameAndImage", ... },
//!   "camera": { "source": "ffmpeg", "device": "/dev/video0", "jpegQuality": 0.8, ... },
//!   "ui": { "statusClearMs": 5000, "loginRedirectMs": 1500, "registerRedirectMs": 2000 }
//! }
//! ```
//! Keys the client doesn't know about are kept when saving.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::ports::VideoConstraints;

pub const SETTINGS_FILE: &str = "settings.json";

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    api: ApiConfig,
    #[serde(default)]
    camera: CameraConfig,
    #[serde(default)]
    ui: UiConfig,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

/// How the face-login request is shaped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FaceLoginStyle {
    /// `{username, <imageField>}` to the face-login endpoint
    #[default]
    UsernameAndImage,
    /// `{<imageField>}` only; the backend identifies the face on its own
    ImageOnly,
}

/// Endpoint paths relative to the base URL. `{id}` is substituted in `user`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoints {
    pub register: String,
    pub login: String,
    pub face_login: String,
    pub user: String,
    pub health: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            register: "/api/register".to_string(),
            login: "/api/login".to_string(),
            face_login: "/api/face-login".to_string(),
            user: "/api/users/{id}".to_string(),
            health: "/api/health".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub endpoints: Endpoints,
    /// JSON field carrying the captured image
    #[serde(default = "default_image_field")]
    pub image_field: String,
    #[serde(default)]
    pub face_login_style: FaceLoginStyle,
    /// Fields searched, in order, for an error message in non-2xx bodies
    #[serde(default = "default_error_fields")]
    pub error_message_fields: Vec<String>,
    /// None disables the request timeout
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_image_field() -> String {
    "face_image".to_string()
}

fn default_error_fields() -> Vec<String> {
    vec!["detail".to_string(), "message".to_string(), "error".to_string()]
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            endpoints: Endpoints::default(),
            image_field: default_image_field(),
            face_login_style: FaceLoginStyle::default(),
            error_message_fields: default_error_fields(),
            request_timeout_secs: None,
        }
    }
}

impl ApiConfig {
    /// Validate the base URL
    pub fn parsed_base_url(&self) -> Result<Url> {
        let url = Url::parse(&self.base_url)
            .map_err(|e| anyhow::anyhow!("Invalid API base URL '{}': {}", self.base_url, e))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            anyhow::bail!("API base URL must use http or https");
        }
        Ok(url)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraSource {
    /// Live device read through ffmpeg
    #[default]
    Ffmpeg,
    /// Frames served from an image file
    Still,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraConfig {
    #[serde(default)]
    pub source: CameraSource,
    #[serde(default = "default_device")]
    pub device: String,
    #[serde(default)]
    pub still_image: Option<PathBuf>,
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    /// JPEG quality between 0 and 1
    #[serde(default = "default_quality")]
    pub jpeg_quality: f32,
}

fn default_device() -> String {
    if cfg!(target_os = "macos") {
        "0".to_string()
    } else if cfg!(target_os = "windows") {
        "video=Integrated Camera".to_string()
    } else {
        "/dev/video0".to_string()
    }
}

fn default_width() -> u32 {
    640
}

fn default_height() -> u32 {
    480
}

fn default_quality() -> f32 {
    0.8
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            source: CameraSource::default(),
            device: default_device(),
            still_image: None,
            width: default_width(),
            height: default_height(),
            jpeg_quality: default_quality(),
        }
    }
}

impl CameraConfig {
    pub fn constraints(&self) -> VideoConstraints {
        VideoConstraints {
            width: self.width,
            height: self.height,
        }
    }

    /// Quality on the encoder's 1-100 scale
    pub fn encoder_quality(&self) -> u8 {
        (self.jpeg_quality * 100.0).round().clamp(1.0, 100.0) as u8
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiConfig {
    #[serde(default = "default_status_clear_ms")]
    pub status_clear_ms: u64,
    #[serde(default = "default_login_redirect_ms")]
    pub login_redirect_ms: u64,
    #[serde(default = "default_register_redirect_ms")]
    pub register_redirect_ms: u64,
}

fn default_status_clear_ms() -> u64 {
    5000
}

fn default_login_redirect_ms() -> u64 {
    1500
}

fn default_register_redirect_ms() -> u64 {
    2000
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            status_clear_ms: default_status_clear_ms(),
            login_redirect_ms: default_login_redirect_ms(),
            register_redirect_ms: default_register_redirect_ms(),
        }
    }
}

impl UiConfig {
    pub fn status_clear_delay(&self) -> Duration {
        Duration::from_millis(self.status_clear_ms)
    }

    pub fn login_redirect_delay(&self) -> Duration {
        Duration::from_millis(self.login_redirect_ms)
    }

    pub fn register_redirect_delay(&self) -> Duration {
        Duration::from_millis(self.register_redirect_ms)
    }
}

/// faceauth configuration
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub api: ApiConfig,
    pub camera: CameraConfig,
    pub ui: UiConfig,
    // Unknown top-level keys, preserved on save
    other: HashMap<String, serde_json::Value>,
}

impl Config {
    /// Load config from the faceauth directory
    ///
    /// Environment overrides:
    /// - `FACEAUTH_API_URL` replaces `api.baseUrl`
    /// - `FACEAUTH_CAMERA_DEVICE` replaces `camera.device`
    pub fn load(faceauth_dir: &Path) -> Result<Self> {
        let settings_path = faceauth_dir.join(SETTINGS_FILE);

        let raw: SettingsFile = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)?;
            match serde_json::from_str(&content) {
                Ok(raw) => raw,
                Err(e) => {
                    tracing::warn!(path = %settings_path.display(), error = %e, "ignoring unreadable settings file");
                    SettingsFile::default()
                }
            }
        } else {
            SettingsFile::default()
        };

        let mut config = Self {
            api: raw.api,
            camera: raw.camera,
            ui: raw.ui,
            other: raw.other,
        };

        if let Ok(url) = std::env::var("FACEAUTH_API_URL") {
            if !url.is_empty() {
                config.api.base_url = url;
            }
        }
        if let Ok(device) = std::env::var("FACEAUTH_CAMERA_DEVICE") {
            if !device.is_empty() {
                config.camera.device = device;
            }
        }

        Ok(config)
    }

    /// Save config to the faceauth directory
    pub fn save(&self, faceauth_dir: &Path) -> Result<()> {
        let settings_path = faceauth_dir.join(SETTINGS_FILE);

        let settings = SettingsFile {
            api: self.api.clone(),
            camera: self.camera.clone(),
            ui: self.ui.clone(),
            other: self.other.clone(),
        };

        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(&settings_path, content)?;
        Ok(())
    }

    /// Settings as JSON, for display
    pub fn to_json(&self) -> Result<serde_json::Value> {
        let settings = SettingsFile {
            api: self.api.clone(),
            camera: self.camera.clone(),
            ui: self.ui.clone(),
            other: HashMap::new(),
        };
        Ok(serde_json::to_value(settings)?)
    }

    /// Set a value by dotted camelCase path, e.g. `api.baseUrl`
    ///
    /// The value is parsed as JSON first and falls back to a plain string.
    pub fn set_path(&mut self, path: &str, value: &str) -> Result<()> {
        let mut json = self.to_json()?;
        let parsed: serde_json::Value = serde_json::from_str(value)
            .unwrap_or_else(|_| serde_json::Value::String(value.to_string()));

        let mut parts = path.split('.').peekable();
        let mut cursor = &mut json;
        while let Some(part) = parts.next() {
            let obj = cursor
                .as_object_mut()
                .ok_or_else(|| anyhow::anyhow!("'{}' is not a settings section", path))?;
            if parts.peek().is_none() {
                if !obj.contains_key(part) {
                    anyhow::bail!("Unknown setting: {}", path);
                }
                obj.insert(part.to_string(), parsed);
                break;
            }
            cursor = obj
                .get_mut(part)
                .ok_or_else(|| anyhow::anyhow!("Unknown setting: {}", path))?;
        }

        let updated: SettingsFile = serde_json::from_value(json)
            .map_err(|e| anyhow::anyhow!("Invalid value for {}: {}", path, e))?;
        self.api = updated.api;
        self.camera = updated.camera;
        self.ui = updated.ui;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_without_file() {
        let dir = tempdir().unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.api.endpoints.face_login, "/api/face-login");
        assert_eq!(config.api.image_field, "face_image");
        assert_eq!(config.api.request_timeout_secs, None);
        assert_eq!(config.camera.constraints(), VideoConstraints { width: 640, height: 480 });
        assert_eq!(config.camera.encoder_quality(), 80);
        assert_eq!(config.ui.login_redirect_delay(), Duration::from_millis(1500));
    }

    #[test]
    fn test_partial_file_and_unknown_keys_preserved() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join(SETTINGS_FILE),
            r#"{"api":{"baseUrl":"http://localhost:5000","faceLoginStyle":"imageOnly","imageField":"face_data"},
               "theme":"dark"}"#,
        )
        .unwrap();

        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.api.face_login_style, FaceLoginStyle::ImageOnly);
        assert_eq!(config.api.image_field, "face_data");
        assert_eq!(config.api.endpoints.register, "/api/register");

        config.save(dir.path()).unwrap();
        let saved = std::fs::read_to_string(dir.path().join(SETTINGS_FILE)).unwrap();
        assert!(saved.contains("\"theme\": \"dark\""));
    }

    #[test]
    fn test_corrupt_file_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(SETTINGS_FILE), "{not json").unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.ui.status_clear_ms, 5000);
    }

    #[test]
    fn test_set_path() {
        let mut config = Config::default();
        config.set_path("ui.loginRedirectMs", "10").unwrap();
        config.set_path("api.endpoints.faceLogin", "/api/login").unwrap();
        config.set_path("camera.source", "still").unwrap();
        assert_eq!(config.ui.login_redirect_ms, 10);
        assert_eq!(config.api.endpoints.face_login, "/api/login");
        assert_eq!(config.camera.source, CameraSource::Still);

        assert!(config.set_path("api.nope", "1").is_err());
        assert!(config.set_path("ui.loginRedirectMs", "soon").is_err());
    }

    #[test]
    fn test_base_url_validation() {
        let mut api = ApiConfig::default();
        assert!(api.parsed_base_url().is_ok());
        api.base_url = "ftp://example.com".to_string();
        assert!(api.parsed_base_url().is_err());
    }
}

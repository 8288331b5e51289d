//! Result and error types for the core library

use thiserror::Error;

/// Failure to obtain or use the capture device
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeviceAccessError {
    #[error("Camera access was denied")]
    PermissionDenied,

    #[error("No camera found")]
    NotFound,

    #[error("Camera is already in use")]
    Busy,

    #[error("Camera error: {0}")]
    Other(String),
}

impl DeviceAccessError {
    /// Message shown in the preview when acquisition fails
    pub fn preview_message(&self) -> String {
        let cause = match self {
            Self::PermissionDenied => "Please allow access to the camera.".to_string(),
            Self::NotFound => "No camera found.".to_string(),
            Self::Busy => "The camera is already in use.".to_string(),
            Self::Other(_) => "Check that your camera is connected.".to_string(),
        };
        format!("Unable to access the camera. {}", cause)
    }
}

/// Backend request failure (non-2xx status or transport problem)
///
/// `Display` is exactly the message meant for the user.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("{message}")]
    Server { status: u16, message: String },

    #[error("{0}")]
    Transport(String),

    #[error("Unexpected response from server: {0}")]
    Decode(String),
}

impl GatewayError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Client-side form rule violation. Never sent to the backend.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please fill in all fields.")]
    EmptyFields,

    #[error("Passwords do not match.")]
    PasswordMismatch,

    #[error("Password must contain a minimum 6 characters.")]
    PasswordTooShort,

    #[error("Please capture your photo for face recognition.")]
    MissingImage,

    #[error("Please enter a valid email address.")]
    InvalidEmail,

    #[error("Please enter your username.")]
    MissingUsername,

    #[error("Please capture your photo first.")]
    MissingFaceCapture,
}

/// Core library error type
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Device(#[from] DeviceAccessError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Another action is already in progress")]
    Busy,

    #[error("The signed-in user has no id. Log in again to refresh your profile.")]
    MissingUserId,

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Image error: {0}")]
    Image(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// True for failures caught before anything reached the backend
    pub fn is_local(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::Busy | Self::MissingUserId)
    }
}

/// Core library result type
pub type Result<T> = std::result::Result<T, Error>;

//! Authentication backend port
//!
//! Defines the four account calls the pages make plus a liveness probe.
//! Implementations issue exactly one request per call: no retries, no
//! backoff.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::result::GatewayError;
use crate::domain::{EncodedImage, User};

/// Registration payload
#[derive(Clone)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub face_image: EncodedImage,
}

impl fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("face_image", &self.face_image)
            .finish_non_exhaustive()
    }
}

/// Username/password login payload
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

/// Face login payload
#[derive(Debug, Clone)]
pub struct FaceLoginRequest {
    pub username: String,
    pub face_image: EncodedImage,
}

/// Successful login: the authenticated user plus the server's message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginResponse {
    pub user: User,
    pub message: Option<String>,
}

/// Liveness probe result
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub database: Option<String>,
}

impl HealthStatus {
    /// A backend without a status field is taken at its 2xx word
    pub fn is_healthy(&self) -> bool {
        match self.status.as_deref() {
            Some(status) => status.eq_ignore_ascii_case("healthy") || status.eq_ignore_ascii_case("ok"),
            None => true,
        }
    }
}

/// Authentication backend
pub trait AuthGateway: Send + Sync {
    /// Create an account; returns the user record the backend created
    fn register(&self, request: &RegisterRequest) -> Result<User, GatewayError>;

    /// Username/password login
    fn login(&self, credentials: &Credentials) -> Result<LoginResponse, GatewayError>;

    /// Face login with a captured frame
    fn face_login(&self, request: &FaceLoginRequest) -> Result<LoginResponse, GatewayError>;

    /// Fetch a user record by id
    fn get_user(&self, id: i64) -> Result<User, GatewayError>;

    /// Backend liveness probe
    fn health(&self) -> Result<HealthStatus, GatewayError>;
}

//! Port definitions (hexagonal architecture)
//!
//! Ports define the interfaces for external dependencies. Services depend
//! only on these traits, not on concrete implementations.

mod capture;
mod gateway;
mod shell;
mod storage;

pub use capture::{CaptureDevice, VideoConstraints, VideoStream};
pub use gateway::{
    AuthGateway, Credentials, FaceLoginRequest, HealthStatus, LoginResponse, RegisterRequest,
};
pub use shell::{Navigator, StatusView};
pub use storage::KeyValueStore;

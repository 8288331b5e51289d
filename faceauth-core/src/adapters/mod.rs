//! Adapter implementations (hexagonal architecture)
//!
//! Concrete implementations of the port traits.

pub mod ffmpeg;
pub mod file_store;
pub mod http;
#[cfg(test)]
pub mod mock_backend;
pub mod still_image;

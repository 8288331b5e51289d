//! Core domain entities
//!
//! Plain data structures and validation rules. No I/O happens here.

pub mod form;
mod image;
mod page;
pub mod result;
pub mod status;
mod user;

pub use form::{LoginForm, RegistrationField, RegistrationForm};
pub use image::EncodedImage;
pub use page::Page;
pub use result::{DeviceAccessError, GatewayError, ValidationError};
pub use status::{StatusKind, StatusMessage};
pub use user::User;

//! Form state and client-side validation rules

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

use crate::domain::result::ValidationError;

pub const MIN_PASSWORD_LEN: usize = 6;

fn email_pattern() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"))
}

/// Simple shape check, not RFC 5322
pub fn is_valid_email(email: &str) -> bool {
    email_pattern().is_match(email)
}

/// Password login fields
#[derive(Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

impl LoginForm {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.username.is_empty() || self.password.is_empty() {
            return Err(ValidationError::EmptyFields);
        }
        Ok(())
    }
}

impl fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginForm")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Registration form fields
#[derive(Clone, Default, PartialEq, Eq)]
pub struct RegistrationForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// Editable registration fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationField {
    Username,
    Email,
    Password,
    ConfirmPassword,
}

impl RegistrationForm {
    pub fn set(&mut self, field: RegistrationField, value: impl Into<String>) {
        let value = value.into();
        match field {
            RegistrationField::Username => self.username = value,
            RegistrationField::Email => self.email = value,
            RegistrationField::Password => self.password = value,
            RegistrationField::ConfirmPassword => self.confirm_password = value,
        }
    }

    /// Submit-time validation.
    ///
    /// Rules are checked in a fixed order and the first violation wins:
    /// empty fields, password mismatch, password length, missing image,
    /// email shape.
    pub fn validate(&self, has_image: bool) -> Result<(), ValidationError> {
        if self.username.is_empty()
            || self.email.is_empty()
            || self.password.is_empty()
            || self.confirm_password.is_empty()
        {
            return Err(ValidationError::EmptyFields);
        }

        if self.password != self.confirm_password {
            return Err(ValidationError::PasswordMismatch);
        }

        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ValidationError::PasswordTooShort);
        }

        if !has_image {
            return Err(ValidationError::MissingImage);
        }

        if !is_valid_email(&self.email) {
            return Err(ValidationError::InvalidEmail);
        }

        Ok(())
    }

    /// Live check that drives the submit control.
    ///
    /// Trims username and email and skips the email shape check; submit
    /// still enforces it.
    pub fn is_submittable(&self, has_image: bool) -> bool {
        !self.username.trim().is_empty()
            && !self.email.trim().is_empty()
            && !self.password.is_empty()
            && !self.confirm_password.is_empty()
            && self.password == self.confirm_password
            && self.password.chars().count() >= MIN_PASSWORD_LEN
            && has_image
    }

    /// Inline hint on the confirm field while it disagrees with the password
    pub fn confirm_password_hint(&self) -> Option<&'static str> {
        if !self.confirm_password.is_empty() && self.password != self.confirm_password {
            Some("Passwords do not match")
        } else {
            None
        }
    }
}

impl fmt::Debug for RegistrationForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistrationForm")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

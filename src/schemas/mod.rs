pub mod auth;
pub mod restaurant;
pub mod signup;
pub mod staff;

pub use auth::*;
pub use restaurant::*;
pub use signup::*;
pub use staff::*;

use std::borrow::Cow;

use serde::Serialize;
use validator::ValidationError;

pub const PASSWORD_SPECIALS: &str = "@$!%*?&";
pub const PASSWORD_RULE: &str = "Password must contain at least one uppercase letter, one lowercase letter, one number, and one special character (@$!%*?&)";

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}

/// At least 8 characters with a lowercase letter, an uppercase letter, a digit
/// and one of `@$!%*?&`.
pub fn validate_password_strength(password: &str) -> Result<(), ValidationError> {
    if password.chars().count() < 8 {
        return Err(invalid(
            "password_length",
            "Password must be at least 8 characters long",
        ));
    }
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_special = password.chars().any(|c| PASSWORD_SPECIALS.contains(c));
    if has_lower && has_upper && has_digit && has_special {
        Ok(())
    } else {
        Err(invalid("password_strength", PASSWORD_RULE))
    }
}

/// `#RRGGBB`
pub fn validate_hex_color(value: &str) -> Result<(), ValidationError> {
    let valid = value.len() == 7
        && value.starts_with('#')
        && value[1..].chars().all(|c| c.is_ascii_hexdigit());
    if valid {
        Ok(())
    } else {
        Err(invalid("hex_color", "Color must be a valid hex color (#RRGGBB)"))
    }
}

pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(invalid("blank", "This value should not be blank"))
    } else {
        Ok(())
    }
}

/// Plain `{ "message": ... }` acknowledgement.
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

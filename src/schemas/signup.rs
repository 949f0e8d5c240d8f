use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{validate_not_blank, validate_password_strength};
use crate::services::signup::AdminSignup;

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AdminSignupRequest {
    #[validate(
        email(message = "Please provide a valid email address"),
        length(max = 180, message = "Email cannot be longer than 180 characters")
    )]
    pub email: String,
    #[validate(custom(function = "validate_password_strength"))]
    pub password: String,
    #[validate(
        custom(function = "validate_not_blank"),
        length(max = 100, message = "First name cannot be longer than 100 characters")
    )]
    pub first_name: String,
    #[validate(
        custom(function = "validate_not_blank"),
        length(max = 100, message = "Last name cannot be longer than 100 characters")
    )]
    pub last_name: String,
    #[validate(length(max = 20, message = "Phone number cannot be longer than 20 characters"))]
    pub phone_number: Option<String>,
    #[validate(
        custom(function = "validate_not_blank"),
        length(max = 255, message = "Restaurant name cannot be longer than 255 characters")
    )]
    pub restaurant_name: String,
    #[validate(
        email(message = "Please provide a valid restaurant email address"),
        length(max = 180, message = "Restaurant email cannot be longer than 180 characters")
    )]
    pub restaurant_email: Option<String>,
}

impl From<AdminSignupRequest> for AdminSignup {
    fn from(req: AdminSignupRequest) -> Self {
        Self {
            email: req.email,
            password: req.password,
            first_name: req.first_name,
            last_name: req.last_name,
            phone_number: req.phone_number,
            restaurant_name: req.restaurant_name,
            restaurant_email: req.restaurant_email,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminSignupResponse {
    pub message: String,
    pub user_id: i64,
    pub restaurant_id: i64,
    pub email: String,
    pub restaurant_name: String,
    pub verification_required: bool,
    pub verification_email_sent: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VerifyEmailQuery {
    pub token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmailQuery {
    pub email: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ResendVerificationRequest {
    #[validate(email(message = "Please provide a valid email address"))]
    pub email: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyEmailResponse {
    pub message: String,
    pub user_id: i64,
    pub email: String,
    pub restaurant_id: Option<i64>,
    pub restaurant_name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldRule {
    pub field: &'static str,
    pub required: bool,
    pub rules: Vec<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequirements {
    pub fields: Vec<FieldRule>,
    pub password_policy: &'static str,
}

impl SignupRequirements {
    pub fn describe() -> Self {
        let rule = |field, required, rules: &[&'static str]| FieldRule {
            field,
            required,
            rules: rules.to_vec(),
        };
        Self {
            fields: vec![
                rule("email", true, &["valid email address", "max 180 characters", "unique"]),
                rule("password", true, &["min 8 characters", super::PASSWORD_RULE]),
                rule("firstName", true, &["max 100 characters"]),
                rule("lastName", true, &["max 100 characters"]),
                rule("phoneNumber", false, &["max 20 characters"]),
                rule("restaurantName", true, &["max 255 characters"]),
                rule("restaurantEmail", false, &["valid email address", "max 180 characters"]),
            ],
            password_policy: super::PASSWORD_RULE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> AdminSignupRequest {
        serde_json::from_value(serde_json::json!({
            "email": "owner@example.com",
            "password": "Str0ng!Pass",
            "firstName": "Olive",
            "lastName": "Owner",
            "restaurantName": "Olive Garden Party"
        }))
        .unwrap()
    }

    #[test]
    fn test_valid_signup_request() {
        assert!(request().validate().is_ok());
    }

    #[test]
    fn test_signup_request_field_errors() {
        let mut req = request();
        req.email = "not-an-email".into();
        req.password = "weakpass".into();
        req.restaurant_name = "   ".into();
        req.restaurant_email = Some("nope".into());

        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
        assert!(fields.contains_key("restaurant_name"));
        assert!(fields.contains_key("restaurant_email"));
        assert!(!fields.contains_key("first_name"));
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{restaurant, user};
use crate::services::auth::Permissions;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(
        email(message = "Please provide a valid email address"),
        length(max = 180, message = "Email cannot be longer than 180 characters")
    )]
    pub email: String,
    #[validate(length(min = 1, message = "Password cannot be empty"))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub initials: String,
    pub phone_number: Option<String>,
    pub role: user::Role,
    pub is_active: bool,
    pub email_verified: bool,
    pub restaurant_id: Option<i64>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl From<&user::Model> for UserInfo {
    fn from(user: &user::Model) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            full_name: user.full_name(),
            initials: user.initials(),
            phone_number: user.phone_number.clone(),
            role: user.role,
            is_active: user.is_active,
            email_verified: user.email_verified,
            restaurant_id: user.restaurant_id,
            last_login_at: user.last_login_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantSummary {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub logo_url: Option<String>,
    pub is_active: bool,
}

impl From<&restaurant::Model> for RestaurantSummary {
    fn from(r: &restaurant::Model) -> Self {
        Self {
            id: r.id,
            name: r.name.clone(),
            slug: r.slug.clone(),
            email: r.email.clone(),
            phone_number: r.phone_number.clone(),
            address: r.address.clone(),
            logo_url: r.logo_url.clone(),
            is_active: r.is_active,
        }
    }
}

/// Body of a successful login or token refresh.
#[derive(Debug, Clone, Serialize)]
pub struct TokenResponse {
    pub message: String,
    pub token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
    pub user: UserInfo,
    pub restaurant: Option<RestaurantSummary>,
    pub permissions: Permissions,
}

/// Answer of the public status check; the fields are empty for anonymous callers.
#[derive(Debug, Clone, Serialize)]
pub struct AuthStatusResponse {
    pub authenticated: bool,
    pub user_id: Option<i64>,
    pub email: Option<String>,
    pub roles: Vec<user::Role>,
    pub timestamp: DateTime<Utc>,
}

impl AuthStatusResponse {
    pub fn new(user: Option<&user::Model>, timestamp: DateTime<Utc>) -> Self {
        Self {
            authenticated: user.is_some(),
            user_id: user.map(|u| u.id),
            email: user.map(|u| u.email.clone()),
            roles: user.map(|u| u.role.granted()).unwrap_or_default(),
            timestamp,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MeResponse {
    pub user: UserInfo,
    pub restaurant: Option<RestaurantSummary>,
    pub permissions: Permissions,
}

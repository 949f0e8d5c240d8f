//! Credential checks, role permissions and the user → restaurant lookup.

use chrono::{DateTime, Utc};
use sea_orm::{sea_query::Expr, ColumnTrait, EntityTrait, QueryFilter};
use serde::Serialize;

use crate::config::CONFIG;
use crate::error::{AppError, Result};
use crate::models::restaurant;
use crate::models::user::{self, Role};
use crate::services::{normalize_email, security};
use crate::state::DbConn;

pub const INVALID_CREDENTIALS: &str = "Email or password is incorrect";
pub const EMAIL_NOT_VERIFIED: &str = "Please verify your email address before logging in";
pub const ACCOUNT_DEACTIVATED: &str = "Account has been deactivated. Please contact support.";
pub const INSUFFICIENT_PRIVILEGES: &str = "Insufficient privileges";

/// Capability flags derived from a role.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Permissions {
    pub can_view_menu: bool,
    pub can_manage_menu: bool,
    pub can_manage_tables: bool,
    pub can_manage_orders: bool,
    pub can_manage_staff: bool,
    pub can_manage_restaurant: bool,
    pub can_view_analytics: bool,
    pub can_manage_payments: bool,
    pub can_view_reports: bool,
}

impl Permissions {
    pub fn for_role(role: Role) -> Self {
        match role {
            Role::Admin => Self {
                can_view_menu: true,
                can_manage_menu: true,
                can_manage_tables: true,
                can_manage_orders: true,
                can_manage_staff: true,
                can_manage_restaurant: true,
                can_view_analytics: true,
                can_manage_payments: true,
                can_view_reports: true,
            },
            Role::Manager => Self {
                can_view_menu: true,
                can_manage_menu: true,
                can_manage_tables: true,
                can_manage_orders: true,
                can_view_analytics: true,
                can_view_reports: true,
                ..Self::default()
            },
            Role::Staff => Self {
                can_view_menu: true,
                can_manage_orders: true,
                ..Self::default()
            },
            Role::Customer => Self {
                can_view_menu: true,
                ..Self::default()
            },
            Role::User => Self::default(),
        }
    }
}

/// Reject accounts that may not hold a session, in login order.
pub fn ensure_can_sign_in(user: &user::Model) -> Result<()> {
    if !user.email_verified {
        return Err(AppError::Forbidden(EMAIL_NOT_VERIFIED.to_string()));
    }
    if !user.is_active {
        return Err(AppError::Forbidden(ACCOUNT_DEACTIVATED.to_string()));
    }
    if !user.role.includes(Role::Staff) {
        return Err(AppError::Forbidden(INSUFFICIENT_PRIVILEGES.to_string()));
    }
    Ok(())
}

/// Check email and password, then the account state.
pub async fn authenticate(db: &DbConn, email: &str, password: &str) -> Result<user::Model> {
    let email = normalize_email(email);
    let user = user::Entity::find()
        .filter(user::Column::Email.eq(email.as_str()))
        .one(db)
        .await?;

    let Some(user) = user else {
        tracing::warn!(email = %email, "Login attempt with unknown email");
        security::verify_dummy_password(password);
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    };

    if !security::verify_password(password, &user.hashed_password) {
        tracing::warn!(user_id = user.id, "Login attempt with invalid password");
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    }

    if let Err(e) = ensure_can_sign_in(&user) {
        tracing::warn!(user_id = user.id, reason = %e, "Login rejected");
        return Err(e);
    }

    Ok(user)
}

pub async fn record_login(
    db: &DbConn,
    user: &user::Model,
    now: DateTime<Utc>,
) -> Result<user::Model> {
    user::Entity::update_many()
        .col_expr(user::Column::LastLoginAt, Expr::value(now))
        .filter(user::Column::Id.eq(user.id))
        .exec(db)
        .await?;

    Ok(user::Model {
        last_login_at: Some(now),
        ..user.clone()
    })
}

/// The restaurant a user belongs to, through `users.restaurant_id`.
pub async fn restaurant_for_user(
    db: &DbConn,
    user: &user::Model,
) -> Result<Option<restaurant::Model>> {
    match user.restaurant_id {
        Some(id) => Ok(restaurant::Entity::find_by_id(id).one(db).await?),
        None => Ok(None),
    }
}

/// Signed access token plus its lifetime in seconds.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_in: i64,
}

pub fn issue_token(user: &user::Model) -> Result<IssuedToken> {
    Ok(IssuedToken {
        token: security::create_access_token(user)?,
        expires_in: CONFIG.auth.access_token_ttl_secs,
    })
}

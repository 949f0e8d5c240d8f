//! Admin signup and email verification.

use chrono::Duration;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use serde::Serialize;

use crate::config::CONFIG;
use crate::error::{AppError, Result};
use crate::models::restaurant::{self, slugify};
use crate::models::user::{self, Role};
use crate::models::verification_token::{self, TokenType};
use crate::services::clock::SharedClock;
use crate::services::notification::NotificationService;
use crate::services::{is_unique_violation, normalize_email, security};
use crate::state::{AppState, DbConn};

pub const EMAIL_TAKEN: &str = "An account with this email already exists";

#[derive(Debug, Clone)]
pub struct AdminSignup {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: Option<String>,
    pub restaurant_name: String,
    pub restaurant_email: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SignupOutcome {
    pub user: user::Model,
    pub restaurant: restaurant::Model,
    pub verification_email_sent: bool,
}

#[derive(Debug, Clone)]
pub struct VerifiedAccount {
    pub user: user::Model,
    pub restaurant: Option<restaurant::Model>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResendOutcome {
    Sent,
    /// Nothing was sent; the response must not reveal whether the email exists.
    UnknownEmail,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerificationStatus {
    pub exists: bool,
    pub verified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_type: Option<&'static str>,
}

#[derive(Clone)]
pub struct SignupService {
    db: DbConn,
    notification: NotificationService,
    clock: SharedClock,
    frontend_url: String,
}

impl SignupService {
    pub fn from_state(state: &AppState) -> Self {
        Self {
            db: state.db.clone(),
            notification: state.notification.clone(),
            clock: state.clock.clone(),
            frontend_url: CONFIG.frontend_url.clone(),
        }
    }

    pub fn verification_url(&self, token: &str) -> String {
        format!("{}/verify-email?token={}", self.frontend_url, token)
    }

    /// Create an inactive restaurant and its unverified admin, then email a verification link.
    pub async fn signup(&self, input: AdminSignup) -> Result<SignupOutcome> {
        let email = normalize_email(&input.email);
        if find_user_by_email(&self.db, &email).await?.is_some() {
            return Err(AppError::Conflict(EMAIL_TAKEN.to_string()));
        }

        let hashed_password = security::hash_password(&input.password)?;
        let now = self.clock.now();

        let txn = self.db.begin().await?;

        let restaurant_name = input.restaurant_name.trim().to_string();
        let slug = unique_slug(&txn, &restaurant_name).await?;
        let restaurant = restaurant::ActiveModel {
            name: Set(restaurant_name),
            slug: Set(slug),
            email: Set(input
                .restaurant_email
                .as_deref()
                .map(normalize_email)
                .filter(|e| !e.is_empty())),
            service_types: Set(serde_json::json!([])),
            accepts_reservations: Set(false),
            has_delivery: Set(false),
            has_takeout: Set(false),
            is_active: Set(false),
            is_verified: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let user = user::ActiveModel {
            email: Set(email),
            first_name: Set(input.first_name.trim().to_string()),
            last_name: Set(input.last_name.trim().to_string()),
            phone_number: Set(input
                .phone_number
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty())),
            role: Set(Role::Admin),
            hashed_password: Set(hashed_password),
            is_active: Set(false),
            email_verified: Set(false),
            restaurant_id: Set(Some(restaurant.id)),
            last_login_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict(EMAIL_TAKEN.to_string())
            } else {
                AppError::Database(e)
            }
        })?;

        let token = issue_verification_token(&txn, user.id, now).await?;

        txn.commit().await?;

        tracing::info!(
            user_id = user.id,
            restaurant_id = restaurant.id,
            "Admin account created, awaiting email verification"
        );

        let url = self.verification_url(&token.token);
        let verification_email_sent = self
            .notification
            .send_admin_verification(&user, &restaurant, &url)
            .await;

        Ok(SignupOutcome {
            user,
            restaurant,
            verification_email_sent,
        })
    }

    /// Redeem an email verification token and activate the account.
    pub async fn verify(&self, token: &str) -> Result<VerifiedAccount> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AppError::BadRequest("No verification token provided".to_string()));
        }

        let now = self.clock.now();
        let record = verification_token::Entity::find()
            .filter(verification_token::Column::Token.eq(token))
            .filter(verification_token::Column::TokenType.eq(TokenType::EmailVerification))
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::BadRequest("Invalid verification token".to_string()))?;

        if record.is_used {
            return Err(AppError::BadRequest(
                "This verification link has already been used".to_string(),
            ));
        }
        if record.is_expired(now) {
            return Err(AppError::BadRequest(
                "This verification link has expired. Please request a new one.".to_string(),
            ));
        }

        let txn = self.db.begin().await?;

        // Claim the token first so a double click cannot verify twice.
        let claimed = verification_token::Entity::update_many()
            .col_expr(verification_token::Column::IsUsed, Expr::value(true))
            .col_expr(verification_token::Column::UsedAt, Expr::value(now))
            .filter(verification_token::Column::Id.eq(record.id))
            .filter(verification_token::Column::IsUsed.eq(false))
            .exec(&txn)
            .await?;
        if claimed.rows_affected != 1 {
            return Err(AppError::BadRequest(
                "This verification link has already been used".to_string(),
            ));
        }

        let user = user::Entity::find_by_id(record.user_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let mut active: user::ActiveModel = user.into();
        active.email_verified = Set(true);
        active.is_active = Set(true);
        active.updated_at = Set(now);
        let user = active.update(&txn).await?;

        let restaurant = match (user.role.is_admin(), user.restaurant_id) {
            (true, Some(restaurant_id)) => {
                match restaurant::Entity::find_by_id(restaurant_id).one(&txn).await? {
                    Some(restaurant) => {
                        let mut active: restaurant::ActiveModel = restaurant.into();
                        active.is_active = Set(true);
                        active.is_verified = Set(true);
                        active.updated_at = Set(now);
                        Some(active.update(&txn).await?)
                    }
                    None => None,
                }
            }
            _ => None,
        };

        txn.commit().await?;

        tracing::info!(
            user_id = user.id,
            restaurant_id = ?restaurant.as_ref().map(|r| r.id),
            "Email verification successful"
        );

        if let Some(restaurant) = &restaurant {
            self.notification.send_admin_welcome(&user, restaurant).await;
        }

        Ok(VerifiedAccount { user, restaurant })
    }

    /// Replace any outstanding verification token and send a new link.
    pub async fn resend(&self, email: &str) -> Result<ResendOutcome> {
        let email = normalize_email(email);
        let Some(user) = find_user_by_email(&self.db, &email).await? else {
            return Ok(ResendOutcome::UnknownEmail);
        };
        if user.email_verified {
            return Err(AppError::BadRequest(
                "This email address is already verified".to_string(),
            ));
        }

        let now = self.clock.now();
        let txn = self.db.begin().await?;

        verification_token::Entity::update_many()
            .col_expr(verification_token::Column::IsUsed, Expr::value(true))
            .col_expr(verification_token::Column::UsedAt, Expr::value(now))
            .filter(verification_token::Column::UserId.eq(user.id))
            .filter(verification_token::Column::TokenType.eq(TokenType::EmailVerification))
            .filter(verification_token::Column::IsUsed.eq(false))
            .exec(&txn)
            .await?;
        let token = issue_verification_token(&txn, user.id, now).await?;

        txn.commit().await?;

        let url = self.verification_url(&token.token);
        let restaurant = match user.restaurant_id {
            Some(id) => restaurant::Entity::find_by_id(id).one(&self.db).await?,
            None => None,
        };
        match restaurant {
            Some(restaurant) => {
                self.notification
                    .send_admin_verification(&user, &restaurant, &url)
                    .await;
            }
            None => tracing::warn!(
                user_id = user.id,
                "No restaurant for unverified user, email skipped"
            ),
        }

        tracing::info!(user_id = user.id, "Verification email resent");
        Ok(ResendOutcome::Sent)
    }

    pub async fn status(&self, email: &str) -> Result<VerificationStatus> {
        let email = normalize_email(email);
        Ok(match find_user_by_email(&self.db, &email).await? {
            Some(user) => VerificationStatus {
                exists: true,
                verified: user.email_verified,
                active: Some(user.is_active),
                user_id: Some(user.id),
                user_type: Some(if user.role.is_admin() { "admin" } else { "user" }),
            },
            None => VerificationStatus {
                exists: false,
                verified: false,
                active: None,
                user_id: None,
                user_type: None,
            },
        })
    }
}

pub(crate) async fn find_user_by_email<C: ConnectionTrait>(
    conn: &C,
    email: &str,
) -> Result<Option<user::Model>> {
    Ok(user::Entity::find()
        .filter(user::Column::Email.eq(email))
        .one(conn)
        .await?)
}

async fn issue_verification_token<C: ConnectionTrait>(
    conn: &C,
    user_id: i64,
    now: chrono::DateTime<chrono::Utc>,
) -> Result<verification_token::Model> {
    Ok(verification_token::ActiveModel {
        token: Set(security::generate_token()),
        token_type: Set(TokenType::EmailVerification),
        user_id: Set(user_id),
        expires_at: Set(now + Duration::hours(CONFIG.auth.verification_ttl_hours)),
        is_used: Set(false),
        created_at: Set(now),
        used_at: Set(None),
        ..Default::default()
    }
    .insert(conn)
    .await?)
}

/// `slugify(name)`, suffixed `-2`, `-3`... until no restaurant uses it.
pub(crate) async fn unique_slug<C: ConnectionTrait>(conn: &C, name: &str) -> Result<String> {
    let base = slugify(name);
    let mut candidate = base.clone();
    let mut n = 1;
    while restaurant::Entity::find()
        .filter(restaurant::Column::Slug.eq(candidate.as_str()))
        .one(conn)
        .await?
        .is_some()
    {
        n += 1;
        candidate = format!("{}-{}", base, n);
    }
    Ok(candidate)
}

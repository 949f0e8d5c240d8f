//! Staff invitation lifecycle.
//!
//! ```text
//! pending ──accept──▶ accepted ──remove──▶ removed
//!    │
//!    ├──cancel──▶ cancelled
//!    └──(time)──▶ expired
//! ```
//!
//! Every transition is a conditional `UPDATE ... WHERE status = <from>` so two
//! racing requests cannot both move the same row. Expiry is evaluated lazily
//! against the injected clock and made durable by [`InvitationService::sweep_expired`].

use chrono::{DateTime, Duration, Utc};
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::Serialize;
use thiserror::Error;

use crate::application::config::invitation::{MAX_EXPIRY_DAYS, MIN_EXPIRY_DAYS};
use crate::config::CONFIG;
use crate::error::AppError;
use crate::models::staff_invitation::{self, InvitationStatus, StaffRole};
use crate::models::{restaurant, user};
use crate::services::clock::SharedClock;
use crate::services::notification::NotificationService;
use crate::services::{is_unique_violation, normalize_email, security};
use crate::state::{AppState, DbConn};

#[derive(Debug, Error)]
pub enum InvitationError {
    #[error("A user with this email already exists")]
    DuplicateUser,

    #[error("A pending invitation already exists for this email")]
    DuplicateInvitation,

    #[error("Invalid or expired invitation token")]
    InvalidToken,

    #[error("{0}")]
    InvalidState(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("Storage error: {0}")]
    Storage(#[from] DbErr),

    #[error("{0}")]
    Internal(String),
}

impl From<InvitationError> for AppError {
    fn from(err: InvitationError) -> Self {
        match err {
            InvitationError::Storage(e) => AppError::Database(e),
            InvitationError::Internal(msg) => AppError::Internal(msg),
            other => AppError::BadRequest(other.to_string()),
        }
    }
}

pub type InvitationResult<T> = std::result::Result<T, InvitationError>;

/// Input for [`InvitationService::create`].
#[derive(Debug, Clone)]
pub struct NewInvitation {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: StaffRole,
    pub expiry_days: i64,
    pub message: Option<String>,
}

/// Account created by accepting an invitation.
#[derive(Debug, Clone)]
pub struct AcceptedInvitation {
    pub user: user::Model,
    pub invitation: staff_invitation::Model,
}

/// Invitation counts for one restaurant, by effective status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvitationStats {
    pub pending: u64,
    pub accepted: u64,
    pub cancelled: u64,
    pub expired: u64,
    pub removed: u64,
    pub total: u64,
}

impl InvitationStats {
    fn record(&mut self, status: InvitationStatus) {
        match status {
            InvitationStatus::Pending => self.pending += 1,
            InvitationStatus::Accepted => self.accepted += 1,
            InvitationStatus::Cancelled => self.cancelled += 1,
            InvitationStatus::Expired => self.expired += 1,
            InvitationStatus::Removed => self.removed += 1,
        }
        self.total += 1;
    }
}

#[derive(Clone)]
pub struct InvitationService {
    db: DbConn,
    notification: NotificationService,
    clock: SharedClock,
    frontend_url: String,
}

impl InvitationService {
    pub fn new(
        db: DbConn,
        notification: NotificationService,
        clock: SharedClock,
        frontend_url: impl Into<String>,
    ) -> Self {
        Self {
            db,
            notification,
            clock,
            frontend_url: frontend_url.into(),
        }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(
            state.db.clone(),
            state.notification.clone(),
            state.clock.clone(),
            CONFIG.frontend_url.clone(),
        )
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn invitation_url(&self, token: &str) -> String {
        format!("{}/staff/onboard?token={}", self.frontend_url, token)
    }

    // ========================================================================
    // Transitions
    // ========================================================================

    /// Issue a new pending invitation and email it.
    pub async fn create(
        &self,
        input: NewInvitation,
        restaurant: &restaurant::Model,
        invited_by: &user::Model,
    ) -> InvitationResult<staff_invitation::Model> {
        if !(MIN_EXPIRY_DAYS..=MAX_EXPIRY_DAYS).contains(&input.expiry_days) {
            return Err(InvitationError::InvalidInput(format!(
                "Expiry days must be between {} and {}",
                MIN_EXPIRY_DAYS, MAX_EXPIRY_DAYS
            )));
        }
        let email = normalize_email(&input.email);
        if email.is_empty() {
            return Err(InvitationError::InvalidInput("Email is required".to_string()));
        }
        if user_exists(&self.db, &email).await? {
            return Err(InvitationError::DuplicateUser);
        }

        let now = self.clock.now();
        let txn = self.db.begin().await?;

        // A pending row past its expiry must not block a fresh invitation.
        staff_invitation::Entity::update_many()
            .col_expr(
                staff_invitation::Column::Status,
                Expr::value(InvitationStatus::Expired),
            )
            .filter(staff_invitation::Column::RestaurantId.eq(restaurant.id))
            .filter(staff_invitation::Column::Email.eq(email.as_str()))
            .filter(staff_invitation::Column::Status.eq(InvitationStatus::Pending))
            .filter(staff_invitation::Column::ExpiresAt.lte(now))
            .exec(&txn)
            .await?;

        let active = staff_invitation::Entity::find()
            .filter(staff_invitation::Column::RestaurantId.eq(restaurant.id))
            .filter(staff_invitation::Column::Email.eq(email.as_str()))
            .filter(staff_invitation::Column::Status.eq(InvitationStatus::Pending))
            .one(&txn)
            .await?;
        if active.is_some() {
            return Err(InvitationError::DuplicateInvitation);
        }

        let invitation = staff_invitation::ActiveModel {
            restaurant_id: Set(restaurant.id),
            invited_by_id: Set(invited_by.id),
            user_id: Set(None),
            email: Set(email),
            first_name: Set(input.first_name.trim().to_string()),
            last_name: Set(input.last_name.trim().to_string()),
            role: Set(input.role),
            token: Set(security::generate_token()),
            status: Set(InvitationStatus::Pending),
            created_at: Set(now),
            expires_at: Set(now + Duration::days(input.expiry_days)),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                InvitationError::DuplicateInvitation
            } else {
                InvitationError::Storage(e)
            }
        })?;

        txn.commit().await?;

        tracing::info!(
            invitation_id = invitation.id,
            restaurant_id = restaurant.id,
            invited_by = invited_by.id,
            role = %invitation.role.as_str(),
            "Staff invitation created"
        );

        let url = self.invitation_url(&invitation.token);
        self.notification
            .send_staff_invitation(&invitation, restaurant, &url, input.message.as_deref())
            .await;

        Ok(invitation)
    }

    /// Redeem `token`: create the staff account and mark the invitation accepted.
    pub async fn accept(
        &self,
        token: &str,
        password: &str,
        phone_number: Option<String>,
    ) -> InvitationResult<AcceptedInvitation> {
        let hashed_password = security::hash_password(password)
            .map_err(|e| InvitationError::Internal(e.to_string()))?;

        let now = self.clock.now();
        let txn = self.db.begin().await?;

        let invitation = find_valid_by_token(&txn, token, now)
            .await?
            .ok_or(InvitationError::InvalidToken)?;

        if user_exists(&txn, &invitation.email).await? {
            return Err(InvitationError::DuplicateUser);
        }

        let claimed = staff_invitation::Entity::update_many()
            .col_expr(
                staff_invitation::Column::Status,
                Expr::value(InvitationStatus::Accepted),
            )
            .col_expr(staff_invitation::Column::AcceptedAt, Expr::value(now))
            .filter(staff_invitation::Column::Id.eq(invitation.id))
            .filter(staff_invitation::Column::Token.eq(token))
            .filter(staff_invitation::Column::Status.eq(InvitationStatus::Pending))
            .filter(staff_invitation::Column::ExpiresAt.gt(now))
            .exec(&txn)
            .await?;
        if claimed.rows_affected != 1 {
            return Err(InvitationError::InvalidToken);
        }

        let user = user::ActiveModel {
            email: Set(invitation.email.clone()),
            first_name: Set(invitation.first_name.clone()),
            last_name: Set(invitation.last_name.clone()),
            phone_number: Set(phone_number
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty())),
            role: Set(invitation.role.into()),
            hashed_password: Set(hashed_password),
            is_active: Set(true),
            email_verified: Set(true),
            restaurant_id: Set(Some(invitation.restaurant_id)),
            last_login_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                InvitationError::DuplicateUser
            } else {
                InvitationError::Storage(e)
            }
        })?;

        staff_invitation::Entity::update_many()
            .col_expr(staff_invitation::Column::UserId, Expr::value(user.id))
            .filter(staff_invitation::Column::Id.eq(invitation.id))
            .exec(&txn)
            .await?;

        let invitation = staff_invitation::Entity::find_by_id(invitation.id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                InvitationError::Internal("Invitation vanished during acceptance".to_string())
            })?;

        txn.commit().await?;

        tracing::info!(
            invitation_id = invitation.id,
            user_id = user.id,
            restaurant_id = invitation.restaurant_id,
            "Staff invitation accepted"
        );

        match restaurant::Entity::find_by_id(invitation.restaurant_id)
            .one(&self.db)
            .await
        {
            Ok(Some(restaurant)) => {
                self.notification.send_staff_welcome(&user, &restaurant).await;
            }
            Ok(None) => tracing::warn!(
                restaurant_id = invitation.restaurant_id,
                "Restaurant missing, skipping staff welcome email"
            ),
            Err(e) => tracing::warn!("Failed to load restaurant for welcome email: {}", e),
        }

        Ok(AcceptedInvitation { user, invitation })
    }

    /// Cancel a pending invitation. A lapsed invitation already reads as
    /// expired and stays that way, whether or not the sweep has run.
    pub async fn cancel(
        &self,
        invitation: &staff_invitation::Model,
        cancelled_by: &user::Model,
    ) -> InvitationResult<staff_invitation::Model> {
        const NOT_CANCELLABLE: &str = "Only pending invitations can be cancelled";

        let now = self.clock.now();
        ensure_transition(invitation, now, InvitationStatus::Cancelled, NOT_CANCELLABLE)?;
        let result = staff_invitation::Entity::update_many()
            .col_expr(
                staff_invitation::Column::Status,
                Expr::value(InvitationStatus::Cancelled),
            )
            .col_expr(staff_invitation::Column::CancelledAt, Expr::value(now))
            .col_expr(
                staff_invitation::Column::CancelledById,
                Expr::value(cancelled_by.id),
            )
            .filter(staff_invitation::Column::Id.eq(invitation.id))
            .filter(staff_invitation::Column::Status.eq(InvitationStatus::Pending))
            .filter(staff_invitation::Column::ExpiresAt.gt(now))
            .exec(&self.db)
            .await?;
        if result.rows_affected != 1 {
            return Err(InvitationError::InvalidState(NOT_CANCELLABLE.to_string()));
        }

        tracing::info!(
            invitation_id = invitation.id,
            cancelled_by = cancelled_by.id,
            "Staff invitation cancelled"
        );
        self.reload(invitation.id).await
    }

    /// End an accepted membership. The linked account is deactivated in the same transaction.
    pub async fn remove(
        &self,
        invitation: &staff_invitation::Model,
        removed_by: &user::Model,
    ) -> InvitationResult<staff_invitation::Model> {
        const NOT_REMOVABLE: &str = "Only accepted invitations can be removed";

        let now = self.clock.now();
        ensure_transition(invitation, now, InvitationStatus::Removed, NOT_REMOVABLE)?;
        let txn = self.db.begin().await?;

        let result = staff_invitation::Entity::update_many()
            .col_expr(
                staff_invitation::Column::Status,
                Expr::value(InvitationStatus::Removed),
            )
            .col_expr(staff_invitation::Column::RemovedAt, Expr::value(now))
            .col_expr(
                staff_invitation::Column::RemovedById,
                Expr::value(removed_by.id),
            )
            .filter(staff_invitation::Column::Id.eq(invitation.id))
            .filter(staff_invitation::Column::Status.eq(InvitationStatus::Accepted))
            .exec(&txn)
            .await?;
        if result.rows_affected != 1 {
            return Err(InvitationError::InvalidState(NOT_REMOVABLE.to_string()));
        }

        if let Some(user_id) = invitation.user_id {
            deactivate_user(&txn, user_id, now).await?;
        }

        txn.commit().await?;

        tracing::info!(
            invitation_id = invitation.id,
            user_id = ?invitation.user_id,
            removed_by = removed_by.id,
            "Staff member removed"
        );
        self.reload(invitation.id).await
    }

    /// Send the invitation email again with the same token. Returns whether delivery succeeded.
    pub async fn resend(&self, invitation: &staff_invitation::Model) -> InvitationResult<bool> {
        if !invitation.is_pending(self.clock.now()) {
            return Err(InvitationError::InvalidState(
                "Only pending invitations can be resent".to_string(),
            ));
        }
        let restaurant = restaurant::Entity::find_by_id(invitation.restaurant_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| {
                InvitationError::Internal("Invitation restaurant not found".to_string())
            })?;

        let url = self.invitation_url(&invitation.token);
        let delivered = self
            .notification
            .send_staff_invitation(invitation, &restaurant, &url, None)
            .await;

        tracing::info!(invitation_id = invitation.id, delivered, "Staff invitation resent");
        Ok(delivered)
    }

    /// Persist expiry for every pending invitation past its deadline. Idempotent.
    pub async fn sweep_expired(&self) -> InvitationResult<u64> {
        let now = self.clock.now();
        let result = staff_invitation::Entity::update_many()
            .col_expr(
                staff_invitation::Column::Status,
                Expr::value(InvitationStatus::Expired),
            )
            .filter(staff_invitation::Column::Status.eq(InvitationStatus::Pending))
            .filter(staff_invitation::Column::ExpiresAt.lte(now))
            .exec(&self.db)
            .await?;

        if result.rows_affected > 0 {
            tracing::info!(count = result.rows_affected, "Expired stale staff invitations");
        }
        Ok(result.rows_affected)
    }

    pub async fn stats(&self, restaurant_id: i64) -> InvitationResult<InvitationStats> {
        let now = self.clock.now();
        let invitations = staff_invitation::Entity::find()
            .filter(staff_invitation::Column::RestaurantId.eq(restaurant_id))
            .all(&self.db)
            .await?;

        let mut stats = InvitationStats::default();
        for invitation in &invitations {
            stats.record(invitation.effective_status(now));
        }
        Ok(stats)
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub async fn find_by_token(
        &self,
        token: &str,
    ) -> InvitationResult<Option<staff_invitation::Model>> {
        Ok(staff_invitation::Entity::find()
            .filter(staff_invitation::Column::Token.eq(token))
            .one(&self.db)
            .await?)
    }

    /// Pending and unexpired invitation for `token`.
    pub async fn find_valid_by_token(
        &self,
        token: &str,
    ) -> InvitationResult<Option<staff_invitation::Model>> {
        Ok(find_valid_by_token(&self.db, token, self.clock.now()).await?)
    }

    /// Lookup scoped to one restaurant; other restaurants' rows read as missing.
    pub async fn find_for_restaurant(
        &self,
        id: i64,
        restaurant_id: i64,
    ) -> InvitationResult<Option<staff_invitation::Model>> {
        Ok(staff_invitation::Entity::find_by_id(id)
            .filter(staff_invitation::Column::RestaurantId.eq(restaurant_id))
            .one(&self.db)
            .await?)
    }

    /// All invitations of a restaurant, newest first.
    pub async fn list_for_restaurant(
        &self,
        restaurant_id: i64,
    ) -> InvitationResult<Vec<staff_invitation::Model>> {
        Ok(staff_invitation::Entity::find()
            .filter(staff_invitation::Column::RestaurantId.eq(restaurant_id))
            .order_by_desc(staff_invitation::Column::CreatedAt)
            .order_by_desc(staff_invitation::Column::Id)
            .all(&self.db)
            .await?)
    }

    pub async fn list_pending_for_restaurant(
        &self,
        restaurant_id: i64,
    ) -> InvitationResult<Vec<staff_invitation::Model>> {
        Ok(staff_invitation::Entity::find()
            .filter(staff_invitation::Column::RestaurantId.eq(restaurant_id))
            .filter(staff_invitation::Column::Status.eq(InvitationStatus::Pending))
            .filter(staff_invitation::Column::ExpiresAt.gt(self.clock.now()))
            .order_by_desc(staff_invitation::Column::CreatedAt)
            .order_by_desc(staff_invitation::Column::Id)
            .all(&self.db)
            .await?)
    }

    /// Accepted invitation that produced `user_id` in this restaurant.
    pub async fn find_accepted_for_user(
        &self,
        user_id: i64,
        restaurant_id: i64,
    ) -> InvitationResult<Option<staff_invitation::Model>> {
        Ok(staff_invitation::Entity::find()
            .filter(staff_invitation::Column::UserId.eq(user_id))
            .filter(staff_invitation::Column::RestaurantId.eq(restaurant_id))
            .filter(staff_invitation::Column::Status.eq(InvitationStatus::Accepted))
            .one(&self.db)
            .await?)
    }

    async fn reload(&self, id: i64) -> InvitationResult<staff_invitation::Model> {
        staff_invitation::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| InvitationError::Internal(format!("Invitation {} not found", id)))
    }
}

/// The stored row, read with lazy expiry, must be allowed to move to `next`.
/// The conditional update that follows still decides races.
fn ensure_transition(
    invitation: &staff_invitation::Model,
    now: DateTime<Utc>,
    next: InvitationStatus,
    message: &str,
) -> InvitationResult<()> {
    if invitation.effective_status(now).can_transition_to(next) {
        Ok(())
    } else {
        Err(InvitationError::InvalidState(message.to_string()))
    }
}

async fn find_valid_by_token<C: ConnectionTrait>(
    conn: &C,
    token: &str,
    now: DateTime<Utc>,
) -> Result<Option<staff_invitation::Model>, DbErr> {
    staff_invitation::Entity::find()
        .filter(staff_invitation::Column::Token.eq(token))
        .filter(staff_invitation::Column::Status.eq(InvitationStatus::Pending))
        .filter(staff_invitation::Column::ExpiresAt.gt(now))
        .one(conn)
        .await
}

async fn user_exists<C: ConnectionTrait>(conn: &C, email: &str) -> Result<bool, DbErr> {
    Ok(user::Entity::find()
        .filter(user::Column::Email.eq(email))
        .one(conn)
        .await?
        .is_some())
}

pub(crate) async fn deactivate_user<C: ConnectionTrait>(
    conn: &C,
    user_id: i64,
    now: DateTime<Utc>,
) -> Result<(), DbErr> {
    user::Entity::update_many()
        .col_expr(user::Column::IsActive, Expr::value(false))
        .col_expr(user::Column::UpdatedAt, Expr::value(now))
        .filter(user::Column::Id.eq(user_id))
        .exec(conn)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            InvitationError::DuplicateUser.to_string(),
            "A user with this email already exists"
        );
        assert_eq!(
            InvitationError::InvalidToken.to_string(),
            "Invalid or expired invitation token"
        );
        assert_eq!(
            InvitationError::InvalidState("Only pending invitations can be cancelled".into())
                .to_string(),
            "Only pending invitations can be cancelled"
        );
    }

    #[test]
    fn test_error_status_mapping() {
        let bad_request = [
            InvitationError::DuplicateUser,
            InvitationError::DuplicateInvitation,
            InvitationError::InvalidToken,
            InvitationError::InvalidState("x".into()),
            InvitationError::InvalidInput("x".into()),
        ];
        for err in bad_request {
            let response = AppError::from(err).into_response();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        }

        let storage = AppError::from(InvitationError::Storage(DbErr::Custom("boom".into())));
        assert_eq!(storage.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    fn invitation(status: InvitationStatus, expires_in: Duration) -> staff_invitation::Model {
        let now = Utc::now();
        staff_invitation::Model {
            id: 1,
            restaurant_id: 1,
            invited_by_id: 1,
            user_id: None,
            email: "cook@example.com".to_string(),
            first_name: "Cook".to_string(),
            last_name: String::new(),
            role: StaffRole::Staff,
            token: "t".to_string(),
            status,
            created_at: now,
            expires_at: now + expires_in,
            accepted_at: None,
            cancelled_at: None,
            cancelled_by_id: None,
            removed_at: None,
            removed_by_id: None,
        }
    }

    #[test]
    fn test_ensure_transition_reads_lazy_expiry() {
        let now = Utc::now();
        let live = invitation(InvitationStatus::Pending, Duration::days(1));
        assert!(ensure_transition(&live, now, InvitationStatus::Cancelled, "no").is_ok());

        let lapsed = invitation(InvitationStatus::Pending, Duration::days(-1));
        let err = ensure_transition(&lapsed, now, InvitationStatus::Cancelled, "no").unwrap_err();
        assert!(matches!(err, InvitationError::InvalidState(msg) if msg == "no"));

        let accepted = invitation(InvitationStatus::Accepted, Duration::days(-1));
        assert!(ensure_transition(&accepted, now, InvitationStatus::Removed, "no").is_ok());
        assert!(ensure_transition(&accepted, now, InvitationStatus::Cancelled, "no").is_err());
    }

    #[test]
    fn test_stats_record() {
        let mut stats = InvitationStats::default();
        stats.record(InvitationStatus::Pending);
        stats.record(InvitationStatus::Expired);
        stats.record(InvitationStatus::Expired);
        assert_eq!(stats.pending, 1);
        assert_eq!(stats.expired, 2);
        assert_eq!(stats.total, 3);
    }
}

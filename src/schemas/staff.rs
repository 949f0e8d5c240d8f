use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{validate_not_blank, validate_password_strength, UserInfo};
use crate::application::config::invitation::{MAX_EXPIRY_DAYS, MIN_EXPIRY_DAYS};
use crate::config::CONFIG;
use crate::models::staff_invitation::{self, InvitationStatus, StaffRole};
use crate::models::{restaurant, user};
use crate::services::invitation::{InvitationStats, NewInvitation};
use crate::services::staff::StaffMember;

fn default_expiry_days() -> i64 {
    CONFIG.invitation.default_expiry_days
}

// ============================================================================
// Requests
// ============================================================================

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct StaffInvitationRequest {
    #[validate(
        email(message = "Please provide a valid email address"),
        length(max = 180, message = "Email cannot be longer than 180 characters")
    )]
    pub email: String,
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
    pub role: StaffRole,
    #[validate(length(max = 500, message = "Message cannot be longer than 500 characters"))]
    pub message: Option<String>,
    #[serde(default = "default_expiry_days")]
    #[validate(range(
        min = MIN_EXPIRY_DAYS,
        max = MAX_EXPIRY_DAYS,
        message = "Expiry days must be between 1 and 30"
    ))]
    pub expiry_days: i64,
}

impl From<StaffInvitationRequest> for NewInvitation {
    fn from(req: StaffInvitationRequest) -> Self {
        Self {
            email: req.email,
            first_name: req.first_name,
            last_name: req.last_name,
            role: req.role,
            expiry_days: req.expiry_days,
            message: req.message.filter(|m| !m.trim().is_empty()),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct StaffOnboardingRequest {
    #[validate(length(min = 1, message = "Invitation token is required"))]
    pub token: String,
    #[validate(custom(function = "validate_password_strength"))]
    pub password: String,
    #[validate(must_match(other = "password", message = "Passwords do not match"))]
    pub password_confirmation: String,
    #[validate(length(max = 20, message = "Phone number cannot be longer than 20 characters"))]
    pub phone_number: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateRoleRequest {
    pub role: StaffRole,
}

// ============================================================================
// Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvitationResponse {
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub role: StaffRole,
    pub status: InvitationStatus,
    pub restaurant_id: i64,
    pub invited_by_id: i64,
    pub user_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub accepted_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub removed_at: Option<DateTime<Utc>>,
    pub is_expired: bool,
}

impl InvitationResponse {
    /// Reports the effective status, so a lapsed pending row reads as expired.
    pub fn at(invitation: &staff_invitation::Model, now: DateTime<Utc>) -> Self {
        Self {
            id: invitation.id,
            email: invitation.email.clone(),
            first_name: invitation.first_name.clone(),
            last_name: invitation.last_name.clone(),
            full_name: invitation.full_name(),
            role: invitation.role,
            status: invitation.effective_status(now),
            restaurant_id: invitation.restaurant_id,
            invited_by_id: invitation.invited_by_id,
            user_id: invitation.user_id,
            created_at: invitation.created_at,
            expires_at: invitation.expires_at,
            accepted_at: invitation.accepted_at,
            cancelled_at: invitation.cancelled_at,
            removed_at: invitation.removed_at,
            is_expired: invitation.is_expired(now),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvitationCreatedResponse {
    pub message: String,
    pub invitation: InvitationResponse,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvitationListResponse {
    pub invitations: Vec<InvitationResponse>,
    pub stats: InvitationStats,
}

/// What an invitee sees before choosing a password.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvitationPreview {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: StaffRole,
    pub restaurant_name: String,
    pub expires_at: DateTime<Utc>,
}

impl InvitationPreview {
    pub fn new(invitation: &staff_invitation::Model, restaurant: &restaurant::Model) -> Self {
        Self {
            email: invitation.email.clone(),
            first_name: invitation.first_name.clone(),
            last_name: invitation.last_name.clone(),
            role: invitation.role,
            restaurant_name: restaurant.name.clone(),
            expires_at: invitation.expires_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingResponse {
    pub message: String,
    pub user: UserInfo,
    pub restaurant_id: i64,
    pub restaurant_name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffMemberResponse {
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub role: user::Role,
    pub phone_number: Option<String>,
    pub is_active: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub invitation_id: Option<i64>,
    pub joined_at: Option<DateTime<Utc>>,
}

impl From<&StaffMember> for StaffMemberResponse {
    fn from(member: &StaffMember) -> Self {
        let user = &member.user;
        Self {
            id: user.id,
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            full_name: user.full_name(),
            role: user.role,
            phone_number: user.phone_number.clone(),
            is_active: user.is_active,
            last_login_at: user.last_login_at,
            invitation_id: member.invitation_id,
            joined_at: member.joined_at.or(Some(user.created_at)),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffListResponse {
    pub staff: Vec<StaffMemberResponse>,
    pub total: usize,
}

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::user::Role;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "staff_invitations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub restaurant_id: i64,
    pub invited_by_id: i64,
    pub user_id: Option<i64>,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: StaffRole,
    #[sea_orm(unique)]
    #[serde(skip_serializing)]
    pub token: String,
    pub status: InvitationStatus,
    pub created_at: DateTimeUtc,
    pub expires_at: DateTimeUtc,
    pub accepted_at: Option<DateTimeUtc>,
    pub cancelled_at: Option<DateTimeUtc>,
    pub cancelled_by_id: Option<i64>,
    pub removed_at: Option<DateTimeUtc>,
    pub removed_by_id: Option<i64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::restaurant::Entity",
        from = "Column::RestaurantId",
        to = "super::restaurant::Column::Id"
    )]
    Restaurant,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::InvitedById",
        to = "super::user::Column::Id"
    )]
    InvitedBy,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::restaurant::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Restaurant.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    pub fn is_expired(&self, now: DateTimeUtc) -> bool {
        self.expires_at <= now
    }

    /// Pending and not yet past its expiry, regardless of whether the sweep ran.
    pub fn is_pending(&self, now: DateTimeUtc) -> bool {
        self.status == InvitationStatus::Pending && !self.is_expired(now)
    }

    /// Stored status with lazy expiry applied.
    pub fn effective_status(&self, now: DateTimeUtc) -> InvitationStatus {
        if self.status == InvitationStatus::Pending && self.is_expired(now) {
            InvitationStatus::Expired
        } else {
            self.status
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "lowercase")]
pub enum InvitationStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "accepted")]
    Accepted,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
    #[sea_orm(string_value = "expired")]
    Expired,
    #[sea_orm(string_value = "removed")]
    Removed,
}

impl InvitationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvitationStatus::Pending => "pending",
            InvitationStatus::Accepted => "accepted",
            InvitationStatus::Cancelled => "cancelled",
            InvitationStatus::Expired => "expired",
            InvitationStatus::Removed => "removed",
        }
    }

    /// Legal forward transitions. Nothing re-enters `pending`.
    pub fn can_transition_to(&self, next: InvitationStatus) -> bool {
        matches!(
            (self, next),
            (InvitationStatus::Pending, InvitationStatus::Accepted)
                | (InvitationStatus::Pending, InvitationStatus::Cancelled)
                | (InvitationStatus::Pending, InvitationStatus::Expired)
                | (InvitationStatus::Accepted, InvitationStatus::Removed)
        )
    }
}

impl std::fmt::Display for InvitationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Roles an invitation can grant.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "lowercase")]
pub enum StaffRole {
    #[sea_orm(string_value = "staff")]
    Staff,
    #[sea_orm(string_value = "manager")]
    Manager,
}

impl StaffRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            StaffRole::Staff => "staff",
            StaffRole::Manager => "manager",
        }
    }
}

impl std::fmt::Display for StaffRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<StaffRole> for Role {
    fn from(role: StaffRole) -> Self {
        match role {
            StaffRole::Staff => Role::Staff,
            StaffRole::Manager => Role::Manager,
        }
    }
}

impl TryFrom<Role> for StaffRole {
    type Error = Role;

    fn try_from(role: Role) -> Result<Self, Self::Error> {
        match role {
            Role::Staff => Ok(StaffRole::Staff),
            Role::Manager => Ok(StaffRole::Manager),
            other => Err(other),
        }
    }
}

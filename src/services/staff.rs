//! Restaurant staff membership.
//!
//! A member is a user whose `restaurant_id` is the restaurant and whose role is
//! staff or manager. Invitations stay as history; role changes only touch the
//! user row.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::Serialize;

use crate::error::{AppError, Result};
use crate::models::restaurant;
use crate::models::staff_invitation::{self, StaffRole};
use crate::models::user::{self, Role};
use crate::services::clock::SharedClock;
use crate::services::invitation::{deactivate_user, InvitationService};
use crate::services::notification::NotificationService;
use crate::state::{AppState, DbConn};

pub const MEMBER_NOT_FOUND: &str = "Staff member not found in this restaurant";

const STAFF_ROLES: [Role; 2] = [Role::Staff, Role::Manager];

#[derive(Debug, Clone)]
pub struct StaffMember {
    pub user: user::Model,
    pub invitation_id: Option<i64>,
    pub joined_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffStatistics {
    pub total_staff: u64,
    pub active_staff: u64,
    pub pending_invitations: u64,
    pub staff_by_role: BTreeMap<String, u64>,
}

#[derive(Clone)]
pub struct StaffService {
    db: DbConn,
    notification: NotificationService,
    clock: SharedClock,
    invitations: InvitationService,
}

impl StaffService {
    pub fn from_state(state: &AppState) -> Self {
        Self {
            db: state.db.clone(),
            notification: state.notification.clone(),
            clock: state.clock.clone(),
            invitations: InvitationService::from_state(state),
        }
    }

    /// Members of the restaurant, newest first, with the date they joined.
    pub async fn list_staff(&self, restaurant_id: i64) -> Result<Vec<StaffMember>> {
        let users = user::Entity::find()
            .filter(user::Column::RestaurantId.eq(restaurant_id))
            .filter(user::Column::Role.is_in(STAFF_ROLES))
            .order_by_desc(user::Column::CreatedAt)
            .order_by_desc(user::Column::Id)
            .all(&self.db)
            .await?;

        let user_ids: Vec<i64> = users.iter().map(|u| u.id).collect();
        let joined: HashMap<i64, (i64, Option<DateTime<Utc>>)> = staff_invitation::Entity::find()
            .filter(staff_invitation::Column::RestaurantId.eq(restaurant_id))
            .filter(staff_invitation::Column::UserId.is_in(user_ids))
            .all(&self.db)
            .await?
            .into_iter()
            .filter_map(|inv| inv.user_id.map(|uid| (uid, (inv.id, inv.accepted_at))))
            .collect();

        Ok(users
            .into_iter()
            .map(|user| {
                let (invitation_id, joined_at) = match joined.get(&user.id) {
                    Some((id, accepted_at)) => (Some(*id), *accepted_at),
                    None => (None, None),
                };
                StaffMember {
                    user,
                    invitation_id,
                    joined_at,
                }
            })
            .collect())
    }

    async fn find_member(&self, restaurant_id: i64, user_id: i64) -> Result<user::Model> {
        user::Entity::find_by_id(user_id)
            .filter(user::Column::RestaurantId.eq(restaurant_id))
            .filter(user::Column::Role.is_in(STAFF_ROLES))
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound(MEMBER_NOT_FOUND.to_string()))
    }

    /// Removed members keep their row but are no longer part of the team.
    async fn find_active_member(&self, restaurant_id: i64, user_id: i64) -> Result<user::Model> {
        let member = self.find_member(restaurant_id, user_id).await?;
        if !member.is_active {
            return Err(AppError::NotFound(MEMBER_NOT_FOUND.to_string()));
        }
        Ok(member)
    }

    pub async fn update_role(
        &self,
        restaurant: &restaurant::Model,
        user_id: i64,
        new_role: StaffRole,
        updated_by: &user::Model,
    ) -> Result<user::Model> {
        let member = self.find_active_member(restaurant.id, user_id).await?;
        let old_role = member.role;
        let new_role = Role::from(new_role);
        if old_role == new_role {
            return Ok(member);
        }

        let mut active: user::ActiveModel = member.into();
        active.role = Set(new_role);
        active.updated_at = Set(self.clock.now());
        let updated = active.update(&self.db).await?;

        tracing::info!(
            user_id = updated.id,
            restaurant_id = restaurant.id,
            old_role = %old_role,
            new_role = %new_role,
            updated_by = updated_by.id,
            "Staff role updated"
        );

        self.notification
            .send_role_update(&updated, old_role, new_role, restaurant)
            .await;

        Ok(updated)
    }

    /// Remove a member through its accepted invitation, or deactivate directly
    /// when the account has no invitation record.
    pub async fn remove_member(
        &self,
        restaurant: &restaurant::Model,
        user_id: i64,
        removed_by: &user::Model,
    ) -> Result<()> {
        let member = self.find_member(restaurant.id, user_id).await?;

        match self
            .invitations
            .find_accepted_for_user(member.id, restaurant.id)
            .await?
        {
            Some(invitation) => {
                self.invitations.remove(&invitation, removed_by).await?;
            }
            None if member.is_active => {
                deactivate_user(&self.db, member.id, self.clock.now()).await?;
                tracing::info!(
                    user_id = member.id,
                    restaurant_id = restaurant.id,
                    removed_by = removed_by.id,
                    "Staff member without invitation deactivated"
                );
            }
            None => return Err(AppError::NotFound(MEMBER_NOT_FOUND.to_string())),
        }

        Ok(())
    }

    pub async fn statistics(&self, restaurant_id: i64) -> Result<StaffStatistics> {
        let members = user::Entity::find()
            .filter(user::Column::RestaurantId.eq(restaurant_id))
            .filter(user::Column::Role.is_in(STAFF_ROLES));

        let total_staff = members.clone().count(&self.db).await?;
        let active_staff = members
            .filter(user::Column::IsActive.eq(true))
            .count(&self.db)
            .await?;

        let mut staff_by_role = BTreeMap::new();
        for role in STAFF_ROLES {
            let count = user::Entity::find()
                .filter(user::Column::RestaurantId.eq(restaurant_id))
                .filter(user::Column::Role.eq(role))
                .filter(user::Column::IsActive.eq(true))
                .count(&self.db)
                .await?;
            staff_by_role.insert(role.as_str().to_string(), count);
        }

        let pending_invitations = self
            .invitations
            .list_pending_for_restaurant(restaurant_id)
            .await?
            .len() as u64;

        Ok(StaffStatistics {
            total_staff,
            active_staff,
            pending_invitations,
            staff_by_role,
        })
    }
}

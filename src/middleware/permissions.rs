//! Role-based authorization extractors
//!
//! Usage in handlers:
//! ```ignore
//! use crate::middleware::permissions::*;
//!
//! async fn list_staff(
//!     AdminContext { admin, restaurant }: AdminContext,
//!     State(state): State<AppState>,
//! ) -> Result<Json<StaffListResponse>> {
//!     // caller is an admin and owns `restaurant`
//! }
//! ```

use std::marker::PhantomData;

use axum::{extract::FromRequestParts, http::request::Parts};
use sea_orm::EntityTrait;

use crate::error::AppError;
use crate::middleware::AuthenticatedUser;
use crate::models::restaurant;
use crate::models::user::{self, Role};
use crate::state::AppState;

pub const NO_RESTAURANT_FOR_ADMIN: &str = "No restaurant found for this admin";

/// Marker for the minimum role a route needs.
pub trait RequiredRole: Send + Sync + 'static {
    const ROLE: Role;
}

macro_rules! define_role_requirements {
    ($($(#[$meta:meta])* $name:ident => $role:expr),* $(,)?) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Copy)]
            pub struct $name;

            impl RequiredRole for $name {
                const ROLE: Role = $role;
            }
        )*
    };
}

define_role_requirements! {
    /// Restaurant owners
    AdminOnly => Role::Admin,
    /// Managers and admins
    ManagerOrAbove => Role::Manager,
    /// Any restaurant team member
    StaffOrAbove => Role::Staff,
}

/// Authenticated user whose role includes `R::ROLE`; 403 otherwise.
#[derive(Debug, Clone)]
pub struct Authorized<R: RequiredRole>(pub user::Model, PhantomData<R>);

impl<R: RequiredRole> Authorized<R> {
    pub fn user(&self) -> &user::Model {
        &self.0
    }

    pub fn into_user(self) -> user::Model {
        self.0
    }
}

impl<S, R> FromRequestParts<S> for Authorized<R>
where
    S: Send + Sync,
    R: RequiredRole,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthenticatedUser(user) = AuthenticatedUser::from_request_parts(parts, state).await?;

        if !user.role.includes(R::ROLE) {
            return Err(AppError::Forbidden(format!(
                "Access denied: {} role required",
                R::ROLE
            )));
        }

        Ok(Authorized(user, PhantomData))
    }
}

/// An admin together with the restaurant they own.
///
/// 403 for non-admins, 404 when the admin has no restaurant.
#[derive(Debug, Clone)]
pub struct AdminContext {
    pub admin: user::Model,
    pub restaurant: restaurant::Model,
}

impl FromRequestParts<AppState> for AdminContext {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let admin = Authorized::<AdminOnly>::from_request_parts(parts, state)
            .await?
            .into_user();

        let restaurant_id = admin
            .restaurant_id
            .ok_or_else(|| AppError::NotFound(NO_RESTAURANT_FOR_ADMIN.to_string()))?;
        let restaurant = restaurant::Entity::find_by_id(restaurant_id)
            .one(&state.db)
            .await?
            .ok_or_else(|| AppError::NotFound(NO_RESTAURANT_FOR_ADMIN.to_string()))?;

        Ok(AdminContext { admin, restaurant })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;
    use chrono::Utc;

    fn user_with(role: Role) -> user::Model {
        let now = Utc::now();
        user::Model {
            id: 3,
            email: "member@example.com".to_string(),
            first_name: "Mia".to_string(),
            last_name: "Member".to_string(),
            phone_number: None,
            role,
            hashed_password: String::new(),
            is_active: true,
            email_verified: true,
            restaurant_id: Some(1),
            last_login_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn parts_for(user: Option<user::Model>) -> Parts {
        let (mut parts, _) = Request::builder().uri("/").body(()).unwrap().into_parts();
        if let Some(user) = user {
            parts.extensions.insert(AuthenticatedUser(user));
        }
        parts
    }

    #[tokio::test]
    async fn test_missing_user_is_unauthorized() {
        let mut parts = parts_for(None);
        let result = Authorized::<StaffOrAbove>::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_role_below_requirement_is_forbidden() {
        let mut parts = parts_for(Some(user_with(Role::Manager)));
        let result = Authorized::<AdminOnly>::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AppError::Forbidden(msg)) if msg.contains("admin")));
    }

    #[tokio::test]
    async fn test_higher_role_is_authorized() {
        let mut parts = parts_for(Some(user_with(Role::Admin)));
        let authorized = Authorized::<ManagerOrAbove>::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert_eq!(authorized.user().id, 3);
    }
}

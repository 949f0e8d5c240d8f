//! Bearer token authentication for protected API routes.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

use crate::error::AppError;
use crate::models::prelude::*;
use crate::services::security::decode_token;
use crate::state::AppState;

/// Authenticated user stored in request extensions
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub user::Model);

impl<S: Send + Sync> FromRequestParts<S> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))
    }
}

/// Caller identity for public routes: `None` when the request carries no
/// usable bearer token.
#[derive(Debug, Clone)]
pub struct MaybeAuthenticatedUser(pub Option<user::Model>);

impl FromRequestParts<AppState> for MaybeAuthenticatedUser {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = extract_bearer_token(&parts.headers) else {
            return Ok(Self(None));
        };
        Ok(Self(validate_token_and_get_user(state, &token).await.ok()))
    }
}

/// Validates the Bearer token and loads the active user into request
/// extensions. Returns 401 when the token is missing or invalid.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let Some(token) = extract_bearer_token(req.headers()) else {
        return unauthorized_response("Missing or invalid Authorization header");
    };

    let user = match validate_token_and_get_user(&state, &token).await {
        Ok(u) => u,
        Err(msg) => {
            tracing::debug!(reason = %msg, path = %req.uri().path(), "Rejected bearer token");
            return unauthorized_response(&msg);
        }
    };

    req.extensions_mut().insert(AuthenticatedUser(user));
    next.run(req).await
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let auth_str = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = auth_str.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then(|| token.to_string())
}

async fn validate_token_and_get_user(
    state: &AppState,
    token: &str,
) -> Result<user::Model, String> {
    let claims = decode_token(token).map_err(|_| "Invalid or expired token".to_string())?;

    let user_id = claims
        .user_id()
        .ok_or_else(|| "Invalid token subject".to_string())?;

    let found_user = User::find_by_id(user_id)
        .filter(user::Column::IsActive.eq(true))
        .one(&state.db)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load user for token: {}", e);
            "Unable to validate token".to_string()
        })?;

    found_user.ok_or_else(|| "User not found or inactive".to_string())
}

fn unauthorized_response(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(serde_json::json!({
            "detail": message
        })),
    )
        .into_response()
}

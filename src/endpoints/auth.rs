use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};

use crate::endpoints::extractors::ValidatedJson;
use crate::error::Result;
use crate::middleware::{AuthenticatedUser, MaybeAuthenticatedUser};
use crate::models::user;
use crate::schemas::{
    AuthStatusResponse, LoginRequest, MeResponse, MessageResponse, RestaurantSummary,
    TokenResponse, UserInfo,
};
use crate::services::auth::{self as auth_service, Permissions};
use crate::state::AppState;

/// Public login and status routes
pub fn login_routes(state: AppState) -> Router {
    Router::new()
        .route("/login", post(login))
        .route("/status", get(status))
        .with_state(state)
}

/// Routes that need a valid access token
pub fn session_routes(state: AppState) -> Router {
    Router::new()
        .route("/me", get(me))
        .route("/logout", post(logout))
        .route("/refresh", post(refresh))
        .with_state(state)
}

// ============================================================================
// Helpers
// ============================================================================

async fn token_response(
    state: &AppState,
    user: &user::Model,
    message: &str,
) -> Result<TokenResponse> {
    let issued = auth_service::issue_token(user)?;
    let restaurant = auth_service::restaurant_for_user(&state.db, user).await?;

    Ok(TokenResponse {
        message: message.to_string(),
        token: issued.token,
        token_type: "Bearer",
        expires_in: issued.expires_in,
        user: UserInfo::from(user),
        restaurant: restaurant.as_ref().map(RestaurantSummary::from),
        permissions: Permissions::for_role(user.role),
    })
}

// ============================================================================
// Endpoints
// ============================================================================

/// Exchange email and password for an access token
async fn login(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> Result<Json<TokenResponse>> {
    let found_user =
        auth_service::authenticate(&state.db, &request.email, &request.password).await?;
    let found_user = auth_service::record_login(&state.db, &found_user, state.clock.now()).await?;

    tracing::info!(user_id = found_user.id, role = %found_user.role, "User logged in");
    Ok(Json(
        token_response(&state, &found_user, "Login successful").await?,
    ))
}

/// Whether the caller holds a valid token; never rejects.
async fn status(
    State(state): State<AppState>,
    MaybeAuthenticatedUser(current): MaybeAuthenticatedUser,
) -> Json<AuthStatusResponse> {
    Json(AuthStatusResponse::new(current.as_ref(), state.clock.now()))
}

async fn me(
    State(state): State<AppState>,
    AuthenticatedUser(current): AuthenticatedUser,
) -> Result<Json<MeResponse>> {
    let restaurant = auth_service::restaurant_for_user(&state.db, &current).await?;
    Ok(Json(MeResponse {
        user: UserInfo::from(&current),
        restaurant: restaurant.as_ref().map(RestaurantSummary::from),
        permissions: Permissions::for_role(current.role),
    }))
}

/// Tokens are stateless; the client discards its copy.
async fn logout(AuthenticatedUser(current): AuthenticatedUser) -> Json<MessageResponse> {
    tracing::info!(user_id = current.id, "User logged out");
    Json(MessageResponse::new("Logout successful"))
}

/// Re-check the account and issue a fresh access token
async fn refresh(
    State(state): State<AppState>,
    AuthenticatedUser(current): AuthenticatedUser,
) -> Result<Json<TokenResponse>> {
    auth_service::ensure_can_sign_in(&current)?;
    Ok(Json(
        token_response(&state, &current, "Token refreshed successfully").await?,
    ))
}

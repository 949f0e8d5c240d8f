use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use sea_orm::EntityTrait;

use crate::endpoints::extractors::ValidatedJson;
use crate::error::Result;
use crate::models::prelude::*;
use crate::schemas::{InvitationPreview, OnboardingResponse, StaffOnboardingRequest, UserInfo};
use crate::services::invitation::{InvitationError, InvitationService};
use crate::state::AppState;

/// Public routes used by invitees who do not have an account yet
pub fn onboarding_routes(state: AppState) -> Router {
    Router::new()
        .route("/invitations/{token}", get(preview_invitation))
        .route("/onboard", post(complete_onboarding))
        .with_state(state)
}

/// Details shown on the onboarding form for a valid invitation token
async fn preview_invitation(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<InvitationPreview>> {
    let invitation = InvitationService::from_state(&state)
        .find_valid_by_token(&token)
        .await?
        .ok_or(InvitationError::InvalidToken)?;

    let restaurant = Restaurant::find_by_id(invitation.restaurant_id)
        .one(&state.db)
        .await?
        .ok_or(InvitationError::InvalidToken)?;

    Ok(Json(InvitationPreview::new(&invitation, &restaurant)))
}

/// Accept an invitation by choosing a password
async fn complete_onboarding(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<StaffOnboardingRequest>,
) -> Result<Json<OnboardingResponse>> {
    let phone_number = request
        .phone_number
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty());

    let accepted = InvitationService::from_state(&state)
        .accept(request.token.trim(), &request.password, phone_number)
        .await?;

    let restaurant = Restaurant::find_by_id(accepted.invitation.restaurant_id)
        .one(&state.db)
        .await?;

    Ok(Json(OnboardingResponse {
        message: "Welcome aboard! Your account has been created. You can now sign in.".to_string(),
        user: UserInfo::from(&accepted.user),
        restaurant_id: accepted.invitation.restaurant_id,
        restaurant_name: restaurant.map(|r| r.name),
    }))
}

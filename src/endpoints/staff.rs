use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, patch, post},
    Json, Router,
};

use crate::endpoints::extractors::ValidatedJson;
use crate::error::{AppError, Result};
use crate::middleware::AdminContext;
use crate::models::staff_invitation;
use crate::schemas::{
    InvitationCreatedResponse, InvitationListResponse, InvitationResponse, MessageResponse,
    StaffInvitationRequest, StaffListResponse, StaffMemberResponse, UpdateRoleRequest, UserInfo,
};
use crate::services::invitation::InvitationService;
use crate::services::staff::{StaffService, StaffStatistics};
use crate::state::AppState;

/// Staff management for the admin's own restaurant
pub fn staff_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(list_staff))
        .route("/statistics", get(staff_statistics))
        .route("/invite", post(invite_staff))
        .route("/invitations", get(list_invitations))
        .route("/invitations/{id}/cancel", post(cancel_invitation))
        .route("/invitations/{id}/resend", post(resend_invitation))
        .route("/{user_id}/role", patch(update_staff_role))
        .route("/{user_id}", delete(remove_staff_member))
        .with_state(state)
}

async fn find_invitation(
    invitations: &InvitationService,
    id: i64,
    restaurant_id: i64,
) -> Result<staff_invitation::Model> {
    invitations
        .find_for_restaurant(id, restaurant_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Invitation not found".to_string()))
}

// ============================================================================
// Invitations
// ============================================================================

async fn invite_staff(
    State(state): State<AppState>,
    AdminContext { admin, restaurant }: AdminContext,
    ValidatedJson(request): ValidatedJson<StaffInvitationRequest>,
) -> Result<(StatusCode, Json<InvitationCreatedResponse>)> {
    let invitations = InvitationService::from_state(&state);
    let invitation = invitations
        .create(request.into(), &restaurant, &admin)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(InvitationCreatedResponse {
            message: format!("Invitation sent to {}", invitation.email),
            invitation: InvitationResponse::at(&invitation, invitations.now()),
        }),
    ))
}

async fn list_invitations(
    State(state): State<AppState>,
    AdminContext { restaurant, .. }: AdminContext,
) -> Result<Json<InvitationListResponse>> {
    let invitations = InvitationService::from_state(&state);
    let rows = invitations.list_for_restaurant(restaurant.id).await?;
    let stats = invitations.stats(restaurant.id).await?;
    let now = invitations.now();

    Ok(Json(InvitationListResponse {
        invitations: rows
            .iter()
            .map(|inv| InvitationResponse::at(inv, now))
            .collect(),
        stats,
    }))
}

async fn cancel_invitation(
    State(state): State<AppState>,
    AdminContext { admin, restaurant }: AdminContext,
    Path(id): Path<i64>,
) -> Result<Json<InvitationResponse>> {
    let invitations = InvitationService::from_state(&state);
    let invitation = find_invitation(&invitations, id, restaurant.id).await?;
    let cancelled = invitations.cancel(&invitation, &admin).await?;

    Ok(Json(InvitationResponse::at(&cancelled, invitations.now())))
}

async fn resend_invitation(
    State(state): State<AppState>,
    AdminContext { restaurant, .. }: AdminContext,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>> {
    let invitations = InvitationService::from_state(&state);
    let invitation = find_invitation(&invitations, id, restaurant.id).await?;
    let email_sent = invitations.resend(&invitation).await?;

    let message = if email_sent {
        format!("Invitation resent to {}", invitation.email)
    } else {
        format!("Invitation to {} could not be delivered", invitation.email)
    };
    Ok(Json(serde_json::json!({
        "message": message,
        "emailSent": email_sent,
    })))
}

// ============================================================================
// Members
// ============================================================================

async fn list_staff(
    State(state): State<AppState>,
    AdminContext { restaurant, .. }: AdminContext,
) -> Result<Json<StaffListResponse>> {
    let members = StaffService::from_state(&state)
        .list_staff(restaurant.id)
        .await?;
    let staff: Vec<StaffMemberResponse> = members.iter().map(StaffMemberResponse::from).collect();

    Ok(Json(StaffListResponse {
        total: staff.len(),
        staff,
    }))
}

async fn staff_statistics(
    State(state): State<AppState>,
    AdminContext { restaurant, .. }: AdminContext,
) -> Result<Json<StaffStatistics>> {
    Ok(Json(
        StaffService::from_state(&state)
            .statistics(restaurant.id)
            .await?,
    ))
}

async fn update_staff_role(
    State(state): State<AppState>,
    AdminContext { admin, restaurant }: AdminContext,
    Path(user_id): Path<i64>,
    ValidatedJson(request): ValidatedJson<UpdateRoleRequest>,
) -> Result<Json<serde_json::Value>> {
    let updated = StaffService::from_state(&state)
        .update_role(&restaurant, user_id, request.role, &admin)
        .await?;

    Ok(Json(serde_json::json!({
        "message": "Staff role updated successfully",
        "user": UserInfo::from(&updated),
    })))
}

async fn remove_staff_member(
    State(state): State<AppState>,
    AdminContext { admin, restaurant }: AdminContext,
    Path(user_id): Path<i64>,
) -> Result<Json<MessageResponse>> {
    StaffService::from_state(&state)
        .remove_member(&restaurant, user_id, &admin)
        .await?;

    Ok(Json(MessageResponse::new("Staff member removed successfully")))
}

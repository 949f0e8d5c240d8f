use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use crate::endpoints::extractors::ValidatedJson;
use crate::error::Result;
use crate::middleware::AuthenticatedUser;
use crate::schemas::{
    BusinessHoursListResponse, BusinessHoursRequest, BusinessHoursResponse, ProfileResponse,
    RestaurantStatistics, SetupStatusResponse, UpdateProfileRequest,
};
use crate::services::restaurant::{setup_status, RestaurantService};
use crate::state::AppState;

/// Profile routes for the admin that owns the restaurant
pub fn restaurant_routes(state: AppState) -> Router {
    Router::new()
        .route("/{id}/profile", get(get_profile).patch(update_profile))
        .route(
            "/{id}/business-hours",
            get(get_business_hours).put(replace_business_hours),
        )
        .route("/{id}/setup-status", get(get_setup_status))
        .route("/{id}/statistics", get(get_statistics))
        .with_state(state)
}

// ============================================================================
// Profile
// ============================================================================

async fn get_profile(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<Json<ProfileResponse>> {
    let service = RestaurantService::from_state(&state);
    let restaurant = service.find_for_admin(&user, id).await?;
    let hours = service.business_hours(restaurant.id).await?;

    Ok(Json(ProfileResponse::new(&restaurant, &hours, state.clock.now())))
}

async fn update_profile(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<i64>,
    ValidatedJson(request): ValidatedJson<UpdateProfileRequest>,
) -> Result<Json<ProfileResponse>> {
    let service = RestaurantService::from_state(&state);
    let restaurant = service.find_for_admin(&user, id).await?;
    let updated = service.update_profile(restaurant, request).await?;
    let hours = service.business_hours(updated.id).await?;

    Ok(Json(ProfileResponse::new(&updated, &hours, state.clock.now())))
}

// ============================================================================
// Business hours
// ============================================================================

async fn get_business_hours(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<Json<BusinessHoursListResponse>> {
    let service = RestaurantService::from_state(&state);
    let restaurant = service.find_for_admin(&user, id).await?;
    let hours = service.business_hours(restaurant.id).await?;

    Ok(Json(BusinessHoursListResponse {
        restaurant_id: restaurant.id,
        hours: BusinessHoursResponse::list(&hours, state.clock.now()),
    }))
}

async fn replace_business_hours(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<i64>,
    ValidatedJson(request): ValidatedJson<BusinessHoursRequest>,
) -> Result<Json<BusinessHoursListResponse>> {
    let service = RestaurantService::from_state(&state);
    let restaurant = service.find_for_admin(&user, id).await?;
    let hours = service
        .replace_business_hours(restaurant.id, request.hours)
        .await?;

    Ok(Json(BusinessHoursListResponse {
        restaurant_id: restaurant.id,
        hours: BusinessHoursResponse::list(&hours, state.clock.now()),
    }))
}

// ============================================================================
// Progress
// ============================================================================

async fn get_setup_status(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<Json<SetupStatusResponse>> {
    let restaurant = RestaurantService::from_state(&state)
        .find_for_admin(&user, id)
        .await?;
    Ok(Json(setup_status(&restaurant)))
}

async fn get_statistics(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<Json<RestaurantStatistics>> {
    let service = RestaurantService::from_state(&state);
    let restaurant = service.find_for_admin(&user, id).await?;
    Ok(Json(service.statistics(&restaurant).await?))
}

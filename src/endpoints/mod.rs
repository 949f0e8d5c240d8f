pub mod auth;
pub mod extractors;
pub mod onboarding;
pub mod restaurants;
pub mod signup;
pub mod staff;
pub mod verification;

use axum::{middleware as axum_middleware, routing::get, Json, Router};

use crate::config::CONFIG;
use crate::middleware::require_auth;
use crate::state::AppState;

/// Create the main API router
pub fn create_router(state: AppState) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/api/health", get(health_check))
        .route("/api/system/version", get(get_version))
        .nest("/api/admins/signup", signup::signup_routes(state.clone()))
        .nest("/api/auth", auth::login_routes(state.clone()))
        .nest("/api/auth/verify", verification::verification_routes(state.clone()))
        .nest("/api/staff", onboarding::onboarding_routes(state.clone()));

    // Protected routes (bearer token required)
    let protected_routes = Router::new()
        .nest("/api/auth", auth::session_routes(state.clone()))
        .nest("/api/admin/staff", staff::staff_routes(state.clone()))
        .nest("/api/restaurants", restaurants::restaurant_routes(state.clone()))
        .route_layer(axum_middleware::from_fn_with_state(state, require_auth));

    public_routes.merge(protected_routes)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

/// Version info endpoint
async fn get_version() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "service": "snapserve",
        "version": CONFIG.version,
        "commit_hash": CONFIG.commit_hash,
        "build_time": CONFIG.build_time,
    }))
}

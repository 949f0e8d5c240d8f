use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};

use crate::endpoints::extractors::ValidatedJson;
use crate::error::Result;
use crate::schemas::{AdminSignupRequest, AdminSignupResponse, SignupRequirements};
use crate::services::signup::SignupService;
use crate::state::AppState;

/// Create admin signup routes
pub fn signup_routes(state: AppState) -> Router {
    Router::new()
        .route("/", post(signup))
        .route("/health", get(signup_health))
        .route("/requirements", get(signup_requirements))
        .with_state(state)
}

/// Register a restaurant and its admin; the account stays inactive until the
/// email is verified.
async fn signup(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<AdminSignupRequest>,
) -> Result<(StatusCode, Json<AdminSignupResponse>)> {
    let outcome = SignupService::from_state(&state).signup(request.into()).await?;

    let message = if outcome.verification_email_sent {
        "Account created. Please check your email to verify your account."
    } else {
        "Account created, but the verification email could not be sent. Please request a new one."
    };

    Ok((
        StatusCode::ACCEPTED,
        Json(AdminSignupResponse {
            message: message.to_string(),
            user_id: outcome.user.id,
            restaurant_id: outcome.restaurant.id,
            email: outcome.user.email,
            restaurant_name: outcome.restaurant.name,
            verification_required: true,
            verification_email_sent: outcome.verification_email_sent,
        }),
    ))
}

async fn signup_health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "admin-signup",
        "notificationChannel": state.notification.channel_type().as_str(),
    }))
}

async fn signup_requirements() -> Json<SignupRequirements> {
    Json(SignupRequirements::describe())
}

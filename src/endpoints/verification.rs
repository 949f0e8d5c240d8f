use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};

use crate::endpoints::extractors::ValidatedJson;
use crate::error::{AppError, Result};
use crate::schemas::{
    EmailQuery, MessageResponse, ResendVerificationRequest, VerifyEmailQuery, VerifyEmailResponse,
};
use crate::services::signup::{ResendOutcome, SignupService, VerificationStatus};
use crate::state::AppState;

/// Create email verification routes
pub fn verification_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(verify_email))
        .route("/resend", post(resend_verification))
        .route("/status", get(verification_status))
        .with_state(state)
}

async fn verify_email(
    State(state): State<AppState>,
    Query(query): Query<VerifyEmailQuery>,
) -> Result<Json<VerifyEmailResponse>> {
    let token = query.token.unwrap_or_default();
    let account = SignupService::from_state(&state).verify(token.trim()).await?;

    Ok(Json(VerifyEmailResponse {
        message: "Email verified successfully. Your account is now active.".to_string(),
        user_id: account.user.id,
        email: account.user.email,
        restaurant_id: account.restaurant.as_ref().map(|r| r.id),
        restaurant_name: account.restaurant.map(|r| r.name),
    }))
}

/// Unknown addresses get the same answer as known ones.
async fn resend_verification(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<ResendVerificationRequest>,
) -> Result<Json<MessageResponse>> {
    match SignupService::from_state(&state).resend(&request.email).await? {
        ResendOutcome::Sent | ResendOutcome::UnknownEmail => Ok(Json(MessageResponse::new(
            "If an account with this email exists, a verification email has been sent.",
        ))),
    }
}

async fn verification_status(
    State(state): State<AppState>,
    Query(query): Query<EmailQuery>,
) -> Result<Json<VerificationStatus>> {
    let email = query
        .email
        .filter(|e| !e.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("Email parameter is required".to_string()))?;

    Ok(Json(SignupService::from_state(&state).status(&email).await?))
}

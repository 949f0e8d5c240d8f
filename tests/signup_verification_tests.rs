//! Admin signup and email verification integration tests
//!
//! Covers:
//! - `POST /api/admins/signup` (202) and its duplicate/validation failures
//! - `GET /api/auth/verify`, `POST /api/auth/verify/resend`, `GET /api/auth/verify/status`
//! - signup → verify → login, including the verification TTL

use axum::http::StatusCode;
use chrono::Duration;
use sea_orm::EntityTrait;
use serde_json::json;

mod common;
use common::{get, post, test_context, token_from_body, failing_mail_context, TestContext};

use snapserve::models::restaurant;
use snapserve::services::notification::NotificationKind;

const OWNER_EMAIL: &str = "olive@osteria.test";
const OWNER_PASSWORD: &str = "Ol1ve!Oil";

fn signup_body() -> serde_json::Value {
    json!({
        "email": OWNER_EMAIL,
        "password": OWNER_PASSWORD,
        "firstName": "Olive",
        "lastName": "Owner",
        "restaurantName": "Osteria Olive",
        "restaurantEmail": "Hello@Osteria.test"
    })
}

async fn signup(ctx: &TestContext) -> serde_json::Value {
    let (status, body) = post(ctx.router(), "/api/admins/signup", None, signup_body()).await;
    assert_eq!(status, StatusCode::ACCEPTED, "{}", body);
    body
}

fn verification_token(ctx: &TestContext) -> String {
    let mails = ctx.outbox.of_kind(NotificationKind::AdminVerification);
    let last = mails.last().expect("verification email");
    assert!(last.body.contains("https://app.snapserve.test/verify-email?token="));
    token_from_body(&last.body)
}

async fn login(ctx: &TestContext) -> (StatusCode, serde_json::Value) {
    post(
        ctx.router(),
        "/api/auth/login",
        None,
        json!({ "email": OWNER_EMAIL, "password": OWNER_PASSWORD }),
    )
    .await
}

#[tokio::test]
async fn test_signup_creates_inactive_account() {
    let ctx = test_context().await;
    let body = signup(&ctx).await;

    assert_eq!(body["verificationRequired"], true);
    assert_eq!(body["verificationEmailSent"], true);
    assert_eq!(body["restaurantName"], "Osteria Olive");
    assert_eq!(body["email"], OWNER_EMAIL);

    let restaurant = restaurant::Entity::find_by_id(body["restaurantId"].as_i64().unwrap())
        .one(ctx.db())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(restaurant.slug, "osteria-olive");
    assert_eq!(restaurant.email.as_deref(), Some("hello@osteria.test"));
    assert!(!restaurant.is_active);

    let (status, body) = login(&ctx).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["detail"], "Please verify your email address before logging in");

    let (status, status_body) = get(
        ctx.router(),
        &format!("/api/auth/verify/status?email={}", OWNER_EMAIL),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(status_body["exists"], true);
    assert_eq!(status_body["verified"], false);
    assert_eq!(status_body["active"], false);
    assert_eq!(status_body["user_type"], "admin");
}

#[tokio::test]
async fn test_signup_rejects_taken_email() {
    let ctx = test_context().await;
    signup(&ctx).await;

    let (status, body) = post(ctx.router(), "/api/admins/signup", None, signup_body()).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["detail"], "An account with this email already exists");
}

#[tokio::test]
async fn test_slug_collision_gets_suffix() {
    let ctx = test_context().await;
    signup(&ctx).await;

    let mut second = signup_body();
    second["email"] = json!("other@osteria.test");
    let (status, body) = post(ctx.router(), "/api/admins/signup", None, second).await;
    assert_eq!(status, StatusCode::ACCEPTED);

    let restaurant = restaurant::Entity::find_by_id(body["restaurantId"].as_i64().unwrap())
        .one(ctx.db())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(restaurant.slug, "osteria-olive-2");
}

#[tokio::test]
async fn test_signup_validation() {
    let ctx = test_context().await;
    let (status, body) = post(
        ctx.router(),
        "/api/admins/signup",
        None,
        json!({
            "email": "bad",
            "password": "password",
            "firstName": "",
            "lastName": "Owner",
            "restaurantName": "X"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"]["email"].is_array());
    assert!(body["errors"]["password"].is_array());
    assert!(body["errors"]["first_name"].is_array());
}

#[tokio::test]
async fn test_verify_then_login() {
    let ctx = test_context().await;
    signup(&ctx).await;
    let token = verification_token(&ctx);

    let (status, body) = get(
        ctx.router(),
        &format!("/api/auth/verify?token={}", token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["restaurantName"], "Osteria Olive");
    assert_eq!(ctx.outbox.of_kind(NotificationKind::AdminWelcome).len(), 1);

    let (status, body) = get(
        ctx.router(),
        &format!("/api/auth/verify?token={}", token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "This verification link has already been used");

    let (status, body) = login(&ctx).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["user"]["role"], "admin");
    assert_eq!(body["restaurant"]["isActive"], true);
    assert_eq!(body["permissions"]["canManageStaff"], true);
}

#[tokio::test]
async fn test_verify_rejects_missing_and_unknown_tokens() {
    let ctx = test_context().await;

    let (status, body) = get(ctx.router(), "/api/auth/verify", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "No verification token provided");

    let (status, body) = get(ctx.router(), "/api/auth/verify?token=deadbeef", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Invalid verification token");
}

#[tokio::test]
async fn test_expired_verification_link_then_resend() {
    let ctx = test_context().await;
    signup(&ctx).await;
    let stale = verification_token(&ctx);

    ctx.clock.advance(Duration::hours(25));

    let (status, body) = get(
        ctx.router(),
        &format!("/api/auth/verify?token={}", stale),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().contains("expired"));

    let (status, _) = post(
        ctx.router(),
        "/api/auth/verify/resend",
        None,
        json!({ "email": OWNER_EMAIL }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let fresh = verification_token(&ctx);
    assert_ne!(fresh, stale);

    let (status, _) = get(ctx.router(), &format!("/api/auth/verify?token={}", fresh), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = post(
        ctx.router(),
        "/api/auth/verify/resend",
        None,
        json!({ "email": OWNER_EMAIL }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "This email address is already verified");
}

#[tokio::test]
async fn test_resend_invalidates_previous_link() {
    let ctx = test_context().await;
    signup(&ctx).await;
    let first = verification_token(&ctx);

    post(ctx.router(), "/api/auth/verify/resend", None, json!({ "email": OWNER_EMAIL })).await;

    let (status, _) = get(ctx.router(), &format!("/api/auth/verify?token={}", first), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_resend_for_unknown_email_looks_successful() {
    let ctx = test_context().await;
    let (status, body) = post(
        ctx.router(),
        "/api/auth/verify/resend",
        None,
        json!({ "email": "nobody@example.com" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["message"].as_str().unwrap().starts_with("If an account"));
    assert!(ctx.outbox.messages().is_empty());
}

#[tokio::test]
async fn test_status_requires_email() {
    let ctx = test_context().await;
    let (status, _) = get(ctx.router(), "/api/auth/verify/status", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = get(
        ctx.router(),
        "/api/auth/verify/status?email=ghost@example.com",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["exists"], false);
    assert!(body.get("user_id").is_none());
}

#[tokio::test]
async fn test_signup_survives_mail_failure() {
    let ctx = failing_mail_context().await;
    let (status, body) = post(ctx.router(), "/api/admins/signup", None, signup_body()).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["verificationEmailSent"], false);
}

#[tokio::test]
async fn test_signup_info_endpoints() {
    let ctx = test_context().await;

    let (status, body) = get(ctx.router(), "/api/admins/signup/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = get(ctx.router(), "/api/admins/signup/requirements", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["fields"].as_array().unwrap().len() >= 6);
    assert!(body["passwordPolicy"].as_str().unwrap().contains("@$!%*?&"));
}

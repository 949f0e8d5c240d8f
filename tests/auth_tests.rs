//! Authentication endpoint tests
//!
//! Covers login, the bearer middleware and the session routes under `/api/auth`.

use axum::http::StatusCode;
use jsonwebtoken::{encode, EncodingKey, Header};
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use serde_json::json;

mod common;
use common::*;

use snapserve::config::CONFIG;
use snapserve::models::user::{self, Role};
use snapserve::services::{Claims, Clock};

async fn login(ctx: &TestContext, email: &str, password: &str) -> (StatusCode, serde_json::Value) {
    post(
        ctx.router(),
        "/api/auth/login",
        None,
        json!({ "email": email, "password": password }),
    )
    .await
}

#[tokio::test]
async fn test_login_success() {
    let ctx = test_context().await;
    let (admin, restaurant) = seed_admin(ctx.db()).await;

    let (status, body) = login(&ctx, "Owner@Trattoria.TEST", ADMIN_PASSWORD).await;
    assert_eq!(status, StatusCode::OK, "{}", body);

    assert_eq!(body["message"], "Login successful");
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["expires_in"], CONFIG.auth.access_token_ttl_secs);
    assert!(!body["token"].as_str().unwrap().is_empty());
    assert_eq!(body["user"]["id"], admin.id);
    assert_eq!(body["user"]["role"], "admin");
    assert_eq!(body["user"]["fullName"], "Test User");
    assert!(body["user"].get("hashedPassword").is_none());
    assert_eq!(body["restaurant"]["id"], restaurant.id);
    assert_eq!(body["permissions"]["canManageStaff"], true);
    assert_eq!(body["permissions"]["canManagePayments"], true);

    let stored = user::Entity::find_by_id(admin.id)
        .one(ctx.db())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.last_login_at, Some(ctx.clock.now()));
}

#[tokio::test]
async fn test_login_staff_permissions() {
    let ctx = test_context().await;
    let (_, restaurant) = seed_admin(ctx.db()).await;
    create_user(
        ctx.db(),
        "cook@trattoria.test",
        STAFF_PASSWORD,
        Role::Staff,
        Some(restaurant.id),
    )
    .await;

    let (status, body) = login(&ctx, "cook@trattoria.test", STAFF_PASSWORD).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["permissions"]["canManageOrders"], true);
    assert_eq!(body["permissions"]["canManageStaff"], false);
    assert_eq!(body["permissions"]["canManageMenu"], false);
}

#[tokio::test]
async fn test_login_rejects_bad_credentials() {
    let ctx = test_context().await;
    seed_admin(ctx.db()).await;

    let (status, wrong_password) = login(&ctx, ADMIN_EMAIL, "Wr0ng!Pass").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, unknown) = login(&ctx, "ghost@trattoria.test", ADMIN_PASSWORD).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Same message either way.
    assert_eq!(wrong_password["detail"], "Email or password is incorrect");
    assert_eq!(unknown["detail"], wrong_password["detail"]);
}

#[tokio::test]
async fn test_login_rejects_customers_and_inactive_accounts() {
    let ctx = test_context().await;
    create_user(ctx.db(), "diner@example.com", STAFF_PASSWORD, Role::Customer, None).await;

    let (status, body) = login(&ctx, "diner@example.com", STAFF_PASSWORD).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["detail"], "Insufficient privileges");

    let (admin, _) = seed_admin(ctx.db()).await;
    let mut active: user::ActiveModel = admin.into();
    active.is_active = Set(false);
    active.update(ctx.db()).await.unwrap();

    let (status, body) = login(&ctx, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(
        body["detail"],
        "Account has been deactivated. Please contact support."
    );
}

#[tokio::test]
async fn test_login_validation() {
    let ctx = test_context().await;
    let (status, body) = post(
        ctx.router(),
        "/api/auth/login",
        None,
        json!({ "email": "not-an-email", "password": "" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"]["email"].is_array());

    let (status, _) = post(ctx.router(), "/api/auth/login", None, json!({ "email": 5 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_me_returns_current_user() {
    let ctx = test_context().await;
    let (admin, restaurant) = seed_admin(ctx.db()).await;
    let auth = bearer(&admin);

    let (status, body) = get(ctx.router(), "/api/auth/me", Some(&auth)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["email"], ADMIN_EMAIL);
    assert_eq!(body["restaurant"]["slug"], restaurant.slug);
    assert_eq!(body["permissions"]["canManageRestaurant"], true);
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let ctx = test_context().await;

    let (status, body) = get(ctx.router(), "/api/auth/me", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["detail"].is_string());

    let (status, _) = get(ctx.router(), "/api/auth/me", Some("Bearer not.a.jwt")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = get(ctx.router(), "/api/auth/me", Some("Token abc")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_token_for_deactivated_user_is_rejected() {
    let ctx = test_context().await;
    let (admin, _) = seed_admin(ctx.db()).await;
    let auth = bearer(&admin);

    let mut active: user::ActiveModel = admin.into();
    active.is_active = Set(false);
    active.update(ctx.db()).await.unwrap();

    let (status, body) = get(ctx.router(), "/api/auth/me", Some(&auth)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["detail"], "User not found or inactive");
}

#[tokio::test]
async fn test_token_from_another_issuer_is_rejected() {
    let ctx = test_context().await;
    let (admin, _) = seed_admin(ctx.db()).await;

    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: admin.id.to_string(),
        iss: "someone-else".to_string(),
        email: Some(admin.email.clone()),
        role: Some("admin".to_string()),
        exp: now + 600,
        iat: now,
        jti: None,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(CONFIG.auth.jwt_secret.as_bytes()),
    )
    .unwrap();

    let (status, body) = get(
        ctx.router(),
        "/api/auth/me",
        Some(&format!("Bearer {}", token)),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["detail"], "Invalid or expired token");
}

#[tokio::test]
async fn test_status_for_anonymous_caller() {
    let ctx = test_context().await;

    let (status, body) = get(ctx.router(), "/api/auth/status", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["authenticated"], false);
    assert!(body["user_id"].is_null());
    assert!(body["email"].is_null());
    assert_eq!(body["roles"], json!([]));
    assert!(body["timestamp"].is_string());

    // A bad token is reported, not rejected
    let (status, body) = get(ctx.router(), "/api/auth/status", Some("Bearer garbage")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["authenticated"], false);
}

#[tokio::test]
async fn test_status_for_signed_in_admin() {
    let ctx = test_context().await;
    let (admin, _) = seed_admin(ctx.db()).await;

    let (status, body) = get(ctx.router(), "/api/auth/status", Some(&bearer(&admin))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["authenticated"], true);
    assert_eq!(body["user_id"], admin.id);
    assert_eq!(body["email"], admin.email);
    assert_eq!(body["roles"], json!(["user", "staff", "manager", "admin"]));
    assert_eq!(
        body["timestamp"]
            .as_str()
            .unwrap()
            .parse::<chrono::DateTime<chrono::Utc>>()
            .unwrap(),
        ctx.clock.now()
    );
}

#[tokio::test]
async fn test_logout_and_refresh() {
    let ctx = test_context().await;
    let (admin, _) = seed_admin(ctx.db()).await;
    let auth = bearer(&admin);

    let (status, body) = post(ctx.router(), "/api/auth/logout", Some(&auth), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Logout successful");

    let (status, body) = post(ctx.router(), "/api/auth/refresh", Some(&auth), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Token refreshed successfully");
    let fresh = body["token"].as_str().unwrap().to_string();

    let (status, _) = get(
        ctx.router(),
        "/api/auth/me",
        Some(&format!("Bearer {}", fresh)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_refresh_rejects_customer_token() {
    let ctx = test_context().await;
    let customer =
        create_user(ctx.db(), "diner@example.com", STAFF_PASSWORD, Role::Customer, None).await;

    let (status, body) = post(
        ctx.router(),
        "/api/auth/refresh",
        Some(&bearer(&customer)),
        json!({}),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["detail"], "Insufficient privileges");
}

//! Test helpers shared by the integration tests.
//!
//! Every test builds its own in-memory SQLite database, a manually driven
//! clock and a recording notification provider, so tests never touch the
//! network or depend on wall-clock time.

#![allow(dead_code)]

use std::sync::{Arc, Once};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use parking_lot::Mutex;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use tower::util::ServiceExt;

use snapserve::models::{restaurant, user, user::Role};
use snapserve::services::notification::{
    ChannelType, NotificationKind, NotificationMessage, NotificationProvider, SendResult,
};
use snapserve::services::{ManualClock, NotificationService};
use snapserve::state::AppState;

pub const ADMIN_EMAIL: &str = "owner@trattoria.test";
pub const ADMIN_PASSWORD: &str = "Adm1n!Pass";
pub const STAFF_PASSWORD: &str = "Staff1!Pass";

static INIT: Once = Once::new();

/// Must run before anything reads `CONFIG`.
pub fn init_test_env() {
    INIT.call_once(|| {
        std::env::set_var("SNAPSERVE_BCRYPT_COST", "4");
        std::env::set_var("SNAPSERVE_JWT_SECRET", "integration-test-secret");
        std::env::set_var("SNAPSERVE_FRONTEND_URL", "https://app.snapserve.test/");
    });
}

/// Create an in-memory SQLite database with every migration applied
pub async fn create_test_db() -> DatabaseConnection {
    init_test_env();
    snapserve::db::connect_with_url("sqlite::memory:")
        .await
        .expect("Failed to create test database")
}

// ============================================================================
// Notification providers
// ============================================================================

/// Keeps every message instead of sending it.
#[derive(Clone, Default)]
pub struct RecordingProvider {
    messages: Arc<Mutex<Vec<NotificationMessage>>>,
}

impl RecordingProvider {
    pub fn messages(&self) -> Vec<NotificationMessage> {
        self.messages.lock().clone()
    }

    pub fn of_kind(&self, kind: NotificationKind) -> Vec<NotificationMessage> {
        self.messages()
            .into_iter()
            .filter(|m| m.kind == kind)
            .collect()
    }

    pub fn clear(&self) {
        self.messages.lock().clear();
    }
}

#[async_trait]
impl NotificationProvider for RecordingProvider {
    fn channel_type(&self) -> ChannelType {
        ChannelType::Log
    }

    async fn send(&self, message: &NotificationMessage) -> SendResult {
        self.messages.lock().push(message.clone());
        SendResult::ok()
    }
}

/// Fails every delivery, like an unreachable SMTP relay.
pub struct FailingProvider;

#[async_trait]
impl NotificationProvider for FailingProvider {
    fn channel_type(&self) -> ChannelType {
        ChannelType::Email
    }

    async fn send(&self, _message: &NotificationMessage) -> SendResult {
        SendResult::failed("connection refused")
    }
}

// ============================================================================
// Application state
// ============================================================================

pub struct TestContext {
    pub state: AppState,
    pub clock: Arc<ManualClock>,
    pub outbox: RecordingProvider,
}

impl TestContext {
    pub fn db(&self) -> &DatabaseConnection {
        &self.state.db
    }

    pub fn router(&self) -> Router {
        snapserve::endpoints::create_router(self.state.clone())
    }
}

pub async fn test_context() -> TestContext {
    let outbox = RecordingProvider::default();
    let db = create_test_db().await;
    let clock = Arc::new(ManualClock::starting_now());
    let state = AppState::with_clock(
        db,
        NotificationService::new(Arc::new(outbox.clone())),
        clock.clone(),
    );
    TestContext {
        state,
        clock,
        outbox,
    }
}

/// Same as [`test_context`] but every email delivery fails.
pub async fn failing_mail_context() -> TestContext {
    let mut ctx = test_context().await;
    ctx.state.notification = NotificationService::new(Arc::new(FailingProvider));
    ctx
}

// ============================================================================
// Seed data
// ============================================================================

pub async fn create_restaurant(db: &DatabaseConnection, name: &str) -> restaurant::Model {
    restaurant::ActiveModel {
        name: Set(name.to_string()),
        slug: Set(restaurant::slugify(name)),
        service_types: Set(serde_json::json!(["dine_in"])),
        accepts_reservations: Set(false),
        has_delivery: Set(false),
        has_takeout: Set(false),
        is_active: Set(true),
        is_verified: Set(true),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to create restaurant")
}

pub async fn create_user(
    db: &DatabaseConnection,
    email: &str,
    password: &str,
    role: Role,
    restaurant_id: Option<i64>,
) -> user::Model {
    user::ActiveModel {
        email: Set(email.to_string()),
        first_name: Set("Test".to_string()),
        last_name: Set("User".to_string()),
        phone_number: Set(None),
        role: Set(role),
        hashed_password: Set(snapserve::services::hash_password(password).unwrap()),
        is_active: Set(true),
        email_verified: Set(true),
        restaurant_id: Set(restaurant_id),
        last_login_at: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to create user")
}

/// An active, verified admin who owns a fresh restaurant.
pub async fn seed_admin(db: &DatabaseConnection) -> (user::Model, restaurant::Model) {
    seed_admin_named(db, ADMIN_EMAIL, "Trattoria Test").await
}

pub async fn seed_admin_named(
    db: &DatabaseConnection,
    email: &str,
    restaurant_name: &str,
) -> (user::Model, restaurant::Model) {
    let restaurant = create_restaurant(db, restaurant_name).await;
    let admin = create_user(db, email, ADMIN_PASSWORD, Role::Admin, Some(restaurant.id)).await;
    (admin, restaurant)
}

pub fn bearer(user: &user::Model) -> String {
    init_test_env();
    let token = snapserve::services::create_access_token(user).expect("Failed to sign token");
    format!("Bearer {}", token)
}

// ============================================================================
// HTTP helpers
// ============================================================================

/// Send one request and return the status with the parsed JSON body
/// (`Value::Null` for empty or non-JSON bodies).
pub async fn send(
    app: Router,
    method: Method,
    uri: &str,
    auth: Option<&str>,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(auth) = auth {
        builder = builder.header(header::AUTHORIZATION, auth);
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}

pub async fn get(app: Router, uri: &str, auth: Option<&str>) -> (StatusCode, serde_json::Value) {
    send(app, Method::GET, uri, auth, None).await
}

pub async fn post(
    app: Router,
    uri: &str,
    auth: Option<&str>,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    send(app, Method::POST, uri, auth, Some(body)).await
}

/// Pull the `token=` query value out of a link inside an email body.
pub fn token_from_body(body: &str) -> String {
    let start = body.find("token=").expect("no token link in message") + "token=".len();
    body[start..]
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect()
}

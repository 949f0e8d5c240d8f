//! Restaurant profile endpoint tests
//!
//! Covers `/api/restaurants/{id}/...`: profile, business hours, setup status
//! and statistics. Only the owning admin may see a restaurant; everyone else
//! gets a 404.

use axum::http::{Method, StatusCode};
use chrono::{Duration, Utc};
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use serde_json::json;

mod common;
use common::*;

use snapserve::models::order::{OrderStatus, PaymentStatus};
use snapserve::models::user::Role;
use snapserve::models::{dining_table, menu_category, menu_item, order};
use snapserve::services::Clock;

async fn patch(
    ctx: &TestContext,
    uri: &str,
    auth: &str,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    send(ctx.router(), Method::PATCH, uri, Some(auth), Some(body)).await
}

async fn put(
    ctx: &TestContext,
    uri: &str,
    auth: &str,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    send(ctx.router(), Method::PUT, uri, Some(auth), Some(body)).await
}

// ============================================================================
// Access
// ============================================================================

#[tokio::test]
async fn test_only_owner_sees_restaurant() {
    let ctx = test_context().await;
    let (admin, restaurant) = seed_admin(ctx.db()).await;
    let (rival, _) = seed_admin_named(ctx.db(), "boss@bistro.test", "Bistro").await;
    let manager = create_user(
        ctx.db(),
        "manager@trattoria.test",
        STAFF_PASSWORD,
        Role::Manager,
        Some(restaurant.id),
    )
    .await;

    let uri = format!("/api/restaurants/{}/profile", restaurant.id);

    let (status, body) = get(ctx.router(), &uri, Some(&bearer(&admin))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Trattoria Test");
    assert_eq!(body["serviceTypes"], json!(["dine_in"]));

    for outsider in [&rival, &manager] {
        let (status, body) = get(ctx.router(), &uri, Some(&bearer(outsider))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["detail"], "Restaurant not found or access denied");
    }

    let (status, _) = get(
        ctx.router(),
        "/api/restaurants/9999/profile",
        Some(&bearer(&admin)),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = get(ctx.router(), &uri, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// ============================================================================
// Profile
// ============================================================================

#[tokio::test]
async fn test_update_profile() {
    let ctx = test_context().await;
    let (admin, restaurant) = seed_admin(ctx.db()).await;
    let auth = bearer(&admin);
    let uri = format!("/api/restaurants/{}/profile", restaurant.id);

    let (status, body) = patch(
        &ctx,
        &uri,
        &auth,
        json!({
            "description": "  Handmade pasta  ",
            "phoneNumber": "555-0100",
            "email": "Ciao@Trattoria.TEST",
            "address": "1 Via Roma",
            "city": "Springfield",
            "country": "US",
            "cuisineType": "italian",
            "serviceTypes": ["dine_in", "takeout", "dine_in"],
            "primaryColor": "#AA3300",
            "hasTakeout": true,
            "minimumOrderCents": 1500,
            "estimatedDeliveryMinutes": 40
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["description"], "Handmade pasta");
    assert_eq!(body["email"], "ciao@trattoria.test");
    assert_eq!(body["cuisineType"], "italian");
    assert_eq!(body["serviceTypes"], json!(["dine_in", "takeout"]));
    assert_eq!(body["hasTakeout"], true);
    assert_eq!(body["minimumOrderCents"], 1500);
    assert_eq!(body["fullAddress"], "1 Via Roma, Springfield, US");
    // Untouched fields keep their values.
    assert_eq!(body["name"], "Trattoria Test");

    // An empty string clears a field.
    let (status, body) = patch(&ctx, &uri, &auth, json!({ "description": "" })).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["description"].is_null());
    assert_eq!(body["phoneNumber"], "555-0100");
}

#[tokio::test]
async fn test_update_profile_validation() {
    let ctx = test_context().await;
    let (admin, restaurant) = seed_admin(ctx.db()).await;
    let auth = bearer(&admin);
    let uri = format!("/api/restaurants/{}/profile", restaurant.id);

    let (status, body) = patch(
        &ctx,
        &uri,
        &auth,
        json!({
            "name": "   ",
            "email": "nope",
            "logoUrl": "not a url",
            "primaryColor": "red",
            "deliveryFeeCents": -1,
            "estimatedDeliveryMinutes": 0
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    for field in [
        "name",
        "email",
        "logo_url",
        "primary_color",
        "delivery_fee_cents",
        "estimated_delivery_minutes",
    ] {
        assert!(body["errors"][field].is_array(), "missing error for {}", field);
    }

    let (status, _) = patch(&ctx, &uri, &auth, json!({ "cuisineType": "martian" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ============================================================================
// Business hours
// ============================================================================

#[tokio::test]
async fn test_replace_business_hours() {
    let ctx = test_context().await;
    let (admin, restaurant) = seed_admin(ctx.db()).await;
    let auth = bearer(&admin);
    let uri = format!("/api/restaurants/{}/business-hours", restaurant.id);

    let (status, body) = put(
        &ctx,
        &uri,
        &auth,
        json!({
            "hours": [
                { "dayOfWeek": "sunday", "isOpen": false },
                { "dayOfWeek": "friday", "openTime": "17:00", "closeTime": "01:00" },
                { "dayOfWeek": "monday", "openTime": "11:30", "closeTime": "22:00" },
                { "dayOfWeek": "saturday", "is24Hours": true, "openTime": "09:00" }
            ]
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);

    let hours = body["hours"].as_array().unwrap();
    let days: Vec<_> = hours.iter().map(|h| h["dayOfWeek"].as_str().unwrap()).collect();
    assert_eq!(days, ["monday", "friday", "saturday", "sunday"]);
    assert_eq!(hours[0]["formattedHours"], "11:30 AM - 10:00 PM");
    assert_eq!(hours[1]["closeTime"], "01:00");
    assert_eq!(hours[2]["formattedHours"], "24 Hours");
    assert!(hours[2]["openTime"].is_null());
    assert_eq!(hours[3]["formattedHours"], "Closed");

    // A second PUT replaces rather than appends.
    let (status, body) = put(
        &ctx,
        &uri,
        &auth,
        json!({ "hours": [{ "dayOfWeek": "tuesday", "openTime": "08:00", "closeTime": "16:00" }] }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["hours"].as_array().unwrap().len(), 1);

    let (status, body) = get(ctx.router(), &uri, Some(&auth)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["restaurantId"], restaurant.id);
    assert_eq!(body["hours"][0]["dayLabel"], "Tuesday");

    let (_, profile) = get(
        ctx.router(),
        &format!("/api/restaurants/{}/profile", restaurant.id),
        Some(&auth),
    )
    .await;
    assert_eq!(profile["businessHours"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_business_hours_report_whether_open_now() {
    let ctx = test_context().await;
    let (admin, restaurant) = seed_admin(ctx.db()).await;
    let auth = bearer(&admin);
    let uri = format!("/api/restaurants/{}/business-hours", restaurant.id);

    let now = ctx.clock.now();
    let today = now.format("%A").to_string().to_lowercase();
    let tomorrow = (now + Duration::days(1)).format("%A").to_string().to_lowercase();

    let (status, body) = put(
        &ctx,
        &uri,
        &auth,
        json!({
            "hours": [
                { "dayOfWeek": today, "is24Hours": true },
                { "dayOfWeek": tomorrow, "is24Hours": true }
            ]
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);

    let hours = body["hours"].as_array().unwrap();
    let open_now: Vec<_> = hours
        .iter()
        .filter(|h| h["isCurrentlyOpen"] == true)
        .map(|h| h["dayOfWeek"].as_str().unwrap())
        .collect();
    assert_eq!(open_now, [today.as_str()]);

    ctx.clock.advance(Duration::days(1));
    let (_, body) = get(ctx.router(), &uri, Some(&auth)).await;
    let open_now: Vec<_> = body["hours"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|h| h["isCurrentlyOpen"] == true)
        .map(|h| h["dayOfWeek"].as_str().unwrap())
        .collect();
    assert_eq!(open_now, [tomorrow.as_str()]);
}

#[tokio::test]
async fn test_business_hours_rejections_keep_existing_rows() {
    let ctx = test_context().await;
    let (admin, restaurant) = seed_admin(ctx.db()).await;
    let auth = bearer(&admin);
    let uri = format!("/api/restaurants/{}/business-hours", restaurant.id);

    put(
        &ctx,
        &uri,
        &auth,
        json!({ "hours": [{ "dayOfWeek": "monday", "openTime": "09:00", "closeTime": "17:00" }] }),
    )
    .await;

    let (status, body) = put(
        &ctx,
        &uri,
        &auth,
        json!({
            "hours": [
                { "dayOfWeek": "monday", "openTime": "09:00", "closeTime": "17:00" },
                { "dayOfWeek": "monday", "isOpen": false }
            ]
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Monday appears more than once");

    let (status, body) = put(
        &ctx,
        &uri,
        &auth,
        json!({ "hours": [{ "dayOfWeek": "monday", "openTime": "9am", "closeTime": "17:00" }] }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"]["hours[0].open_time"].is_array());

    let (status, body) = put(
        &ctx,
        &uri,
        &auth,
        json!({ "hours": [{ "dayOfWeek": "monday", "openTime": "09:00" }] }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Opening and closing times are required for Monday");

    let (status, _) = put(
        &ctx,
        &uri,
        &auth,
        json!({ "hours": [{ "dayOfWeek": "monday", "openTime": "09:00", "closeTime": "09:00" }] }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = get(ctx.router(), &uri, Some(&auth)).await;
    assert_eq!(body["hours"].as_array().unwrap().len(), 1);
    assert_eq!(body["hours"][0]["openTime"], "09:00");
}

// ============================================================================
// Progress
// ============================================================================

#[tokio::test]
async fn test_setup_status_progress() {
    let ctx = test_context().await;
    let (admin, restaurant) = seed_admin(ctx.db()).await;
    let auth = bearer(&admin);
    let uri = format!("/api/restaurants/{}/setup-status", restaurant.id);

    let (status, body) = get(ctx.router(), &uri, Some(&auth)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["completionPercentage"], 0);
    assert_eq!(body["isComplete"], false);
    assert_eq!(body["steps"]["branding"]["required"], false);

    patch(
        &ctx,
        &format!("/api/restaurants/{}/profile", restaurant.id),
        &auth,
        json!({ "description": "Pasta", "address": "1 Via Roma", "phoneNumber": "555-0100" }),
    )
    .await;

    let (_, body) = get(ctx.router(), &uri, Some(&auth)).await;
    assert_eq!(body["completionPercentage"], 67);
    assert_eq!(body["steps"]["basicInfo"]["completed"], true);
    assert_eq!(body["steps"]["contactInfo"]["completed"], true);

    patch(
        &ctx,
        &format!("/api/restaurants/{}/profile", restaurant.id),
        &auth,
        json!({ "logoUrl": "https://cdn.trattoria.test/logo.png" }),
    )
    .await;

    let (_, body) = get(ctx.router(), &uri, Some(&auth)).await;
    assert_eq!(body["completionPercentage"], 100);
    assert_eq!(body["isComplete"], true);
}

async fn seed_activity(db: &DatabaseConnection, restaurant_id: i64, customer_id: i64) {
    for (number, active) in [("1", true), ("2", true), ("3", false)] {
        dining_table::ActiveModel {
            restaurant_id: Set(restaurant_id),
            table_number: Set(number.to_string()),
            qr_code: Set(None),
            is_active: Set(active),
            ..Default::default()
        }
        .insert(db)
        .await
        .unwrap();
    }

    let category = menu_category::ActiveModel {
        restaurant_id: Set(restaurant_id),
        name: Set("Pasta".to_string()),
        description: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap();

    for (name, price) in [("Carbonara", 1400), ("Cacio e pepe", 1200)] {
        menu_item::ActiveModel {
            restaurant_id: Set(restaurant_id),
            category_id: Set(Some(category.id)),
            name: Set(name.to_string()),
            description: Set(None),
            price_cents: Set(price),
            photo_url: Set(None),
            ..Default::default()
        }
        .insert(db)
        .await
        .unwrap();
    }

    order::ActiveModel {
        order_number: Set(format!("ORD-{}-{}", restaurant_id, Utc::now().timestamp_micros())),
        status: Set(OrderStatus::Pending),
        payment_status: Set(PaymentStatus::Pending),
        total_cents: Set(2600),
        customer_id: Set(customer_id),
        restaurant_id: Set(restaurant_id),
        table_id: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap();
}

#[tokio::test]
async fn test_statistics_counts_only_own_rows() {
    let ctx = test_context().await;
    let (admin, restaurant) = seed_admin(ctx.db()).await;
    let (_, other) = seed_admin_named(ctx.db(), "boss@bistro.test", "Bistro").await;
    let customer = create_user(
        ctx.db(),
        "diner@example.com",
        STAFF_PASSWORD,
        Role::Customer,
        None,
    )
    .await;

    seed_activity(ctx.db(), restaurant.id, customer.id).await;
    seed_activity(ctx.db(), other.id, customer.id).await;

    let (status, body) = get(
        ctx.router(),
        &format!("/api/restaurants/{}/statistics", restaurant.id),
        Some(&bearer(&admin)),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["restaurantId"], restaurant.id);
    assert_eq!(body["totalTables"], 3);
    assert_eq!(body["activeTables"], 2);
    assert_eq!(body["totalCategories"], 1);
    assert_eq!(body["totalMenuItems"], 2);
    assert_eq!(body["totalOrders"], 1);
    assert_eq!(body["isProfileComplete"], false);
    assert_eq!(body["profileCompletionPercentage"], 11);
}

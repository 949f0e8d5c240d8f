use std::borrow::Cow;

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use super::{validate_hex_color, validate_not_blank};
use crate::models::business_hours::{self, DayOfWeek};
use crate::models::restaurant::{self, CuisineType, ServiceType};

pub const TIME_FORMAT: &str = "%H:%M";

/// `HH:MM`, 24-hour clock.
pub fn validate_time_of_day(value: &str) -> Result<(), ValidationError> {
    parse_time_of_day(value).map(|_| ()).ok_or_else(|| {
        let mut err = ValidationError::new("time_format");
        err.message = Some(Cow::Borrowed("Time must be in HH:MM format"));
        err
    })
}

pub fn parse_time_of_day(value: &str) -> Option<NaiveTime> {
    if value.len() != 5 {
        return None;
    }
    NaiveTime::parse_from_str(value, TIME_FORMAT).ok()
}

// ============================================================================
// Profile
// ============================================================================

/// Partial profile update: absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[validate(
        custom(function = "validate_not_blank"),
        length(max = 255, message = "Restaurant name cannot be longer than 255 characters")
    )]
    pub name: Option<String>,
    #[validate(length(max = 1000, message = "Description cannot be longer than 1000 characters"))]
    pub description: Option<String>,
    #[validate(length(max = 20, message = "Phone number cannot be longer than 20 characters"))]
    pub phone_number: Option<String>,
    #[validate(
        email(message = "Please provide a valid email address"),
        length(max = 180, message = "Email cannot be longer than 180 characters")
    )]
    pub email: Option<String>,
    #[validate(length(max = 255, message = "Address cannot be longer than 255 characters"))]
    pub address: Option<String>,
    #[validate(length(max = 100, message = "City cannot be longer than 100 characters"))]
    pub city: Option<String>,
    #[validate(length(max = 100, message = "State cannot be longer than 100 characters"))]
    pub state: Option<String>,
    #[validate(length(max = 20, message = "Postal code cannot be longer than 20 characters"))]
    pub postal_code: Option<String>,
    #[validate(length(max = 100, message = "Country cannot be longer than 100 characters"))]
    pub country: Option<String>,
    #[validate(
        url(message = "Logo URL must be a valid URL"),
        length(max = 500, message = "Logo URL cannot be longer than 500 characters")
    )]
    pub logo_url: Option<String>,
    #[validate(
        url(message = "Cover image URL must be a valid URL"),
        length(max = 500, message = "Cover image URL cannot be longer than 500 characters")
    )]
    pub cover_image_url: Option<String>,
    pub cuisine_type: Option<CuisineType>,
    pub service_types: Option<Vec<ServiceType>>,
    #[validate(custom(function = "validate_hex_color"))]
    pub primary_color: Option<String>,
    #[validate(custom(function = "validate_hex_color"))]
    pub secondary_color: Option<String>,
    #[validate(length(
        max = 1000,
        message = "Special instructions cannot be longer than 1000 characters"
    ))]
    pub special_instructions: Option<String>,
    pub accepts_reservations: Option<bool>,
    pub has_delivery: Option<bool>,
    pub has_takeout: Option<bool>,
    #[validate(range(min = 0, message = "Minimum order amount cannot be negative"))]
    pub minimum_order_cents: Option<i64>,
    #[validate(range(min = 0, message = "Delivery fee cannot be negative"))]
    pub delivery_fee_cents: Option<i64>,
    #[validate(range(min = 1, message = "Estimated delivery time must be positive"))]
    pub estimated_delivery_minutes: Option<i32>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    pub full_address: String,
    pub logo_url: Option<String>,
    pub cover_image_url: Option<String>,
    pub cuisine_type: Option<CuisineType>,
    pub service_types: Vec<ServiceType>,
    pub primary_color: Option<String>,
    pub secondary_color: Option<String>,
    pub special_instructions: Option<String>,
    pub accepts_reservations: bool,
    pub has_delivery: bool,
    pub has_takeout: bool,
    pub minimum_order_cents: Option<i64>,
    pub delivery_fee_cents: Option<i64>,
    pub estimated_delivery_minutes: Option<i32>,
    pub is_active: bool,
    pub is_verified: bool,
    pub profile_completion_percentage: u8,
    pub is_profile_complete: bool,
    pub business_hours: Vec<BusinessHoursResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProfileResponse {
    pub fn new(r: &restaurant::Model, hours: &[business_hours::Model], now: DateTime<Utc>) -> Self {
        let has_hours = !hours.is_empty();
        Self {
            id: r.id,
            name: r.name.clone(),
            slug: r.slug.clone(),
            description: r.description.clone(),
            phone_number: r.phone_number.clone(),
            email: r.email.clone(),
            address: r.address.clone(),
            city: r.city.clone(),
            state: r.state.clone(),
            postal_code: r.postal_code.clone(),
            country: r.country.clone(),
            full_address: r.full_address(),
            logo_url: r.logo_url.clone(),
            cover_image_url: r.cover_image_url.clone(),
            cuisine_type: r.cuisine_type,
            service_types: r.service_types(),
            primary_color: r.primary_color.clone(),
            secondary_color: r.secondary_color.clone(),
            special_instructions: r.special_instructions.clone(),
            accepts_reservations: r.accepts_reservations,
            has_delivery: r.has_delivery,
            has_takeout: r.has_takeout,
            minimum_order_cents: r.minimum_order_cents,
            delivery_fee_cents: r.delivery_fee_cents,
            estimated_delivery_minutes: r.estimated_delivery_minutes,
            is_active: r.is_active,
            is_verified: r.is_verified,
            profile_completion_percentage: r.profile_completion_percentage(has_hours),
            is_profile_complete: r.is_profile_complete(has_hours),
            business_hours: BusinessHoursResponse::list(hours, now),
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

// ============================================================================
// Business hours
// ============================================================================

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BusinessHoursEntry {
    pub day_of_week: DayOfWeek,
    #[validate(custom(function = "validate_time_of_day"))]
    pub open_time: Option<String>,
    #[validate(custom(function = "validate_time_of_day"))]
    pub close_time: Option<String>,
    #[serde(default = "default_true")]
    pub is_open: bool,
    #[serde(default, rename = "is24Hours")]
    pub is_24_hours: bool,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct BusinessHoursRequest {
    #[validate(
        length(max = 7, message = "At most one entry per day of the week"),
        nested
    )]
    pub hours: Vec<BusinessHoursEntry>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessHoursResponse {
    pub id: i64,
    pub day_of_week: DayOfWeek,
    pub day_label: &'static str,
    pub open_time: Option<String>,
    pub close_time: Option<String>,
    pub is_open: bool,
    #[serde(rename = "is24Hours")]
    pub is_24_hours: bool,
    pub formatted_hours: String,
    pub is_currently_open: bool,
}

impl BusinessHoursResponse {
    pub fn at(h: &business_hours::Model, now: DateTime<Utc>) -> Self {
        Self {
            id: h.id,
            day_of_week: h.day_of_week,
            day_label: h.day_of_week.label(),
            open_time: h.open_time.map(|t| t.format(TIME_FORMAT).to_string()),
            close_time: h.close_time.map(|t| t.format(TIME_FORMAT).to_string()),
            is_open: h.is_open,
            is_24_hours: h.is_24_hours,
            formatted_hours: h.formatted_hours(),
            is_currently_open: h.is_open_on(now),
        }
    }

    pub fn list(hours: &[business_hours::Model], now: DateTime<Utc>) -> Vec<Self> {
        hours.iter().map(|h| Self::at(h, now)).collect()
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessHoursListResponse {
    pub restaurant_id: i64,
    pub hours: Vec<BusinessHoursResponse>,
}

// ============================================================================
// Setup status & statistics
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetupStep {
    pub completed: bool,
    pub required: bool,
    pub title: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetupSteps {
    pub basic_info: SetupStep,
    pub contact_info: SetupStep,
    pub branding: SetupStep,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetupStatusResponse {
    pub is_complete: bool,
    pub completion_percentage: u8,
    pub steps: SetupSteps,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantStatistics {
    pub restaurant_id: i64,
    pub total_tables: u64,
    pub active_tables: u64,
    pub total_categories: u64,
    pub total_menu_items: u64,
    pub total_orders: u64,
    pub profile_completion_percentage: u8,
    pub is_profile_complete: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_time_of_day() {
        assert_eq!(parse_time_of_day("09:30"), NaiveTime::from_hms_opt(9, 30, 0));
        assert!(validate_time_of_day("23:59").is_ok());
        assert!(validate_time_of_day("9:30").is_err());
        assert!(validate_time_of_day("24:00").is_err());
        assert!(validate_time_of_day("09:30:00").is_err());
    }

    #[test]
    fn test_profile_update_rejects_bad_values() {
        let req: UpdateProfileRequest = serde_json::from_value(json!({
            "primaryColor": "red",
            "minimumOrderCents": -1,
            "estimatedDeliveryMinutes": 0,
            "email": "nope"
        }))
        .unwrap();
        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("primary_color"));
        assert!(fields.contains_key("minimum_order_cents"));
        assert!(fields.contains_key("estimated_delivery_minutes"));
        assert!(fields.contains_key("email"));
    }

    #[test]
    fn test_profile_update_rejects_unknown_cuisine() {
        let parsed = serde_json::from_value::<UpdateProfileRequest>(json!({
            "cuisineType": "martian"
        }));
        assert!(parsed.is_err());
    }

    #[test]
    fn test_empty_profile_update_is_valid() {
        assert!(UpdateProfileRequest::default().validate().is_ok());
    }

    #[test]
    fn test_business_hours_entry_defaults() {
        let req: BusinessHoursRequest = serde_json::from_value(json!({
            "hours": [{ "dayOfWeek": "monday", "openTime": "09:00", "closeTime": "17:00" }]
        }))
        .unwrap();
        assert!(req.validate().is_ok());
        assert!(req.hours[0].is_open);
        assert!(!req.hours[0].is_24_hours);
    }

    #[test]
    fn test_business_hours_nested_time_errors() {
        let req: BusinessHoursRequest = serde_json::from_value(json!({
            "hours": [{ "dayOfWeek": "monday", "openTime": "9am" }]
        }))
        .unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_business_hours_rejects_more_than_seven_entries() {
        let entries = vec![json!({ "dayOfWeek": "monday", "isOpen": false }); 8];
        let req: BusinessHoursRequest =
            serde_json::from_value(json!({ "hours": entries })).unwrap();
        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        let hours = fields.get("hours").expect("hours error");
        assert_eq!(
            hours[0].message.as_deref(),
            Some("At most one entry per day of the week")
        );
        assert_eq!(hours[0].params["value"].as_array().map(Vec::len), Some(8));
    }
}

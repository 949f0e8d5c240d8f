//! Restaurant profile, business hours and setup progress for the owning admin.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, PaginatorTrait, QueryFilter,
    Set, TransactionTrait,
};

use crate::error::{AppError, Result};
use crate::models::business_hours;
use crate::models::prelude::*;
use crate::models::user::{self, Role};
use crate::schemas::restaurant::{
    parse_time_of_day, BusinessHoursEntry, RestaurantStatistics, SetupStatusResponse, SetupStep,
    SetupSteps, UpdateProfileRequest,
};
use crate::services::clock::SharedClock;
use crate::state::{AppState, DbConn};

pub const RESTAURANT_NOT_FOUND: &str = "Restaurant not found or access denied";

#[derive(Clone)]
pub struct RestaurantService {
    db: DbConn,
    clock: SharedClock,
}

impl RestaurantService {
    pub fn new(db: DbConn, clock: SharedClock) -> Self {
        Self { db, clock }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(state.db.clone(), state.clock.clone())
    }

    /// The restaurant `id`, only if `user` is the admin who owns it.
    pub async fn find_for_admin(&self, user: &user::Model, id: i64) -> Result<restaurant::Model> {
        if user.role != Role::Admin || user.restaurant_id != Some(id) {
            return Err(AppError::NotFound(RESTAURANT_NOT_FOUND.to_string()));
        }
        Restaurant::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound(RESTAURANT_NOT_FOUND.to_string()))
    }

    /// Hours for the restaurant, Monday first.
    pub async fn business_hours(&self, restaurant_id: i64) -> Result<Vec<business_hours::Model>> {
        let mut hours = BusinessHours::find()
            .filter(business_hours::Column::RestaurantId.eq(restaurant_id))
            .all(&self.db)
            .await?;
        hours.sort_by_key(|h| h.day_of_week);
        Ok(hours)
    }

    pub async fn update_profile(
        &self,
        restaurant: restaurant::Model,
        changes: UpdateProfileRequest,
    ) -> Result<restaurant::Model> {
        let restaurant_id = restaurant.id;
        let mut active = restaurant.into_active_model();

        if let Some(name) = changes.name {
            active.name = Set(name.trim().to_string());
        }
        set_text(&mut active.description, changes.description);
        set_text(&mut active.phone_number, changes.phone_number);
        set_text(&mut active.email, changes.email.map(|e| e.trim().to_lowercase()));
        set_text(&mut active.address, changes.address);
        set_text(&mut active.city, changes.city);
        set_text(&mut active.state, changes.state);
        set_text(&mut active.postal_code, changes.postal_code);
        set_text(&mut active.country, changes.country);
        set_text(&mut active.logo_url, changes.logo_url);
        set_text(&mut active.cover_image_url, changes.cover_image_url);
        set_text(&mut active.primary_color, changes.primary_color);
        set_text(&mut active.secondary_color, changes.secondary_color);
        set_text(&mut active.special_instructions, changes.special_instructions);

        if let Some(cuisine) = changes.cuisine_type {
            active.cuisine_type = Set(Some(cuisine));
        }
        if let Some(mut service_types) = changes.service_types {
            let mut seen = HashSet::new();
            service_types.retain(|t| seen.insert(*t));
            active.service_types = Set(serde_json::to_value(service_types)?);
        }
        if let Some(v) = changes.accepts_reservations {
            active.accepts_reservations = Set(v);
        }
        if let Some(v) = changes.has_delivery {
            active.has_delivery = Set(v);
        }
        if let Some(v) = changes.has_takeout {
            active.has_takeout = Set(v);
        }
        if let Some(v) = changes.minimum_order_cents {
            active.minimum_order_cents = Set(Some(v));
        }
        if let Some(v) = changes.delivery_fee_cents {
            active.delivery_fee_cents = Set(Some(v));
        }
        if let Some(v) = changes.estimated_delivery_minutes {
            active.estimated_delivery_minutes = Set(Some(v));
        }

        active.updated_at = Set(self.clock.now());
        let updated = active.update(&self.db).await?;
        tracing::info!(restaurant_id, "Restaurant profile updated");
        Ok(updated)
    }

    /// Replaces every business hours row of the restaurant.
    pub async fn replace_business_hours(
        &self,
        restaurant_id: i64,
        entries: Vec<BusinessHoursEntry>,
    ) -> Result<Vec<business_hours::Model>> {
        let now = self.clock.now();
        let rows = entries
            .into_iter()
            .scan(HashSet::new(), |seen, entry| {
                Some(if seen.insert(entry.day_of_week) {
                    hours_row(restaurant_id, entry, now)
                } else {
                    Err(AppError::BadRequest(format!(
                        "{} appears more than once",
                        entry.day_of_week.label()
                    )))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let txn = self.db.begin().await?;
        BusinessHours::delete_many()
            .filter(business_hours::Column::RestaurantId.eq(restaurant_id))
            .exec(&txn)
            .await?;
        for row in rows {
            row.insert(&txn).await?;
        }
        txn.commit().await?;

        tracing::info!(restaurant_id, "Business hours replaced");
        self.business_hours(restaurant_id).await
    }

    pub async fn statistics(&self, restaurant: &restaurant::Model) -> Result<RestaurantStatistics> {
        let id = restaurant.id;
        let total_tables = DiningTable::find()
            .filter(dining_table::Column::RestaurantId.eq(id))
            .count(&self.db)
            .await?;
        let active_tables = DiningTable::find()
            .filter(dining_table::Column::RestaurantId.eq(id))
            .filter(dining_table::Column::IsActive.eq(true))
            .count(&self.db)
            .await?;
        let total_categories = MenuCategory::find()
            .filter(menu_category::Column::RestaurantId.eq(id))
            .count(&self.db)
            .await?;
        let total_menu_items = MenuItem::find()
            .filter(menu_item::Column::RestaurantId.eq(id))
            .count(&self.db)
            .await?;
        let total_orders = Order::find()
            .filter(order::Column::RestaurantId.eq(id))
            .count(&self.db)
            .await?;
        let has_hours = BusinessHours::find()
            .filter(business_hours::Column::RestaurantId.eq(id))
            .count(&self.db)
            .await?
            > 0;

        Ok(RestaurantStatistics {
            restaurant_id: id,
            total_tables,
            active_tables,
            total_categories,
            total_menu_items,
            total_orders,
            profile_completion_percentage: restaurant.profile_completion_percentage(has_hours),
            is_profile_complete: restaurant.is_profile_complete(has_hours),
        })
    }
}

/// `Some("")` clears the column, `None` leaves it alone.
fn set_text(column: &mut sea_orm::ActiveValue<Option<String>>, value: Option<String>) {
    if let Some(value) = value {
        let value = value.trim();
        *column = Set((!value.is_empty()).then(|| value.to_string()));
    }
}

fn hours_row(
    restaurant_id: i64,
    entry: BusinessHoursEntry,
    now: DateTime<Utc>,
) -> Result<business_hours::ActiveModel> {
    let day = entry.day_of_week.label();
    let parse = |value: Option<String>| -> Result<Option<chrono::NaiveTime>> {
        value
            .filter(|v| !v.trim().is_empty())
            .map(|v| {
                parse_time_of_day(v.trim())
                    .ok_or_else(|| AppError::BadRequest(format!("Invalid time for {}: {}", day, v)))
            })
            .transpose()
    };

    let (open_time, close_time) = if !entry.is_open || entry.is_24_hours {
        (None, None)
    } else {
        match (parse(entry.open_time)?, parse(entry.close_time)?) {
            (Some(open), Some(close)) if open == close => {
                return Err(AppError::BadRequest(format!(
                    "Opening and closing times for {} must differ",
                    day
                )));
            }
            (Some(open), Some(close)) => (Some(open), Some(close)),
            _ => {
                return Err(AppError::BadRequest(format!(
                    "Opening and closing times are required for {}",
                    day
                )));
            }
        }
    };

    Ok(business_hours::ActiveModel {
        restaurant_id: Set(restaurant_id),
        day_of_week: Set(entry.day_of_week),
        open_time: Set(open_time),
        close_time: Set(close_time),
        is_open: Set(entry.is_open),
        is_24_hours: Set(entry.is_open && entry.is_24_hours),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    })
}

fn filled(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

/// Onboarding checklist shown on the admin dashboard.
pub fn setup_status(restaurant: &restaurant::Model) -> SetupStatusResponse {
    let steps = SetupSteps {
        basic_info: SetupStep {
            completed: !restaurant.name.trim().is_empty() && filled(&restaurant.description),
            required: true,
            title: "Basic Information",
            description: "Restaurant name and description",
        },
        contact_info: SetupStep {
            completed: filled(&restaurant.address) && filled(&restaurant.phone_number),
            required: true,
            title: "Contact Information",
            description: "Address and phone number",
        },
        branding: SetupStep {
            completed: filled(&restaurant.logo_url),
            required: false,
            title: "Branding",
            description: "Logo and brand colors",
        },
    };
    let flags = [
        steps.basic_info.completed,
        steps.contact_info.completed,
        steps.branding.completed,
    ];
    let completed = flags.iter().filter(|done| **done).count();

    SetupStatusResponse {
        is_complete: completed == flags.len(),
        completion_percentage: ((completed as f64 / flags.len() as f64) * 100.0).round() as u8,
        steps,
    }
}

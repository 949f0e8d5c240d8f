use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "restaurants")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    #[sea_orm(unique)]
    pub slug: String,
    pub description: Option<String>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    pub logo_url: Option<String>,
    pub cover_image_url: Option<String>,
    pub cuisine_type: Option<CuisineType>,
    /// JSON array of service type strings (`dine_in`, `takeout`, `delivery`).
    pub service_types: Json,
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
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::user::Entity")]
    Users,
    #[sea_orm(has_many = "super::business_hours::Entity")]
    BusinessHours,
    #[sea_orm(has_many = "super::staff_invitation::Entity")]
    StaffInvitations,
    #[sea_orm(has_many = "super::dining_table::Entity")]
    DiningTables,
    #[sea_orm(has_many = "super::menu_category::Entity")]
    MenuCategories,
    #[sea_orm(has_many = "super::menu_item::Entity")]
    MenuItems,
    #[sea_orm(has_many = "super::order::Entity")]
    Orders,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::business_hours::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BusinessHours.def()
    }
}

impl Related<super::staff_invitation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StaffInvitations.def()
    }
}

impl Related<super::dining_table::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DiningTables.def()
    }
}

impl Related<super::menu_category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MenuCategories.def()
    }
}

impl Related<super::menu_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MenuItems.def()
    }
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Orders.def()
    }
}

super::timestamped_behavior!();

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum CuisineType {
    #[sea_orm(string_value = "italian")]
    Italian,
    #[sea_orm(string_value = "chinese")]
    Chinese,
    #[sea_orm(string_value = "indian")]
    Indian,
    #[sea_orm(string_value = "mexican")]
    Mexican,
    #[sea_orm(string_value = "american")]
    American,
    #[sea_orm(string_value = "fast_food")]
    FastFood,
    #[sea_orm(string_value = "cafe")]
    Cafe,
    #[sea_orm(string_value = "other")]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceType {
    DineIn,
    Takeout,
    Delivery,
}

impl Model {
    pub fn service_types(&self) -> Vec<ServiceType> {
        serde_json::from_value(self.service_types.clone()).unwrap_or_default()
    }

    pub fn full_address(&self) -> String {
        [
            &self.address,
            &self.city,
            &self.state,
            &self.postal_code,
            &self.country,
        ]
        .iter()
        .filter_map(|part| part.as_deref())
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
    }

    /// Percentage of the nine profile fields that are filled in.
    pub fn profile_completion_percentage(&self, has_business_hours: bool) -> u8 {
        let fields = [
            !self.name.trim().is_empty(),
            is_filled(&self.description),
            is_filled(&self.phone_number),
            is_filled(&self.email),
            is_filled(&self.address),
            is_filled(&self.city),
            self.cuisine_type.is_some(),
            is_filled(&self.logo_url),
            has_business_hours,
        ];
        let completed = fields.iter().filter(|done| **done).count();
        ((completed as f64 / fields.len() as f64) * 100.0).round() as u8
    }

    pub fn is_profile_complete(&self, has_business_hours: bool) -> bool {
        !self.name.trim().is_empty()
            && is_filled(&self.phone_number)
            && is_filled(&self.address)
            && is_filled(&self.city)
            && has_business_hours
    }
}

fn is_filled(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

/// Lowercase URL slug: runs of non-alphanumeric characters collapse to `-`.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug = slug.trim_matches('-');
    if slug.is_empty() {
        "restaurant".to_string()
    } else {
        slug.to_string()
    }
}

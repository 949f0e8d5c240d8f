//! Command-line seeding of a ready-to-use admin and restaurant.
//!
//! `snapserve create-admin <email> <password> [-r NAME] [-f FIRST] [-l LAST]`
//! creates an active, verified restaurant and its verified admin in one
//! transaction, skipping the signup email round trip.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, Set, TransactionTrait};
use validator::ValidateEmail;

use crate::error::{AppError, Result};
use crate::models::restaurant::{self, CuisineType};
use crate::models::user::{self, Role};
use crate::services::signup::{find_user_by_email, unique_slug};
use crate::services::{normalize_email, security};
use crate::state::DbConn;

pub const COMMANDS: [&str; 2] = ["create-admin", "snapserve:create-admin"];

pub const USAGE: &str =
    "usage: snapserve create-admin <email> <password> [-r RESTAURANT] [-f FIRST] [-l LAST]";

const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminSeed {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub restaurant_name: String,
}

#[derive(Debug, Clone)]
pub struct SeededAdmin {
    pub user: user::Model,
    pub restaurant: restaurant::Model,
}

pub fn is_command(arg: &str) -> bool {
    COMMANDS.contains(&arg)
}

impl AdminSeed {
    pub fn new(email: &str, password: &str) -> Self {
        Self {
            email: email.to_string(),
            password: password.to_string(),
            first_name: "John".to_string(),
            last_name: "Doe".to_string(),
            restaurant_name: "Test Restaurant".to_string(),
        }
    }

    /// Parse the arguments that follow the command name.
    pub fn from_args<I>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut positional = Vec::new();
        let mut first_name = None;
        let mut last_name = None;
        let mut restaurant_name = None;

        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            let slot = match arg.as_str() {
                "-r" | "--restaurant-name" => &mut restaurant_name,
                "-f" | "--first-name" => &mut first_name,
                "-l" | "--last-name" => &mut last_name,
                flag if flag.starts_with('-') => {
                    let message = format!("Unknown option {}. {}", flag, USAGE);
                    return Err(AppError::BadRequest(message));
                }
                _ => {
                    positional.push(arg);
                    continue;
                }
            };
            let value = args
                .next()
                .ok_or_else(|| AppError::BadRequest(format!("Missing value for {}", arg)))?;
            *slot = Some(value);
        }

        let [email, password] = positional.as_slice() else {
            return Err(AppError::BadRequest(USAGE.to_string()));
        };

        let mut seed = Self::new(email, password);
        if let Some(name) = first_name {
            seed.first_name = name;
        }
        if let Some(name) = last_name {
            seed.last_name = name;
        }
        if let Some(name) = restaurant_name {
            seed.restaurant_name = name;
        }
        Ok(seed)
    }

    fn validate(&self) -> Result<()> {
        let required = [
            ("email", &self.email),
            ("password", &self.password),
            ("first name", &self.first_name),
            ("last name", &self.last_name),
            ("restaurant name", &self.restaurant_name),
        ];
        if let Some((field, _)) = required.iter().find(|(_, v)| v.trim().is_empty()) {
            return Err(AppError::BadRequest(format!("Field '{}' is required", field)));
        }
        if !normalize_email(&self.email).validate_email() {
            return Err(AppError::BadRequest("Invalid email address".to_string()));
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AppError::BadRequest(format!(
                "Password must be at least {} characters long",
                MIN_PASSWORD_LEN
            )));
        }
        Ok(())
    }
}

/// Insert an active, verified restaurant and its admin.
pub async fn create_admin_with_restaurant(
    db: &DbConn,
    now: DateTime<Utc>,
    seed: AdminSeed,
) -> Result<SeededAdmin> {
    seed.validate()?;

    let email = normalize_email(&seed.email);
    if find_user_by_email(db, &email).await?.is_some() {
        return Err(AppError::Conflict(format!(
            "User with email \"{}\" already exists",
            email
        )));
    }

    let hashed_password = security::hash_password(&seed.password)?;

    let txn = db.begin().await?;

    let restaurant_name = seed.restaurant_name.trim().to_string();
    let slug = unique_slug(&txn, &restaurant_name).await?;
    let restaurant = restaurant::ActiveModel {
        name: Set(restaurant_name),
        slug: Set(slug),
        email: Set(Some(email.clone())),
        description: Set(Some(
            "Test restaurant created for development and testing purposes".to_string(),
        )),
        address: Set(Some("123 Test Street, Test City, TC 12345".to_string())),
        phone_number: Set(Some("+1-555-0100".to_string())),
        cuisine_type: Set(Some(CuisineType::American)),
        service_types: Set(serde_json::json!(["dine_in", "takeout"])),
        accepts_reservations: Set(false),
        has_delivery: Set(false),
        has_takeout: Set(true),
        is_active: Set(true),
        is_verified: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let user = user::ActiveModel {
        email: Set(email),
        first_name: Set(seed.first_name.trim().to_string()),
        last_name: Set(seed.last_name.trim().to_string()),
        phone_number: Set(None),
        role: Set(Role::Admin),
        hashed_password: Set(hashed_password),
        is_active: Set(true),
        email_verified: Set(true),
        restaurant_id: Set(Some(restaurant.id)),
        last_login_at: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    tracing::info!(
        user_id = user.id,
        restaurant_id = restaurant.id,
        restaurant = %restaurant.name,
        "Admin user and restaurant created"
    );

    Ok(SeededAdmin { user, restaurant })
}

use sea_orm::entity::prelude::*;
use sea_orm::Iterable;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: Option<String>,
    pub role: Role,
    #[serde(skip_serializing)]
    pub hashed_password: String,
    pub is_active: bool,
    pub email_verified: bool,
    pub restaurant_id: Option<i64>,
    pub last_login_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::restaurant::Entity",
        from = "Column::RestaurantId",
        to = "super::restaurant::Column::Id"
    )]
    Restaurant,
    #[sea_orm(has_many = "super::verification_token::Entity")]
    VerificationTokens,
}

impl Related<super::restaurant::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Restaurant.def()
    }
}

impl Related<super::verification_token::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::VerificationTokens.def()
    }
}

super::timestamped_behavior!();

impl Model {
    /// Display name, falling back to the email address when no name is set.
    pub fn full_name(&self) -> String {
        let name = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let name = name.trim();
        if name.is_empty() {
            self.email.clone()
        } else {
            name.to_string()
        }
    }

    pub fn initials(&self) -> String {
        [&self.first_name, &self.last_name]
            .iter()
            .filter_map(|part| part.trim().chars().next())
            .flat_map(char::to_uppercase)
            .collect()
    }
}

/// Closed set of account roles.
///
/// Hierarchy: admin includes manager, manager includes staff, and every
/// role includes the base `user` role. Customers sit beside the staff
/// branch and only include `user`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[sea_orm(string_value = "user")]
    User,
    #[sea_orm(string_value = "customer")]
    Customer,
    #[sea_orm(string_value = "staff")]
    Staff,
    #[sea_orm(string_value = "manager")]
    Manager,
    #[sea_orm(string_value = "admin")]
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Customer => "customer",
            Role::Staff => "staff",
            Role::Manager => "manager",
            Role::Admin => "admin",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "user" => Some(Role::User),
            "customer" => Some(Role::Customer),
            "staff" => Some(Role::Staff),
            "manager" => Some(Role::Manager),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }

    pub fn is_admin(self) -> bool {
        matches!(self, Role::Admin)
    }

    pub fn is_manager(self) -> bool {
        matches!(self, Role::Manager | Role::Admin)
    }

    pub fn is_staff(self) -> bool {
        matches!(self, Role::Staff | Role::Manager | Role::Admin)
    }

    pub fn is_customer(self) -> bool {
        matches!(self, Role::Customer)
    }

    /// Whether holding `self` grants everything `other` grants.
    pub fn includes(self, other: Role) -> bool {
        match other {
            Role::User => true,
            Role::Customer => self.is_customer(),
            Role::Staff => self.is_staff(),
            Role::Manager => self.is_manager(),
            Role::Admin => self.is_admin(),
        }
    }

    /// Every role this one includes, lowest first.
    pub fn granted(self) -> Vec<Role> {
        Role::iter().filter(|r| self.includes(*r)).collect()
    }

    /// Human readable label used in emails.
    pub fn label(&self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Customer => "Customer",
            Role::Staff => "Staff Member",
            Role::Manager => "Manager",
            Role::Admin => "Administrator",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

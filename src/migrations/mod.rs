pub use sea_orm_migration::prelude::*;

mod m20250701_000001_create_restaurants;
mod m20250701_000002_create_users;
mod m20250701_000003_create_verification_tokens;
mod m20250701_000004_create_staff_invitations;
mod m20250701_000005_create_business_hours;
mod m20250701_000006_create_menus;
mod m20250701_000007_create_dining_tables;
mod m20250701_000008_create_orders;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250701_000001_create_restaurants::Migration),
            Box::new(m20250701_000002_create_users::Migration),
            Box::new(m20250701_000003_create_verification_tokens::Migration),
            Box::new(m20250701_000004_create_staff_invitations::Migration),
            Box::new(m20250701_000005_create_business_hours::Migration),
            Box::new(m20250701_000006_create_menus::Migration),
            Box::new(m20250701_000007_create_dining_tables::Migration),
            Box::new(m20250701_000008_create_orders::Migration),
        ]
    }
}

//! Migration: Create menu_categories and menu_items tables

use sea_orm_migration::prelude::*;

use super::m20250701_000001_create_restaurants::Restaurants;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(MenuCategories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MenuCategories::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(MenuCategories::RestaurantId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(MenuCategories::Name).string_len(255).not_null())
                    .col(ColumnDef::new(MenuCategories::Description).text().null())
                    .col(
                        ColumnDef::new(MenuCategories::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MenuCategories::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(MenuCategories::Table, MenuCategories::RestaurantId)
                            .to(Restaurants::Table, Restaurants::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(MenuItems::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MenuItems::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(MenuItems::RestaurantId).big_integer().not_null())
                    .col(ColumnDef::new(MenuItems::CategoryId).big_integer().null())
                    .col(ColumnDef::new(MenuItems::Name).string_len(255).not_null())
                    .col(ColumnDef::new(MenuItems::Description).text().null())
                    .col(ColumnDef::new(MenuItems::PriceCents).big_integer().not_null())
                    .col(ColumnDef::new(MenuItems::PhotoUrl).string_len(500).null())
                    .col(
                        ColumnDef::new(MenuItems::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MenuItems::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(MenuItems::Table, MenuItems::RestaurantId)
                            .to(Restaurants::Table, Restaurants::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(MenuItems::Table, MenuItems::CategoryId)
                            .to(MenuCategories::Table, MenuCategories::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(MenuItems::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(MenuCategories::Table).if_exists().to_owned())
            .await
    }
}

#[derive(Iden)]
enum MenuCategories {
    Table,
    Id,
    #[iden = "restaurant_id"]
    RestaurantId,
    Name,
    Description,
    #[iden = "created_at"]
    CreatedAt,
    #[iden = "updated_at"]
    UpdatedAt,
}

#[derive(Iden)]
pub enum MenuItems {
    Table,
    Id,
    #[iden = "restaurant_id"]
    RestaurantId,
    #[iden = "category_id"]
    CategoryId,
    Name,
    Description,
    #[iden = "price_cents"]
    PriceCents,
    #[iden = "photo_url"]
    PhotoUrl,
    #[iden = "created_at"]
    CreatedAt,
    #[iden = "updated_at"]
    UpdatedAt,
}

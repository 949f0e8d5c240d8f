//! Migration: Create business_hours table

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
                    .table(BusinessHours::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BusinessHours::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(BusinessHours::RestaurantId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BusinessHours::DayOfWeek)
                            .string_len(10)
                            .not_null(),
                    )
                    .col(ColumnDef::new(BusinessHours::OpenTime).time().null())
                    .col(ColumnDef::new(BusinessHours::CloseTime).time().null())
                    .col(
                        ColumnDef::new(BusinessHours::IsOpen)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(BusinessHours::Is24Hours)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(BusinessHours::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BusinessHours::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(BusinessHours::Table, BusinessHours::RestaurantId)
                            .to(Restaurants::Table, Restaurants::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_business_hours_restaurant_day")
                    .table(BusinessHours::Table)
                    .col(BusinessHours::RestaurantId)
                    .col(BusinessHours::DayOfWeek)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(BusinessHours::Table).if_exists().to_owned())
            .await
    }
}

#[derive(Iden)]
enum BusinessHours {
    Table,
    Id,
    #[iden = "restaurant_id"]
    RestaurantId,
    #[iden = "day_of_week"]
    DayOfWeek,
    #[iden = "open_time"]
    OpenTime,
    #[iden = "close_time"]
    CloseTime,
    #[iden = "is_open"]
    IsOpen,
    #[iden = "is_24_hours"]
    Is24Hours,
    #[iden = "created_at"]
    CreatedAt,
    #[iden = "updated_at"]
    UpdatedAt,
}

//! Migration: Create restaurants table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Restaurants::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Restaurants::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Restaurants::Name).string_len(255).not_null())
                    .col(
                        ColumnDef::new(Restaurants::Slug)
                            .string_len(255)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Restaurants::Description).text().null())
                    .col(ColumnDef::new(Restaurants::PhoneNumber).string_len(20).null())
                    .col(ColumnDef::new(Restaurants::Email).string_len(180).null())
                    .col(ColumnDef::new(Restaurants::Address).string_len(500).null())
                    .col(ColumnDef::new(Restaurants::City).string_len(100).null())
                    .col(ColumnDef::new(Restaurants::State).string_len(100).null())
                    .col(ColumnDef::new(Restaurants::PostalCode).string_len(20).null())
                    .col(ColumnDef::new(Restaurants::Country).string_len(100).null())
                    .col(ColumnDef::new(Restaurants::LogoUrl).string_len(500).null())
                    .col(ColumnDef::new(Restaurants::CoverImageUrl).string_len(500).null())
                    .col(ColumnDef::new(Restaurants::CuisineType).string_len(20).null())
                    .col(ColumnDef::new(Restaurants::ServiceTypes).json().not_null())
                    .col(ColumnDef::new(Restaurants::PrimaryColor).string_len(7).null())
                    .col(ColumnDef::new(Restaurants::SecondaryColor).string_len(7).null())
                    .col(ColumnDef::new(Restaurants::SpecialInstructions).text().null())
                    .col(
                        ColumnDef::new(Restaurants::AcceptsReservations)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Restaurants::HasDelivery)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Restaurants::HasTakeout)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Restaurants::MinimumOrderCents).big_integer().null())
                    .col(ColumnDef::new(Restaurants::DeliveryFeeCents).big_integer().null())
                    .col(ColumnDef::new(Restaurants::EstimatedDeliveryMinutes).integer().null())
                    .col(
                        ColumnDef::new(Restaurants::IsActive)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Restaurants::IsVerified)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Restaurants::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Restaurants::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Restaurants::Table).if_exists().to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Restaurants {
    Table,
    Id,
    Name,
    Slug,
    Description,
    #[iden = "phone_number"]
    PhoneNumber,
    Email,
    Address,
    City,
    State,
    #[iden = "postal_code"]
    PostalCode,
    Country,
    #[iden = "logo_url"]
    LogoUrl,
    #[iden = "cover_image_url"]
    CoverImageUrl,
    #[iden = "cuisine_type"]
    CuisineType,
    #[iden = "service_types"]
    ServiceTypes,
    #[iden = "primary_color"]
    PrimaryColor,
    #[iden = "secondary_color"]
    SecondaryColor,
    #[iden = "special_instructions"]
    SpecialInstructions,
    #[iden = "accepts_reservations"]
    AcceptsReservations,
    #[iden = "has_delivery"]
    HasDelivery,
    #[iden = "has_takeout"]
    HasTakeout,
    #[iden = "minimum_order_cents"]
    MinimumOrderCents,
    #[iden = "delivery_fee_cents"]
    DeliveryFeeCents,
    #[iden = "estimated_delivery_minutes"]
    EstimatedDeliveryMinutes,
    #[iden = "is_active"]
    IsActive,
    #[iden = "is_verified"]
    IsVerified,
    #[iden = "created_at"]
    CreatedAt,
    #[iden = "updated_at"]
    UpdatedAt,
}

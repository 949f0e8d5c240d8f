//! Migration: Create staff_invitations table
//!
//! Besides the unique token, a partial unique index keeps at most one
//! pending invitation per (restaurant, email).

use sea_orm_migration::prelude::*;

use super::m20250701_000001_create_restaurants::Restaurants;
use super::m20250701_000002_create_users::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(StaffInvitations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(StaffInvitations::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(StaffInvitations::RestaurantId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StaffInvitations::InvitedById)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(StaffInvitations::UserId).big_integer().null())
                    .col(
                        ColumnDef::new(StaffInvitations::Email)
                            .string_len(180)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StaffInvitations::FirstName)
                            .string_len(100)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StaffInvitations::LastName)
                            .string_len(100)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StaffInvitations::Role)
                            .string_len(20)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StaffInvitations::Token)
                            .string_len(255)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(StaffInvitations::Status)
                            .string_len(20)
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(StaffInvitations::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StaffInvitations::ExpiresAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StaffInvitations::AcceptedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(StaffInvitations::CancelledAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(StaffInvitations::CancelledById)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(StaffInvitations::RemovedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(StaffInvitations::RemovedById)
                            .big_integer()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(StaffInvitations::Table, StaffInvitations::RestaurantId)
                            .to(Restaurants::Table, Restaurants::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(StaffInvitations::Table, StaffInvitations::InvitedById)
                            .to(Users::Table, Users::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(StaffInvitations::Table, StaffInvitations::UserId)
                            .to(Users::Table, Users::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(StaffInvitations::Table, StaffInvitations::CancelledById)
                            .to(Users::Table, Users::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(StaffInvitations::Table, StaffInvitations::RemovedById)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_staff_invitations_restaurant_status")
                    .table(StaffInvitations::Table)
                    .col(StaffInvitations::RestaurantId)
                    .col(StaffInvitations::Status)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_staff_invitations_status_expires_at")
                    .table(StaffInvitations::Table)
                    .col(StaffInvitations::Status)
                    .col(StaffInvitations::ExpiresAt)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        // Partial indexes are not expressible through the schema builder.
        // PostgreSQL and SQLite both accept this statement as written.
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE UNIQUE INDEX IF NOT EXISTS idx_staff_invitations_pending_email \
                 ON staff_invitations (restaurant_id, email) WHERE status = 'pending'",
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .table(StaffInvitations::Table)
                    .if_exists()
                    .to_owned(),
            )
            .await
    }
}

#[derive(Iden)]
enum StaffInvitations {
    Table,
    Id,
    #[iden = "restaurant_id"]
    RestaurantId,
    #[iden = "invited_by_id"]
    InvitedById,
    #[iden = "user_id"]
    UserId,
    Email,
    #[iden = "first_name"]
    FirstName,
    #[iden = "last_name"]
    LastName,
    Role,
    Token,
    Status,
    #[iden = "created_at"]
    CreatedAt,
    #[iden = "expires_at"]
    ExpiresAt,
    #[iden = "accepted_at"]
    AcceptedAt,
    #[iden = "cancelled_at"]
    CancelledAt,
    #[iden = "cancelled_by_id"]
    CancelledById,
    #[iden = "removed_at"]
    RemovedAt,
    #[iden = "removed_by_id"]
    RemovedById,
}

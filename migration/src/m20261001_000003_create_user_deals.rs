use sea_orm_migration::prelude::*;

use crate::decimal;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();

        manager
            .create_table(
                Table::create()
                    .table(UserDeals::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(UserDeals::Id).integer().not_null().auto_increment().primary_key())
                    .col(ColumnDef::new(UserDeals::UserId).string_len(64).not_null())
                    .col(ColumnDef::new(UserDeals::AdminSignalId).integer().null()) // informational, no FK
                    .col(ColumnDef::new(UserDeals::Symbol).string_len(32).not_null())
                    .col(ColumnDef::new(UserDeals::Pos).integer().not_null().default(1))
                    .col(decimal(UserDeals::Qty, 18, backend).not_null())
                    .col(decimal(UserDeals::Ep, 18, backend).not_null())
                    .col(decimal(UserDeals::Cmp, 18, backend).null())
                    .col(decimal(UserDeals::Tp, 18, backend).null())
                    .col(decimal(UserDeals::Inv, 18, backend).not_null())
                    .col(decimal(UserDeals::Pl, 18, backend).null())
                    .col(ColumnDef::new(UserDeals::Status).string_len(8).not_null().default("ACTIVE"))
                    .col(ColumnDef::new(UserDeals::Notes).text().null())
                    .col(ColumnDef::new(UserDeals::CreatedAt).timestamp_with_time_zone().null().default(Expr::current_timestamp()))
                    .col(ColumnDef::new(UserDeals::UpdatedAt).timestamp_with_time_zone().null().default(Expr::current_timestamp()))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_user_deals_user_status")
                    .table(UserDeals::Table)
                    .col(UserDeals::UserId)
                    .col(UserDeals::Status)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UserDeals::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum UserDeals {
    Table,
    Id,
    UserId,
    AdminSignalId,
    Symbol,
    Pos,
    Qty,
    Ep,
    Cmp,
    Tp,
    Inv,
    Pl,
    Status,
    Notes,
    CreatedAt,
    UpdatedAt,
}

use sea_orm_migration::prelude::*;

use crate::decimal;

use crate::m20261001_000001_create_admin_trade_signals::AdminTradeSignals;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();

        // Projection of admin_trade_signals, one row per signal
        manager
            .create_table(
                Table::create()
                    .table(DefaultDeals::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(DefaultDeals::Id).integer().not_null().auto_increment().primary_key())
                    .col(ColumnDef::new(DefaultDeals::AdminSignalId).integer().not_null())
                    .col(ColumnDef::new(DefaultDeals::SignalRevision).integer().not_null())
                    .col(ColumnDef::new(DefaultDeals::Symbol).string_len(32).not_null())
                    .col(ColumnDef::new(DefaultDeals::Etf).string().null())
                    .col(ColumnDef::new(DefaultDeals::Pos).integer().not_null())
                    .col(ColumnDef::new(DefaultDeals::PositionType).string_len(8).not_null()) // LONG, SHORT, CLOSED
                    .col(ColumnDef::new(DefaultDeals::Status).string_len(8).not_null()) // ACTIVE, CLOSED
                    .col(decimal(DefaultDeals::Qty, 18, backend).not_null())
                    .col(decimal(DefaultDeals::EntryPrice, 18, backend).not_null())
                    .col(decimal(DefaultDeals::CurrentPrice, 18, backend).not_null())
                    .col(decimal(DefaultDeals::Investment, 18, backend).not_null())
                    .col(decimal(DefaultDeals::CurrentValue, 18, backend).not_null())
                    .col(decimal(DefaultDeals::Pnl, 18, backend).not_null())
                    .col(decimal(DefaultDeals::ProfitRatio, 12, backend).not_null())
                    .col(decimal(DefaultDeals::PriceChangePercent, 12, backend).not_null())
                    .col(decimal(DefaultDeals::TargetPrice, 18, backend).not_null())
                    .col(decimal(DefaultDeals::TargetValue, 18, backend).not_null())
                    .col(decimal(DefaultDeals::TargetPnlRatio, 12, backend).not_null())
                    .col(ColumnDef::new(DefaultDeals::EntryDate).date().null())
                    .col(decimal(DefaultDeals::SevenDayPrice, 18, backend).null())
                    .col(decimal(DefaultDeals::SevenDayChange, 12, backend).null())
                    .col(decimal(DefaultDeals::ThirtyDayPrice, 18, backend).null())
                    .col(decimal(DefaultDeals::ThirtyDayChange, 12, backend).null())
                    .col(ColumnDef::new(DefaultDeals::CreatedAt).timestamp_with_time_zone().null().default(Expr::current_timestamp()))
                    .col(ColumnDef::new(DefaultDeals::SyncedAt).timestamp_with_time_zone().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_default_deals_signal")
                            .from(DefaultDeals::Table, DefaultDeals::AdminSignalId)
                            .to(AdminTradeSignals::Table, AdminTradeSignals::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_default_deals_admin_signal_id")
                    .table(DefaultDeals::Table)
                    .col(DefaultDeals::AdminSignalId)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DefaultDeals::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum DefaultDeals {
    Table,
    Id,
    AdminSignalId,
    SignalRevision,
    Symbol,
    Etf,
    Pos,
    PositionType,
    Status,
    Qty,
    EntryPrice,
    CurrentPrice,
    Investment,
    CurrentValue,
    Pnl,
    ProfitRatio,
    PriceChangePercent,
    TargetPrice,
    TargetValue,
    TargetPnlRatio,
    EntryDate,
    SevenDayPrice,
    SevenDayChange,
    ThirtyDayPrice,
    ThirtyDayChange,
    CreatedAt,
    SyncedAt,
}

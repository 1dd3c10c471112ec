use sea_orm_migration::prelude::*;

use crate::decimal;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();

        // One OHLCV table for every symbol, keyed by (symbol, timeframe, ts)
        manager
            .create_table(
                Table::create()
                    .table(SymbolPrices::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(SymbolPrices::Id).integer().not_null().auto_increment().primary_key())
                    .col(ColumnDef::new(SymbolPrices::Symbol).string_len(32).not_null())
                    .col(ColumnDef::new(SymbolPrices::Timeframe).string_len(8).not_null()) // "5m" or "1d"
                    .col(ColumnDef::new(SymbolPrices::Ts).timestamp_with_time_zone().not_null())
                    .col(decimal(SymbolPrices::Open, 18, backend).not_null())
                    .col(decimal(SymbolPrices::High, 18, backend).not_null())
                    .col(decimal(SymbolPrices::Low, 18, backend).not_null())
                    .col(decimal(SymbolPrices::Close, 18, backend).not_null())
                    .col(decimal(SymbolPrices::Volume, 24, backend).null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_symbol_prices_symbol_timeframe_ts")
                    .table(SymbolPrices::Table)
                    .col(SymbolPrices::Symbol)
                    .col(SymbolPrices::Timeframe)
                    .col(SymbolPrices::Ts)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SymbolPrices::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum SymbolPrices {
    Table,
    Id,
    Symbol,
    Timeframe,
    Ts,
    Open,
    High,
    Low,
    Close,
    Volume,
}

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
                    .table(AdminTradeSignals::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(AdminTradeSignals::Id).integer().not_null().auto_increment().primary_key())
                    .col(ColumnDef::new(AdminTradeSignals::Symbol).string_len(32).not_null())
                    .col(ColumnDef::new(AdminTradeSignals::Etf).string().null()) // display alias
                    .col(ColumnDef::new(AdminTradeSignals::Pos).integer().not_null().default(1)) // 1 long, -1 short, 0 closed
                    .col(decimal(AdminTradeSignals::Qty, 18, backend).null())
                    .col(decimal(AdminTradeSignals::Ep, 18, backend).null()) // entry price
                    .col(decimal(AdminTradeSignals::Cmp, 18, backend).null()) // last known market price
                    .col(ColumnDef::new(AdminTradeSignals::Chan).string().null()) // "4.00%"
                    .col(decimal(AdminTradeSignals::Inv, 18, backend).null()) // qty * ep
                    .col(decimal(AdminTradeSignals::Tp, 18, backend).null())
                    .col(decimal(AdminTradeSignals::Tva, 18, backend).null())
                    .col(decimal(AdminTradeSignals::Tpr, 18, backend).null())
                    .col(decimal(AdminTradeSignals::Pl, 18, backend).null())
                    .col(ColumnDef::new(AdminTradeSignals::Date).date().null())
                    .col(ColumnDef::new(AdminTradeSignals::Pr).text().null())
                    .col(ColumnDef::new(AdminTradeSignals::Pp).text().null())
                    .col(ColumnDef::new(AdminTradeSignals::Iv).text().null())
                    .col(ColumnDef::new(AdminTradeSignals::Ip).text().null())
                    .col(ColumnDef::new(AdminTradeSignals::Nt).text().null())
                    .col(ColumnDef::new(AdminTradeSignals::Qt).text().null())
                    .col(ColumnDef::new(AdminTradeSignals::Seven).text().null()) // close 7 sessions back
                    .col(ColumnDef::new(AdminTradeSignals::Ch).text().null()) // % change vs seven
                    .col(ColumnDef::new(AdminTradeSignals::Thirty).text().null()) // close 30 sessions back
                    .col(ColumnDef::new(AdminTradeSignals::Dh).text().null()) // % change vs thirty
                    .col(ColumnDef::new(AdminTradeSignals::Revision).integer().not_null().default(1))
                    .col(ColumnDef::new(AdminTradeSignals::CreatedAt).timestamp_with_time_zone().null().default(Expr::current_timestamp()))
                    .col(ColumnDef::new(AdminTradeSignals::UpdatedAt).timestamp_with_time_zone().null().default(Expr::current_timestamp()))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_admin_trade_signals_symbol")
                    .table(AdminTradeSignals::Table)
                    .col(AdminTradeSignals::Symbol)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AdminTradeSignals::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum AdminTradeSignals {
    Table,
    Id,
    Symbol,
    Etf,
    Pos,
    Qty,
    Ep,
    Cmp,
    Chan,
    Inv,
    Tp,
    Tva,
    Tpr,
    Pl,
    Date,
    Pr,
    Pp,
    Iv,
    Ip,
    Nt,
    Qt,
    Seven,
    Ch,
    Thirty,
    Dh,
    Revision,
    CreatedAt,
    UpdatedAt,
}

//! `SeaORM` Entity for OHLCV bars of every tracked symbol

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "symbol_prices")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub symbol: String,
    /// "5m" intraday bars or "1d" daily bars
    pub timeframe: String,
    pub ts: DateTimeUtc,
    #[sea_orm(column_type = "Decimal(Some((18, 4)))")]
    pub open: Decimal,
    #[sea_orm(column_type = "Decimal(Some((18, 4)))")]
    pub high: Decimal,
    #[sea_orm(column_type = "Decimal(Some((18, 4)))")]
    pub low: Decimal,
    #[sea_orm(column_type = "Decimal(Some((18, 4)))")]
    pub close: Decimal,
    #[sea_orm(column_type = "Decimal(Some((24, 4)))", nullable)]
    pub volume: Option<Decimal>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

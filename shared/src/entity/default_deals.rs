//! `SeaORM` Entity, @generated manually

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "default_deals")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub admin_signal_id: i32,
    pub signal_revision: i32, // revision of the signal this row was projected from
    pub symbol: String,
    pub etf: Option<String>,
    pub pos: i32,
    pub position_type: String, // "LONG", "SHORT", "CLOSED"
    pub status: String,        // "ACTIVE", "CLOSED"
    #[sea_orm(column_type = "Decimal(Some((18, 4)))")]
    pub qty: Decimal,
    #[sea_orm(column_type = "Decimal(Some((18, 4)))")]
    pub entry_price: Decimal,
    #[sea_orm(column_type = "Decimal(Some((18, 4)))")]
    pub current_price: Decimal,
    #[sea_orm(column_type = "Decimal(Some((18, 4)))")]
    pub investment: Decimal,
    #[sea_orm(column_type = "Decimal(Some((18, 4)))")]
    pub current_value: Decimal,
    #[sea_orm(column_type = "Decimal(Some((18, 4)))")]
    pub pnl: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 4)))")]
    pub profit_ratio: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 4)))")]
    pub price_change_percent: Decimal,
    #[sea_orm(column_type = "Decimal(Some((18, 4)))")]
    pub target_price: Decimal,
    #[sea_orm(column_type = "Decimal(Some((18, 4)))")]
    pub target_value: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 4)))")]
    pub target_pnl_ratio: Decimal,
    pub entry_date: Option<Date>,
    #[sea_orm(column_type = "Decimal(Some((18, 4)))", nullable)]
    pub seven_day_price: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((12, 4)))", nullable)]
    pub seven_day_change: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((18, 4)))", nullable)]
    pub thirty_day_price: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((12, 4)))", nullable)]
    pub thirty_day_change: Option<Decimal>,
    pub created_at: Option<DateTimeUtc>,
    pub synced_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::admin_trade_signals::Entity",
        from = "Column::AdminSignalId",
        to = "super::admin_trade_signals::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    AdminTradeSignals,
}

impl Related<super::admin_trade_signals::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AdminTradeSignals.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

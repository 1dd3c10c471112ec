//! `SeaORM` Entity, @generated manually

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Admin-entered trade signal. Column names follow the dashboard's
/// abbreviated headers (`ep` entry price, `cmp` market price, `tp` target...).
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "admin_trade_signals")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub symbol: String,
    pub etf: Option<String>,
    pub pos: i32, // 1 long, -1 short, 0 closed
    #[sea_orm(column_type = "Decimal(Some((18, 4)))", nullable)]
    pub qty: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((18, 4)))", nullable)]
    pub ep: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((18, 4)))", nullable)]
    pub cmp: Option<Decimal>,
    pub chan: Option<String>, // "4.00%"
    #[sea_orm(column_type = "Decimal(Some((18, 4)))", nullable)]
    pub inv: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((18, 4)))", nullable)]
    pub tp: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((18, 4)))", nullable)]
    pub tva: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((18, 4)))", nullable)]
    pub tpr: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((18, 4)))", nullable)]
    pub pl: Option<Decimal>,
    pub date: Option<Date>,
    #[sea_orm(column_type = "Text", nullable)]
    pub pr: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub pp: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub iv: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub ip: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub nt: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub qt: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub seven: Option<String>, // close 7 sessions back
    #[sea_orm(column_type = "Text", nullable)]
    pub ch: Option<String>, // % change against `seven`
    #[sea_orm(column_type = "Text", nullable)]
    pub thirty: Option<String>, // close 30 sessions back
    #[sea_orm(column_type = "Text", nullable)]
    pub dh: Option<String>, // % change against `thirty`
    pub revision: i32,
    pub created_at: Option<DateTimeUtc>,
    pub updated_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::default_deals::Entity")]
    DefaultDeals,
}

impl Related<super::default_deals::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DefaultDeals.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Open means the admin has not flattened the position (`pos != 0`).
    pub fn is_open(&self) -> bool {
        self.pos != 0
    }
}

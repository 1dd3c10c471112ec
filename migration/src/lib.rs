pub use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::DbBackend;

mod m20261001_000001_create_admin_trade_signals;
mod m20261001_000002_create_default_deals;
mod m20261001_000003_create_user_deals;
mod m20261001_000004_create_symbol_prices;

pub struct Migrator;

/// Money/quantity column with 4 decimal places. SQLite rejects a declared
/// precision above 16, so there the column is declared without one.
pub(crate) fn decimal<T: IntoIden>(column: T, precision: u32, backend: DbBackend) -> ColumnDef {
    let mut def = ColumnDef::new(column);
    match backend {
        DbBackend::Sqlite => def.decimal(),
        _ => def.decimal_len(precision, 4),
    };
    def
}

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261001_000001_create_admin_trade_signals::Migration),
            Box::new(m20261001_000002_create_default_deals::Migration),
            Box::new(m20261001_000003_create_user_deals::Migration),
            Box::new(m20261001_000004_create_symbol_prices::Migration),
        ]
    }
}

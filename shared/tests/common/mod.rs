#![allow(dead_code)]

use std::sync::Arc;

use migration::{Migrator, MigratorTrait};
use rust_decimal::Decimal;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use shared::models::SignalInput;

/// Fresh in-memory database with every migration applied.
pub async fn setup_db() -> Arc<DatabaseConnection> {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1).min_connections(1).sqlx_logging(false);

    let db = Database::connect(options).await.expect("connect sqlite");
    Migrator::up(&db, None).await.expect("run migrations");
    Arc::new(db)
}

pub fn signal_input(symbol: &str, qty: Decimal, ep: Decimal, cmp: Option<Decimal>) -> SignalInput {
    SignalInput {
        symbol: symbol.to_string(),
        pos: Some(1),
        qty: Some(qty),
        ep: Some(ep),
        cmp,
        ..Default::default()
    }
}

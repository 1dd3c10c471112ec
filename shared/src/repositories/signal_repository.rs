//! Queries over `admin_trade_signals`.
//!
//! Functions take any `ConnectionTrait` so callers can run them inside a
//! transaction.

use sea_orm::prelude::*;
use sea_orm::{QueryOrder, QuerySelect};

use crate::entity::admin_trade_signals;
use crate::error::Result;

pub async fn find_by_id<C: ConnectionTrait>(conn: &C, id: i32) -> Result<Option<admin_trade_signals::Model>> {
    let signal = admin_trade_signals::Entity::find_by_id(id).one(conn).await?;
    Ok(signal)
}

/// Row-locked read for read-modify-write updates (`FOR UPDATE` where the
/// backend supports it).
pub async fn find_for_update<C: ConnectionTrait>(conn: &C, id: i32) -> Result<Option<admin_trade_signals::Model>> {
    let signal = admin_trade_signals::Entity::find_by_id(id)
        .lock_exclusive()
        .one(conn)
        .await?;
    Ok(signal)
}

pub async fn list<C: ConnectionTrait>(conn: &C, open_only: bool) -> Result<Vec<admin_trade_signals::Model>> {
    let mut query = admin_trade_signals::Entity::find();
    if open_only {
        query = query.filter(admin_trade_signals::Column::Pos.ne(0));
    }

    let signals = query
        .order_by_asc(admin_trade_signals::Column::Id)
        .all(conn)
        .await?;
    Ok(signals)
}

pub async fn insert<C: ConnectionTrait>(
    conn: &C,
    active_model: admin_trade_signals::ActiveModel,
) -> Result<admin_trade_signals::Model> {
    let signal = active_model.insert(conn).await?;
    Ok(signal)
}

pub async fn update<C: ConnectionTrait>(
    conn: &C,
    active_model: admin_trade_signals::ActiveModel,
) -> Result<admin_trade_signals::Model> {
    let signal = active_model.update(conn).await?;
    Ok(signal)
}

/// Returns the number of rows removed (0 or 1).
pub async fn delete<C: ConnectionTrait>(conn: &C, id: i32) -> Result<u64> {
    let result = admin_trade_signals::Entity::delete_by_id(id).exec(conn).await?;
    Ok(result.rows_affected)
}

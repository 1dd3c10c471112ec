//! Queries over `default_deals`.

use sea_orm::prelude::*;
use sea_orm::sea_query::{Expr, OnConflict, Query};
use sea_orm::QueryOrder;

use crate::entity::{admin_trade_signals, default_deals};
use crate::error::Result;

pub async fn find_by_signal<C: ConnectionTrait>(conn: &C, signal_id: i32) -> Result<Option<default_deals::Model>> {
    let deal = default_deals::Entity::find()
        .filter(default_deals::Column::AdminSignalId.eq(signal_id))
        .one(conn)
        .await?;
    Ok(deal)
}

pub async fn list<C: ConnectionTrait>(conn: &C) -> Result<Vec<default_deals::Model>> {
    let deals = default_deals::Entity::find()
        .order_by_asc(default_deals::Column::AdminSignalId)
        .all(conn)
        .await?;
    Ok(deals)
}

pub async fn count_for_signal<C: ConnectionTrait>(conn: &C, signal_id: i32) -> Result<u64> {
    let count = default_deals::Entity::find()
        .filter(default_deals::Column::AdminSignalId.eq(signal_id))
        .count(conn)
        .await?;
    Ok(count)
}

/// Insert the projection, or overwrite the existing row for the same signal
/// when it was projected from revision `revision` or older.
///
/// Returns the number of rows written; 0 means a newer projection is already
/// stored.
pub async fn upsert<C: ConnectionTrait>(
    conn: &C,
    active_model: default_deals::ActiveModel,
    revision: i32,
) -> Result<u64> {
    let on_conflict = OnConflict::column(default_deals::Column::AdminSignalId)
        .update_columns([
            default_deals::Column::SignalRevision,
            default_deals::Column::Symbol,
            default_deals::Column::Etf,
            default_deals::Column::Pos,
            default_deals::Column::PositionType,
            default_deals::Column::Status,
            default_deals::Column::Qty,
            default_deals::Column::EntryPrice,
            default_deals::Column::CurrentPrice,
            default_deals::Column::Investment,
            default_deals::Column::CurrentValue,
            default_deals::Column::Pnl,
            default_deals::Column::ProfitRatio,
            default_deals::Column::PriceChangePercent,
            default_deals::Column::TargetPrice,
            default_deals::Column::TargetValue,
            default_deals::Column::TargetPnlRatio,
            default_deals::Column::EntryDate,
            default_deals::Column::SevenDayPrice,
            default_deals::Column::SevenDayChange,
            default_deals::Column::ThirtyDayPrice,
            default_deals::Column::ThirtyDayChange,
            default_deals::Column::SyncedAt,
        ])
        .action_and_where(
            Expr::col((default_deals::Entity, default_deals::Column::SignalRevision)).lte(revision),
        )
        .to_owned();

    let written = default_deals::Entity::insert(active_model)
        .on_conflict(on_conflict)
        .exec_without_returning(conn)
        .await?;
    Ok(written)
}

pub async fn delete_by_signal<C: ConnectionTrait>(conn: &C, signal_id: i32) -> Result<u64> {
    let result = default_deals::Entity::delete_many()
        .filter(default_deals::Column::AdminSignalId.eq(signal_id))
        .exec(conn)
        .await?;
    Ok(result.rows_affected)
}

/// Delete the deal for `signal_id` unless it was projected from a revision
/// newer than `revision`.
pub async fn delete_by_signal_up_to<C: ConnectionTrait>(conn: &C, signal_id: i32, revision: i32) -> Result<u64> {
    let result = default_deals::Entity::delete_many()
        .filter(default_deals::Column::AdminSignalId.eq(signal_id))
        .filter(default_deals::Column::SignalRevision.lte(revision))
        .exec(conn)
        .await?;
    Ok(result.rows_affected)
}

/// Delete deals whose signal no longer exists. Returns the signal ids they
/// referenced.
pub async fn delete_orphans<C: ConnectionTrait>(conn: &C) -> Result<Vec<i32>> {
    let live_signals = Query::select()
        .column(admin_trade_signals::Column::Id)
        .from(admin_trade_signals::Entity)
        .to_owned();

    let orphans = default_deals::Entity::find()
        .filter(default_deals::Column::AdminSignalId.not_in_subquery(live_signals))
        .all(conn)
        .await?;

    if orphans.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<i32> = orphans.iter().map(|d| d.id).collect();
    default_deals::Entity::delete_many()
        .filter(default_deals::Column::Id.is_in(ids))
        .exec(conn)
        .await?;

    Ok(orphans.into_iter().map(|d| d.admin_signal_id).collect())
}

//! Projection of `admin_trade_signals` into `default_deals`.
//!
//! This module is the only code that writes `default_deals`. Signal writes
//! made through [`SignalService`](super::signal_service::SignalService) call
//! [`sync_signal`] inside their own transaction; [`reconcile`] repairs rows
//! written out-of-band and removes deals whose signal is gone.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveValue, ConnectionTrait};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::entity::{admin_trade_signals, default_deals};
use crate::error::Result;
use crate::prices::PriceLookup;
use crate::pricing::{parse_numeric, DealMetrics, PositionSide};
use crate::repositories::{deal_repository, signal_repository};
use crate::symbol::Symbol;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncOutcome {
    /// The deal row now reflects the signal.
    Projected,
    /// A projection of a newer revision is already stored.
    Stale,
    /// The signal lacks entry price or quantity; any existing deal was removed.
    Skipped,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    pub scanned: usize,
    pub projected: usize,
    pub stale: usize,
    pub skipped: usize,
    pub failed: usize,
    pub orphans_removed: usize,
}

/// Map a signal to its deal row. `None` when the signal has no entry price
/// or quantity to value.
///
/// The current price is the signal's `cmp`, else `fallback_cmp` (usually the
/// latest stored close), else the entry price.
pub fn project(
    signal: &admin_trade_signals::Model,
    fallback_cmp: Option<Decimal>,
    now: DateTime<Utc>,
) -> Option<default_deals::ActiveModel> {
    let entry_price = signal.ep?;
    let qty = signal.qty?;
    let current_price = signal.cmp.or(fallback_cmp).unwrap_or(entry_price);
    let side = PositionSide::from_pos(signal.pos);
    let metrics = DealMetrics::compute(entry_price, current_price, qty, side, signal.tp);

    let parse = |field: &Option<String>| field.as_deref().and_then(parse_numeric);

    Some(default_deals::ActiveModel {
        id: ActiveValue::NotSet,
        admin_signal_id: ActiveValue::Set(signal.id),
        signal_revision: ActiveValue::Set(signal.revision),
        symbol: ActiveValue::Set(signal.symbol.clone()),
        etf: ActiveValue::Set(signal.etf.clone()),
        pos: ActiveValue::Set(signal.pos),
        position_type: ActiveValue::Set(side.as_str().to_string()),
        status: ActiveValue::Set(side.status().to_string()),
        qty: ActiveValue::Set(qty),
        entry_price: ActiveValue::Set(entry_price),
        current_price: ActiveValue::Set(current_price),
        investment: ActiveValue::Set(metrics.investment),
        current_value: ActiveValue::Set(metrics.current_value),
        pnl: ActiveValue::Set(metrics.pnl),
        profit_ratio: ActiveValue::Set(metrics.profit_ratio),
        price_change_percent: ActiveValue::Set(metrics.change_percent),
        target_price: ActiveValue::Set(metrics.target_price),
        target_value: ActiveValue::Set(metrics.target_value),
        target_pnl_ratio: ActiveValue::Set(metrics.target_pnl_ratio),
        entry_date: ActiveValue::Set(signal.date),
        seven_day_price: ActiveValue::Set(parse(&signal.seven)),
        seven_day_change: ActiveValue::Set(parse(&signal.ch)),
        thirty_day_price: ActiveValue::Set(parse(&signal.thirty)),
        thirty_day_change: ActiveValue::Set(parse(&signal.dh)),
        created_at: ActiveValue::Set(Some(now)),
        synced_at: ActiveValue::Set(Some(now)),
    })
}

/// Bring the deal for `signal` up to date.
///
/// Neither branch touches a deal projected from a newer revision: the upsert
/// is revision-guarded, and so is the delete for signals that cannot be
/// valued.
pub async fn sync_signal<C: ConnectionTrait>(
    conn: &C,
    signal: &admin_trade_signals::Model,
    fallback_cmp: Option<Decimal>,
) -> Result<SyncOutcome> {
    let Some(active_model) = project(signal, fallback_cmp, Utc::now()) else {
        let removed = deal_repository::delete_by_signal_up_to(conn, signal.id, signal.revision).await?;
        if removed == 0 && deal_repository::count_for_signal(conn, signal.id).await? > 0 {
            debug!(signal_id = signal.id, revision = signal.revision, "Newer projection already stored");
            return Ok(SyncOutcome::Stale);
        }
        warn!(
            signal_id = signal.id,
            symbol = %signal.symbol,
            removed,
            "Signal has no entry price or quantity, not projected"
        );
        return Ok(SyncOutcome::Skipped);
    };

    let written = deal_repository::upsert(conn, active_model, signal.revision).await?;
    if written == 0 {
        debug!(signal_id = signal.id, revision = signal.revision, "Newer projection already stored");
        Ok(SyncOutcome::Stale)
    } else {
        debug!(signal_id = signal.id, revision = signal.revision, "Projected signal");
        Ok(SyncOutcome::Projected)
    }
}

/// Price to value a signal at when it carries no `cmp` of its own. Lookup
/// failures are logged and treated as "no price".
pub async fn fallback_cmp(prices: &dyn PriceLookup, symbol: &str, cmp: Option<Decimal>) -> Option<Decimal> {
    if cmp.is_some() {
        return None;
    }
    let symbol = Symbol::parse(symbol).ok()?;
    match prices.get_cmp(&symbol).await {
        Ok(price) => price,
        Err(e) => {
            warn!(%symbol, error = %e, "Price lookup failed, valuing at entry price");
            None
        }
    }
}

/// Delete the deal projected from `signal_id`. Returns rows removed.
pub async fn remove_for_signal<C: ConnectionTrait>(conn: &C, signal_id: i32) -> Result<u64> {
    let removed = deal_repository::delete_by_signal(conn, signal_id).await?;
    if removed > 0 {
        debug!(signal_id, "Removed projected deal");
    }
    Ok(removed)
}

/// Re-project every signal and drop orphaned deals. Safe to run repeatedly
/// and concurrently with service writes. A signal that fails to project is
/// counted in `failed` and does not stop the run.
pub async fn reconcile<C: ConnectionTrait>(conn: &C, prices: &dyn PriceLookup) -> Result<ReconcileReport> {
    let signals = signal_repository::list(conn, false).await?;
    let mut report = ReconcileReport {
        scanned: signals.len(),
        ..Default::default()
    };

    for signal in &signals {
        let fallback = fallback_cmp(prices, &signal.symbol, signal.cmp).await;
        match sync_signal(conn, signal, fallback).await {
            Ok(SyncOutcome::Projected) => report.projected += 1,
            Ok(SyncOutcome::Stale) => report.stale += 1,
            Ok(SyncOutcome::Skipped) => report.skipped += 1,
            Err(e) => {
                error!(signal_id = signal.id, symbol = %signal.symbol, error = %e, "Failed to project signal");
                report.failed += 1;
            }
        }
    }

    let orphans = deal_repository::delete_orphans(conn).await?;
    if !orphans.is_empty() {
        warn!(signal_ids = ?orphans, "Removed deals for deleted signals");
    }
    report.orphans_removed = orphans.len();

    info!(
        scanned = report.scanned,
        projected = report.projected,
        stale = report.stale,
        skipped = report.skipped,
        failed = report.failed,
        orphans_removed = report.orphans_removed,
        "Reconciled default deals"
    );
    Ok(report)
}

pub async fn list_deals<C: ConnectionTrait>(conn: &C) -> Result<Vec<default_deals::Model>> {
    deal_repository::list(conn).await
}

pub async fn deal_for_signal<C: ConnectionTrait>(conn: &C, signal_id: i32) -> Result<Option<default_deals::Model>> {
    deal_repository::find_by_signal(conn, signal_id).await
}

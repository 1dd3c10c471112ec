//! Write path for admin trade signals.
//!
//! Every mutation runs in one transaction together with the projection
//! update, so `default_deals` never lags a committed signal write.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveValue, DatabaseConnection, TransactionTrait};
use tracing::info;

use crate::entity::admin_trade_signals;
use crate::error::{Result, SyncError};
use crate::models::{MarketSnapshot, SignalInput};
use crate::prices::PriceLookup;
use crate::pricing::{format_percent, percent_change, DealMetrics, PositionSide};
use crate::repositories::signal_repository;
use crate::services::deal_sync::{self, SyncOutcome};
use crate::symbol::Symbol;

#[derive(Clone)]
pub struct SignalService {
    db: Arc<DatabaseConnection>,
    prices: Option<Arc<dyn PriceLookup>>,
}

/// Fields derived from a validated [`SignalInput`].
struct ValidatedSignal {
    symbol: Symbol,
    pos: i32,
    inv: Option<Decimal>,
    chan: Option<String>,
    pl: Option<Decimal>,
    input: SignalInput,
}

fn validate(input: SignalInput) -> Result<ValidatedSignal> {
    let symbol = Symbol::parse(&input.symbol)?;

    let pos = input.pos.unwrap_or(1);
    if !(-1..=1).contains(&pos) {
        return Err(SyncError::InvalidInput(format!("pos must be -1, 0 or 1, got {}", pos)));
    }

    for (name, value) in [("qty", input.qty), ("ep", input.ep), ("cmp", input.cmp), ("tp", input.tp)] {
        if matches!(value, Some(v) if v.is_sign_negative() && !v.is_zero()) {
            return Err(SyncError::InvalidInput(format!("{} must not be negative", name)));
        }
    }

    let inv = input.inv.or(match (input.qty, input.ep) {
        (Some(qty), Some(ep)) => Some(qty * ep),
        _ => None,
    });

    let chan = input.chan.clone().or(match (input.ep, input.cmp) {
        (Some(ep), Some(cmp)) => percent_change(ep, cmp).map(format_percent),
        _ => None,
    });

    let pl = input.pl.or(match (input.ep, input.cmp, input.qty) {
        (Some(ep), Some(cmp), Some(qty)) => {
            Some(DealMetrics::compute(ep, cmp, qty, PositionSide::from_pos(pos), input.tp).pnl)
        }
        _ => None,
    });

    Ok(ValidatedSignal {
        symbol,
        pos,
        inv,
        chan,
        pl,
        input,
    })
}

fn apply(active: &mut admin_trade_signals::ActiveModel, validated: ValidatedSignal) {
    let ValidatedSignal {
        symbol,
        pos,
        inv,
        chan,
        pl,
        input,
    } = validated;

    active.symbol = ActiveValue::Set(symbol.into());
    active.etf = ActiveValue::Set(input.etf);
    active.pos = ActiveValue::Set(pos);
    active.qty = ActiveValue::Set(input.qty);
    active.ep = ActiveValue::Set(input.ep);
    active.cmp = ActiveValue::Set(input.cmp);
    active.chan = ActiveValue::Set(chan);
    active.inv = ActiveValue::Set(inv);
    active.tp = ActiveValue::Set(input.tp);
    active.tva = ActiveValue::Set(input.tva);
    active.tpr = ActiveValue::Set(input.tpr);
    active.pl = ActiveValue::Set(pl);
    active.date = ActiveValue::Set(input.date);
    active.pr = ActiveValue::Set(input.pr);
    active.pp = ActiveValue::Set(input.pp);
    active.iv = ActiveValue::Set(input.iv);
    active.ip = ActiveValue::Set(input.ip);
    active.nt = ActiveValue::Set(input.nt);
    active.qt = ActiveValue::Set(input.qt);
    active.seven = ActiveValue::Set(input.seven);
    active.ch = ActiveValue::Set(input.ch);
    active.thirty = ActiveValue::Set(input.thirty);
    active.dh = ActiveValue::Set(input.dh);
}

impl SignalService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db, prices: None }
    }

    /// Value signals without a `cmp` at the latest known price instead of at
    /// their entry price.
    pub fn with_prices(mut self, prices: Arc<dyn PriceLookup>) -> Self {
        self.prices = Some(prices);
        self
    }

    /// Looked up before a write transaction opens, so the lookup never waits
    /// on the connection the transaction holds.
    async fn fallback_cmp(&self, symbol: &str, cmp: Option<Decimal>) -> Option<Decimal> {
        match &self.prices {
            Some(prices) => deal_sync::fallback_cmp(prices.as_ref(), symbol, cmp).await,
            None => None,
        }
    }

    async fn fallback_for_existing(&self, id: i32) -> Result<Option<Decimal>> {
        if self.prices.is_none() {
            return Ok(None);
        }
        Ok(match signal_repository::find_by_id(self.db.as_ref(), id).await? {
            Some(signal) => self.fallback_cmp(&signal.symbol, signal.cmp).await,
            None => None,
        })
    }

    pub async fn list(&self, open_only: bool) -> Result<Vec<admin_trade_signals::Model>> {
        signal_repository::list(self.db.as_ref(), open_only).await
    }

    pub async fn get(&self, id: i32) -> Result<admin_trade_signals::Model> {
        signal_repository::find_by_id(self.db.as_ref(), id)
            .await?
            .ok_or_else(|| SyncError::not_found("signal", id))
    }

    /// Insert a signal and its deal.
    pub async fn create(&self, input: SignalInput) -> Result<(admin_trade_signals::Model, SyncOutcome)> {
        let validated = validate(input)?;
        let fallback = self.fallback_cmp(validated.symbol.as_str(), validated.input.cmp).await;
        let now = Utc::now();

        let mut active = admin_trade_signals::ActiveModel {
            revision: ActiveValue::Set(1),
            created_at: ActiveValue::Set(Some(now)),
            updated_at: ActiveValue::Set(Some(now)),
            ..Default::default()
        };
        apply(&mut active, validated);

        let txn = self.db.begin().await?;
        let signal = signal_repository::insert(&txn, active).await?;
        let outcome = deal_sync::sync_signal(&txn, &signal, fallback).await?;
        txn.commit().await?;

        info!(signal_id = signal.id, symbol = %signal.symbol, ?outcome, "Created signal");
        Ok((signal, outcome))
    }

    /// Replace every admin-editable field of signal `id`.
    pub async fn update(&self, id: i32, input: SignalInput) -> Result<(admin_trade_signals::Model, SyncOutcome)> {
        let validated = validate(input)?;
        let fallback = self.fallback_cmp(validated.symbol.as_str(), validated.input.cmp).await;

        let txn = self.db.begin().await?;
        let existing = signal_repository::find_for_update(&txn, id)
            .await?
            .ok_or_else(|| SyncError::not_found("signal", id))?;

        let revision = existing.revision + 1;
        let mut active: admin_trade_signals::ActiveModel = existing.into();
        apply(&mut active, validated);
        active.revision = ActiveValue::Set(revision);
        active.updated_at = ActiveValue::Set(Some(Utc::now()));

        let signal = signal_repository::update(&txn, active).await?;
        let outcome = deal_sync::sync_signal(&txn, &signal, fallback).await?;
        txn.commit().await?;

        info!(signal_id = signal.id, revision, ?outcome, "Updated signal");
        Ok((signal, outcome))
    }

    /// Flatten the position (`pos = 0`). The deal stays, marked closed.
    pub async fn close(&self, id: i32) -> Result<(admin_trade_signals::Model, SyncOutcome)> {
        let fallback = self.fallback_for_existing(id).await?;

        let txn = self.db.begin().await?;
        let existing = signal_repository::find_for_update(&txn, id)
            .await?
            .ok_or_else(|| SyncError::not_found("signal", id))?;

        let revision = existing.revision + 1;
        let mut active: admin_trade_signals::ActiveModel = existing.into();
        active.pos = ActiveValue::Set(0);
        active.revision = ActiveValue::Set(revision);
        active.updated_at = ActiveValue::Set(Some(Utc::now()));

        let signal = signal_repository::update(&txn, active).await?;
        let outcome = deal_sync::sync_signal(&txn, &signal, fallback).await?;
        txn.commit().await?;

        info!(signal_id = signal.id, revision, "Closed signal");
        Ok((signal, outcome))
    }

    /// Delete a signal and its deal. Returns the number of deals removed.
    pub async fn delete(&self, id: i32) -> Result<u64> {
        let txn = self.db.begin().await?;
        let removed_deals = deal_sync::remove_for_signal(&txn, id).await?;
        let removed = signal_repository::delete(&txn, id).await?;
        if removed == 0 {
            txn.rollback().await?;
            return Err(SyncError::not_found("signal", id));
        }
        txn.commit().await?;

        info!(signal_id = id, removed_deals, "Deleted signal");
        Ok(removed_deals)
    }

    /// Store freshly fetched prices on the signal: `cmp`, `chan`, the 7- and
    /// 30-session closes with their % changes, and the recomputed `pl`.
    pub async fn refresh_market_fields(
        &self,
        id: i32,
        snapshot: MarketSnapshot,
    ) -> Result<(admin_trade_signals::Model, SyncOutcome)> {
        let txn = self.db.begin().await?;
        let existing = signal_repository::find_for_update(&txn, id)
            .await?
            .ok_or_else(|| SyncError::not_found("signal", id))?;

        let cmp = snapshot.cmp;
        let side = PositionSide::from_pos(existing.pos);
        let chan = existing.ep.and_then(|ep| percent_change(ep, cmp)).map(format_percent);
        let pl = match (existing.ep, existing.qty) {
            (Some(ep), Some(qty)) => Some(DealMetrics::compute(ep, cmp, qty, side, existing.tp).pnl),
            _ => existing.pl,
        };
        let history = |past: Option<Decimal>| {
            let price = past.map(|p| p.round_dp(2).to_string());
            let change = past.and_then(|p| percent_change(p, cmp)).map(format_percent);
            (price, change)
        };
        let (seven, ch) = history(snapshot.seven_day);
        let (thirty, dh) = history(snapshot.thirty_day);

        let revision = existing.revision + 1;
        let mut active: admin_trade_signals::ActiveModel = existing.into();
        active.cmp = ActiveValue::Set(Some(cmp));
        active.chan = ActiveValue::Set(chan);
        active.pl = ActiveValue::Set(pl);
        active.seven = ActiveValue::Set(seven);
        active.ch = ActiveValue::Set(ch);
        active.thirty = ActiveValue::Set(thirty);
        active.dh = ActiveValue::Set(dh);
        active.revision = ActiveValue::Set(revision);
        active.updated_at = ActiveValue::Set(Some(Utc::now()));

        let signal = signal_repository::update(&txn, active).await?;
        let outcome = deal_sync::sync_signal(&txn, &signal, None).await?;
        txn.commit().await?;

        Ok((signal, outcome))
    }
}

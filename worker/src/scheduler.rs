//! Periodic jobs: CMP refresh during market hours and deal reconciliation.
//!
//! Every tick takes a fleet-wide lease on the current interval slot first, so
//! each job runs once per interval however many workers are up.

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Datelike, NaiveTime, Utc, Weekday};
use chrono_tz::Tz;
use shared::services::{deal_sync, price_refresh};
use shared::JobLock;
use tokio::time::MissedTickBehavior;

use crate::state::AppState;

const MARKET_OPEN: (u32, u32) = (9, 15);
const MARKET_CLOSE: (u32, u32) = (15, 30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Job {
    RefreshPrices,
    Reconcile,
}

impl Job {
    pub fn name(&self) -> &'static str {
        match self {
            Job::RefreshPrices => "price-refresh",
            Job::Reconcile => "reconcile",
        }
    }
}

/// Whether `now` falls in the cash session (Mon-Fri 09:15-15:30) of `tz`.
pub fn is_market_open(now: DateTime<Utc>, tz: Tz) -> bool {
    let local = now.with_timezone(&tz);
    if matches!(local.weekday(), Weekday::Sat | Weekday::Sun) {
        return false;
    }

    let time = local.time();
    let open = NaiveTime::from_hms_opt(MARKET_OPEN.0, MARKET_OPEN.1, 0);
    let close = NaiveTime::from_hms_opt(MARKET_CLOSE.0, MARKET_CLOSE.1, 0);
    match (open, close) {
        (Some(open), Some(close)) => time >= open && time <= close,
        _ => false,
    }
}

/// Lease name for `job` in the interval slot containing `now`. Every worker
/// computes the same name for the same slot, whatever the phase of its timer.
pub fn lease_name(job: Job, interval: Duration, now: DateTime<Utc>) -> String {
    let slot_secs = interval.as_secs().max(1) as i64;
    format!("{}:{}", job.name(), now.timestamp().div_euclid(slot_secs))
}

/// Run `task` at most once per `interval` across every worker sharing `lock`.
///
/// The lease for the current slot is never released; it expires with the
/// slot. Returns `false` when the slot was already taken or the lock could not
/// be reached.
pub async fn with_lease<F, Fut>(lock: &dyn JobLock, job: Job, interval: Duration, now: DateTime<Utc>, task: F) -> bool
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = ()>,
{
    let name = lease_name(job, interval, now);
    match lock.try_acquire(&name, interval).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            tracing::info!(job = job.name(), lease = %name, "Job already ran in this interval, skipping tick");
            return false;
        }
        Err(e) => {
            tracing::error!(job = job.name(), error = %e, "Could not acquire job lock");
            return false;
        }
    }

    task().await;
    true
}

async fn tick(state: &AppState, job: Job) {
    match job {
        Job::RefreshPrices => {
            if state.config.market_hours_only && !is_market_open(Utc::now(), state.config.market_timezone) {
                tracing::debug!("Market closed, skipping price refresh");
                return;
            }

            let interval = state.config.price_refresh_interval;
            with_lease(state.lock.as_ref(), job, interval, Utc::now(), || async move {
                if let Err(e) = price_refresh::refresh_open_signals(
                    &state.signals,
                    &state.prices,
                    state.config.price_request_delay,
                )
                .await
                {
                    tracing::error!(error = %e, "Price refresh failed");
                }
            })
            .await;
        }
        Job::Reconcile => {
            let interval = state.config.reconcile_interval;
            with_lease(state.lock.as_ref(), job, interval, Utc::now(), || async move {
                if let Err(e) = deal_sync::reconcile(state.db.as_ref(), &state.prices).await {
                    tracing::error!(error = %e, "Reconciliation failed");
                }
            })
            .await;
        }
    }
}

/// Drive both jobs until Ctrl-C.
pub async fn run(state: AppState) -> anyhow::Result<()> {
    let mut refresh = tokio::time::interval(state.config.price_refresh_interval);
    refresh.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut reconcile = tokio::time::interval(state.config.reconcile_interval);
    reconcile.set_missed_tick_behavior(MissedTickBehavior::Skip);

    tracing::info!(
        refresh_every = ?state.config.price_refresh_interval,
        reconcile_every = ?state.config.reconcile_interval,
        market_hours_only = state.config.market_hours_only,
        "Scheduler started"
    );

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = refresh.tick() => tick(&state, Job::RefreshPrices).await,
            _ = reconcile.tick() => tick(&state, Job::Reconcile).await,
            res = &mut shutdown => {
                if let Err(e) = res {
                    tracing::error!(error = %e, "Failed to listen for Ctrl-C");
                }
                break;
            }
        }
    }

    tracing::info!("Scheduler stopped");
    Ok(())
}

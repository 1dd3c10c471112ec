//! Periodic CMP refresh for open signals.

use std::time::Duration;

use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::error::Result;
use crate::models::MarketSnapshot;
use crate::prices::PriceLookup;
use crate::services::signal_service::SignalService;
use crate::symbol::Symbol;

/// Sessions back for the short and long history columns.
pub const SEVEN_DAY_OFFSET: u64 = 7;
pub const THIRTY_DAY_OFFSET: u64 = 30;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RefreshReport {
    pub checked: usize,
    pub updated: usize,
    pub unavailable: usize,
    pub failed: usize,
}

/// Look up prices for every open signal and write them through
/// `signals`. A failure on one symbol is logged and does not stop the run;
/// only listing the signals can fail the whole refresh.
pub async fn refresh_open_signals(
    signals: &SignalService,
    prices: &dyn PriceLookup,
    delay: Duration,
) -> Result<RefreshReport> {
    let open = signals.list(true).await?;
    let mut report = RefreshReport::default();

    for (index, signal) in open.iter().enumerate() {
        if index > 0 && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        report.checked += 1;

        let symbol = match Symbol::parse(&signal.symbol) {
            Ok(symbol) => symbol,
            Err(e) => {
                warn!(signal_id = signal.id, error = %e, "Skipping signal with invalid symbol");
                report.failed += 1;
                continue;
            }
        };

        match snapshot_for(prices, &symbol).await {
            Ok(Some(snapshot)) => match signals.refresh_market_fields(signal.id, snapshot).await {
                Ok(_) => {
                    debug!(signal_id = signal.id, %symbol, cmp = %snapshot.cmp, "Refreshed signal");
                    report.updated += 1;
                }
                Err(e) => {
                    error!(signal_id = signal.id, %symbol, error = %e, "Failed to store refreshed prices");
                    report.failed += 1;
                }
            },
            Ok(None) => {
                debug!(signal_id = signal.id, %symbol, "No price available");
                report.unavailable += 1;
            }
            Err(e) => {
                error!(signal_id = signal.id, %symbol, error = %e, "Price lookup failed");
                report.failed += 1;
            }
        }
    }

    info!(
        checked = report.checked,
        updated = report.updated,
        unavailable = report.unavailable,
        failed = report.failed,
        "Price refresh finished"
    );
    Ok(report)
}

async fn snapshot_for(prices: &dyn PriceLookup, symbol: &Symbol) -> Result<Option<MarketSnapshot>> {
    let Some(cmp) = prices.live_cmp(symbol).await? else {
        return Ok(None);
    };

    Ok(Some(MarketSnapshot {
        cmp,
        seven_day: prices.get_offset_price(symbol, SEVEN_DAY_OFFSET).await?,
        thirty_day: prices.get_offset_price(symbol, THIRTY_DAY_OFFSET).await?,
    }))
}

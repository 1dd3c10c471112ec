mod common;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use shared::prices::{PriceBar, Timeframe};
use shared::pricing::parse_numeric;
use shared::services::deal_sync;
use shared::services::price_refresh::refresh_open_signals;
use shared::services::SignalService;
use shared::{MarketPrices, PriceLookup, PriceStore, QuoteSource, Symbol, SyncError};

use common::{setup_db, signal_input};

fn sym(raw: &str) -> Symbol {
    Symbol::parse(raw).unwrap()
}

/// One daily bar per close, oldest first.
fn daily_series(symbol: &str, closes: &[Decimal]) -> Vec<PriceBar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, close)| {
            let ts = Utc.with_ymd_and_hms(2026, 1, 1, 10, 0, 0).unwrap() + chrono::Duration::days(i as i64);
            PriceBar::flat(sym(symbol), Timeframe::Daily, ts, *close)
        })
        .collect()
}

#[tokio::test]
async fn test_price_store_lookups() {
    let db = setup_db().await;
    let store = PriceStore::new(db.clone());

    let closes: Vec<Decimal> = (0..40).map(|i| Decimal::from(100 + i)).collect();
    store.record_bars(&daily_series("NIFTYBEES", &closes)).await.unwrap();
    store
        .record_bars(&[
            PriceBar::flat(sym("NIFTYBEES"), Timeframe::FiveMinute, Utc.with_ymd_and_hms(2026, 2, 10, 9, 15, 0).unwrap(), dec!(150.10)),
            PriceBar::flat(sym("NIFTYBEES"), Timeframe::FiveMinute, Utc.with_ymd_and_hms(2026, 2, 10, 9, 20, 0).unwrap(), dec!(150.55)),
        ])
        .await
        .unwrap();

    assert_eq!(store.get_cmp(&sym("NIFTYBEES")).await.unwrap(), Some(dec!(150.55)));
    assert_eq!(store.get_offset_price(&sym("NIFTYBEES"), 0).await.unwrap(), Some(dec!(139)));
    assert_eq!(store.get_offset_price(&sym("NIFTYBEES"), 7).await.unwrap(), Some(dec!(132)));
    assert_eq!(store.get_offset_price(&sym("NIFTYBEES"), 30).await.unwrap(), Some(dec!(109)));
    assert_eq!(store.get_offset_price(&sym("NIFTYBEES"), 40).await.unwrap(), None);
}

#[tokio::test]
async fn test_missing_symbol_is_none_not_error() {
    let db = setup_db().await;
    let store = PriceStore::new(db.clone());

    assert_eq!(store.get_cmp(&sym("UNKNOWN")).await.unwrap(), None);
    assert_eq!(store.get_offset_price(&sym("UNKNOWN"), 7).await.unwrap(), None);
}

#[tokio::test]
async fn test_record_bars_overwrites_same_slot() {
    let db = setup_db().await;
    let store = PriceStore::new(db.clone());
    let ts = Utc.with_ymd_and_hms(2026, 2, 10, 9, 15, 0).unwrap();

    store.record_bars(&[PriceBar::flat(sym("TEST"), Timeframe::FiveMinute, ts, dec!(10))]).await.unwrap();
    store.record_bars(&[PriceBar::flat(sym("TEST"), Timeframe::FiveMinute, ts, dec!(11))]).await.unwrap();

    assert_eq!(store.get_cmp(&sym("TEST")).await.unwrap(), Some(dec!(11)));
    assert_eq!(store.record_bars(&[]).await.unwrap(), 0);
}

struct FixedQuote(Option<Decimal>);

#[async_trait]
impl QuoteSource for FixedQuote {
    fn name(&self) -> &'static str {
        "fixed"
    }

    async fn latest_price(&self, _symbol: &Symbol) -> shared::Result<Option<Decimal>> {
        Ok(self.0)
    }
}

struct BrokenQuote;

#[async_trait]
impl QuoteSource for BrokenQuote {
    fn name(&self) -> &'static str {
        "broken"
    }

    async fn latest_price(&self, symbol: &Symbol) -> shared::Result<Option<Decimal>> {
        Err(SyncError::InvalidInput(format!("no route to quotes for {}", symbol)))
    }
}

#[tokio::test]
async fn test_market_prices_falls_back_to_remote_and_persists() {
    let db = setup_db().await;
    let store = PriceStore::new(db.clone());
    let prices = MarketPrices::new(store.clone(), Some(Arc::new(FixedQuote(Some(dec!(42.5))))));

    assert_eq!(prices.get_cmp(&sym("TEST")).await.unwrap(), Some(dec!(42.5)));
    // persisted as a 5m bar, so the store now answers on its own
    assert_eq!(store.get_cmp(&sym("TEST")).await.unwrap(), Some(dec!(42.5)));
}

#[tokio::test]
async fn test_market_prices_remote_failure_is_unavailable() {
    let db = setup_db().await;
    let prices = MarketPrices::new(PriceStore::new(db.clone()), Some(Arc::new(BrokenQuote)));

    assert_eq!(prices.get_cmp(&sym("TEST")).await.unwrap(), None);
    assert_eq!(prices.live_cmp(&sym("TEST")).await.unwrap(), None);
}

#[tokio::test]
async fn test_refresh_updates_open_signals_and_deals() {
    let db = setup_db().await;
    let store = PriceStore::new(db.clone());
    let signals = SignalService::new(db.clone());

    let closes: Vec<Decimal> = (0..40).map(|i| Decimal::from(100 + i)).collect();
    store.record_bars(&daily_series("NIFTYBEES", &closes)).await.unwrap();
    store
        .record_bars(&[PriceBar::flat(
            sym("NIFTYBEES"),
            Timeframe::FiveMinute,
            Utc.with_ymd_and_hms(2026, 2, 10, 9, 15, 0).unwrap(),
            dec!(145.20),
        )])
        .await
        .unwrap();

    let (open, _) = signals
        .create(signal_input("NIFTYBEES", dec!(10), dec!(132), None))
        .await
        .unwrap();
    let (no_prices, _) = signals
        .create(signal_input("GOLDBEES", dec!(10), dec!(60), None))
        .await
        .unwrap();
    let (closed, _) = signals
        .create(signal_input("NIFTYBEES", dec!(10), dec!(100), None))
        .await
        .unwrap();
    signals.close(closed.id).await.unwrap();

    let prices = MarketPrices::new(store.clone(), None);
    let report = refresh_open_signals(&signals, &prices, Duration::ZERO).await.unwrap();
    assert_eq!(report.checked, 2);
    assert_eq!(report.updated, 1);
    assert_eq!(report.unavailable, 1);
    assert_eq!(report.failed, 0);

    let refreshed = signals.get(open.id).await.unwrap();
    assert_eq!(refreshed.cmp, Some(dec!(145.20)));
    assert_eq!(refreshed.chan.as_deref(), Some("10.00%"));
    assert_eq!(refreshed.seven.as_deref().and_then(parse_numeric), Some(dec!(132)));
    assert_eq!(refreshed.ch.as_deref(), Some("10.00%"));
    assert_eq!(refreshed.thirty.as_deref().and_then(parse_numeric), Some(dec!(109)));
    assert_eq!(refreshed.dh.as_deref(), Some("33.21%"));
    assert_eq!(refreshed.pl, Some(dec!(132.00)));

    let deal = deal_sync::deal_for_signal(db.as_ref(), open.id).await.unwrap().unwrap();
    assert_eq!(deal.current_price, dec!(145.20));
    assert_eq!(deal.pnl, dec!(132.00));
    assert_eq!(deal.seven_day_price, Some(dec!(132)));
    assert_eq!(deal.thirty_day_change, Some(dec!(33.21)));

    let untouched = signals.get(no_prices.id).await.unwrap();
    assert_eq!(untouched.cmp, None);
    assert_eq!(untouched.revision, 1);
}

//! Price lookups over the `symbol_prices` table with an optional remote quote
//! source.
//!
//! "No price" is always `Ok(None)`. `Err` is reserved for failures that
//! deserve attention (database down, malformed query).

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, DurationRound, Utc};
use rust_decimal::Decimal;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveValue, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::entity::symbol_prices;
use crate::error::Result;
use crate::symbol::Symbol;

/// Bar granularity stored in `symbol_prices.timeframe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timeframe {
    FiveMinute,
    Daily,
}

impl Timeframe {
    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::FiveMinute => "5m",
            Timeframe::Daily => "1d",
        }
    }
}

#[derive(Debug, Clone)]
pub struct PriceBar {
    pub symbol: Symbol,
    pub timeframe: Timeframe,
    pub ts: DateTime<Utc>,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Option<Decimal>,
}

impl PriceBar {
    /// A flat bar where open/high/low/close are all `price`.
    pub fn flat(symbol: Symbol, timeframe: Timeframe, ts: DateTime<Utc>, price: Decimal) -> Self {
        Self {
            symbol,
            timeframe,
            ts,
            open: price,
            high: price,
            low: price,
            close: price,
            volume: None,
        }
    }
}

#[async_trait]
pub trait PriceLookup: Send + Sync {
    /// Latest intraday close (current market price).
    async fn get_cmp(&self, symbol: &Symbol) -> Result<Option<Decimal>>;

    /// Daily close `offset` rows before the latest one. This counts stored
    /// sessions, not calendar days, so gaps in the series shift the result.
    async fn get_offset_price(&self, symbol: &Symbol, offset: u64) -> Result<Option<Decimal>>;

    /// Freshest available price, used by the refresh job. Implementations
    /// with a remote source query it before stored bars.
    async fn live_cmp(&self, symbol: &Symbol) -> Result<Option<Decimal>> {
        self.get_cmp(symbol).await
    }
}

/// Reads and writes bars in `symbol_prices`.
#[derive(Clone)]
pub struct PriceStore {
    db: Arc<DatabaseConnection>,
}

impl PriceStore {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    async fn close_at(&self, symbol: &Symbol, timeframe: Timeframe, offset: u64) -> Result<Option<Decimal>> {
        let bar = symbol_prices::Entity::find()
            .filter(symbol_prices::Column::Symbol.eq(symbol.as_str()))
            .filter(symbol_prices::Column::Timeframe.eq(timeframe.as_str()))
            .order_by_desc(symbol_prices::Column::Ts)
            .offset(offset)
            .limit(1)
            .one(self.db.as_ref())
            .await?;

        Ok(bar.map(|b| b.close))
    }

    /// Insert bars, overwriting any existing bar with the same
    /// (symbol, timeframe, ts). Returns the number of rows written.
    pub async fn record_bars(&self, bars: &[PriceBar]) -> Result<u64> {
        if bars.is_empty() {
            return Ok(0);
        }

        let models = bars.iter().map(|bar| symbol_prices::ActiveModel {
            symbol: ActiveValue::Set(bar.symbol.to_string()),
            timeframe: ActiveValue::Set(bar.timeframe.as_str().to_string()),
            ts: ActiveValue::Set(bar.ts),
            open: ActiveValue::Set(bar.open),
            high: ActiveValue::Set(bar.high),
            low: ActiveValue::Set(bar.low),
            close: ActiveValue::Set(bar.close),
            volume: ActiveValue::Set(bar.volume),
            ..Default::default()
        });

        let on_conflict = OnConflict::columns([
            symbol_prices::Column::Symbol,
            symbol_prices::Column::Timeframe,
            symbol_prices::Column::Ts,
        ])
        .update_columns([
            symbol_prices::Column::Open,
            symbol_prices::Column::High,
            symbol_prices::Column::Low,
            symbol_prices::Column::Close,
            symbol_prices::Column::Volume,
        ])
        .to_owned();

        let written = symbol_prices::Entity::insert_many(models)
            .on_conflict(on_conflict)
            .exec_without_returning(self.db.as_ref())
            .await?;

        Ok(written)
    }
}

#[async_trait]
impl PriceLookup for PriceStore {
    async fn get_cmp(&self, symbol: &Symbol) -> Result<Option<Decimal>> {
        self.close_at(symbol, Timeframe::FiveMinute, 0).await
    }

    async fn get_offset_price(&self, symbol: &Symbol, offset: u64) -> Result<Option<Decimal>> {
        self.close_at(symbol, Timeframe::Daily, offset).await
    }
}

/// Remote source of the latest traded price.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    fn name(&self) -> &'static str;

    async fn latest_price(&self, symbol: &Symbol) -> Result<Option<Decimal>>;
}

/// Yahoo Finance chart endpoint client.
#[derive(Debug, Clone)]
pub struct YahooQuoteSource {
    client: reqwest::Client,
    base_url: String,
    symbol_suffix: String,
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    regular_market_price: Option<f64>,
}

impl ChartResponse {
    fn latest_price(&self) -> Option<Decimal> {
        let price = self.chart.result.as_ref()?.first()?.meta.regular_market_price?;
        Decimal::try_from(price).ok().map(|p| p.round_dp(4))
    }
}

impl YahooQuoteSource {
    pub fn new(base_url: impl Into<String>, symbol_suffix: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent("Mozilla/5.0 (compatible; neo-deals/0.1)")
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            symbol_suffix: symbol_suffix.into(),
        })
    }

    fn chart_url(&self, symbol: &Symbol) -> String {
        format!("{}/{}{}", self.base_url, symbol, self.symbol_suffix)
    }
}

#[async_trait]
impl QuoteSource for YahooQuoteSource {
    fn name(&self) -> &'static str {
        "yahoo"
    }

    async fn latest_price(&self, symbol: &Symbol) -> Result<Option<Decimal>> {
        let response = self
            .client
            .get(self.chart_url(symbol))
            .query(&[("interval", "5m"), ("range", "1d")])
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let body: ChartResponse = response.error_for_status()?.json().await?;
        Ok(body.latest_price())
    }
}

/// Stored bars first for reads; remote quotes first for refreshes, with
/// fetched quotes persisted as 5m bars.
#[derive(Clone)]
pub struct MarketPrices {
    store: PriceStore,
    remote: Option<Arc<dyn QuoteSource>>,
}

impl MarketPrices {
    pub fn new(store: PriceStore, remote: Option<Arc<dyn QuoteSource>>) -> Self {
        Self { store, remote }
    }

    async fn fetch_remote(&self, symbol: &Symbol) -> Result<Option<Decimal>> {
        let Some(remote) = &self.remote else {
            return Ok(None);
        };

        match remote.latest_price(symbol).await {
            Ok(Some(price)) => {
                let now = Utc::now();
                let slot = now.duration_trunc(chrono::Duration::minutes(5)).unwrap_or(now);
                self.store
                    .record_bars(&[PriceBar::flat(symbol.clone(), Timeframe::FiveMinute, slot, price)])
                    .await?;
                debug!(%symbol, %price, source = remote.name(), "Stored remote quote");
                Ok(Some(price))
            }
            Ok(None) => Ok(None),
            Err(e) => {
                warn!(%symbol, source = remote.name(), error = %e, "Remote quote unavailable");
                Ok(None)
            }
        }
    }
}

#[async_trait]
impl PriceLookup for MarketPrices {
    async fn get_cmp(&self, symbol: &Symbol) -> Result<Option<Decimal>> {
        match self.store.get_cmp(symbol).await? {
            Some(price) => Ok(Some(price)),
            None => self.fetch_remote(symbol).await,
        }
    }

    async fn get_offset_price(&self, symbol: &Symbol, offset: u64) -> Result<Option<Decimal>> {
        self.store.get_offset_price(symbol, offset).await
    }

    async fn live_cmp(&self, symbol: &Symbol) -> Result<Option<Decimal>> {
        match self.fetch_remote(symbol).await? {
            Some(price) => Ok(Some(price)),
            None => self.store.get_cmp(symbol).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_chart_response_price() {
        let body = r#"{"chart":{"result":[{"meta":{"currency":"INR","symbol":"NIFTYBEES.NS","regularMarketPrice":271.35}}],"error":null}}"#;
        let parsed: ChartResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.latest_price(), Some(dec!(271.35)));
    }

    #[test]
    fn test_chart_response_without_result() {
        let body = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found"}}}"#;
        let parsed: ChartResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.latest_price(), None);

        let empty = r#"{"chart":{"result":[{"meta":{}}],"error":null}}"#;
        let parsed: ChartResponse = serde_json::from_str(empty).unwrap();
        assert_eq!(parsed.latest_price(), None);
    }

    #[test]
    fn test_chart_url_appends_exchange_suffix() {
        let source = YahooQuoteSource::new(
            "https://query1.finance.yahoo.com/v8/finance/chart/",
            ".NS",
            Duration::from_secs(5),
        )
        .unwrap();
        let symbol = Symbol::parse("goldbees").unwrap();
        assert_eq!(
            source.chart_url(&symbol),
            "https://query1.finance.yahoo.com/v8/finance/chart/GOLDBEES.NS"
        );
    }

    #[test]
    fn test_timeframe_labels() {
        assert_eq!(Timeframe::FiveMinute.as_str(), "5m");
        assert_eq!(Timeframe::Daily.as_str(), "1d");
    }
}

use std::collections::HashMap;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use shared::entity::{admin_trade_signals, user_deals};
use shared::models::{CreateUserDealRequest, DealView, PriceSnapshotView, SignalInput, SignalView};
use shared::services::price_refresh::{SEVEN_DAY_OFFSET, THIRTY_DAY_OFFSET};
use shared::services::{deal_sync, ReconcileReport, SyncOutcome};
use shared::{MarketPrices, PriceLookup, Symbol, SyncError};

use crate::error::ApiResult;
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

fn ok<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse { success: true, data })
}

#[derive(Debug, Serialize)]
pub struct SignalWrite {
    pub signal: admin_trade_signals::Model,
    pub deal_sync: SyncOutcome,
}

#[derive(Debug, Serialize)]
pub struct SignalDeleted {
    pub id: i32,
    pub deals_removed: u64,
}

#[derive(Debug, Deserialize)]
pub struct ListSignalsQuery {
    pub open_only: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct UserDealsQuery {
    pub user_id: String,
}

/// CMP per symbol for one request, so a symbol shared by several rows is
/// looked up once. Rows with an unparseable symbol get no price.
#[derive(Default)]
struct CmpCache(HashMap<String, Option<Decimal>>);

impl CmpCache {
    async fn get(&mut self, prices: &MarketPrices, raw: &str) -> shared::Result<Option<Decimal>> {
        if let Some(hit) = self.0.get(raw) {
            return Ok(*hit);
        }
        let cmp = match Symbol::parse(raw) {
            Ok(symbol) => prices.get_cmp(&symbol).await?,
            Err(_) => None,
        };
        self.0.insert(raw.to_string(), cmp);
        Ok(cmp)
    }
}

pub async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn list_signals(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ListSignalsQuery>,
) -> ApiResult<Json<ApiResponse<Vec<admin_trade_signals::Model>>>> {
    let signals = state.signals.list(query.open_only.unwrap_or(false)).await?;
    Ok(ok(signals))
}

pub async fn create_signal(
    State(state): State<AppState>,
    AppJson(input): AppJson<SignalInput>,
) -> ApiResult<(StatusCode, Json<ApiResponse<SignalWrite>>)> {
    let (signal, deal_sync) = state.signals.create(input).await?;
    Ok((StatusCode::CREATED, ok(SignalWrite { signal, deal_sync })))
}

pub async fn update_signal(
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
    AppJson(input): AppJson<SignalInput>,
) -> ApiResult<Json<ApiResponse<SignalWrite>>> {
    let (signal, deal_sync) = state.signals.update(id, input).await?;
    Ok(ok(SignalWrite { signal, deal_sync }))
}

pub async fn close_signal(
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
) -> ApiResult<Json<ApiResponse<SignalWrite>>> {
    let (signal, deal_sync) = state.signals.close(id).await?;
    Ok(ok(SignalWrite { signal, deal_sync }))
}

pub async fn delete_signal(
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
) -> ApiResult<Json<ApiResponse<SignalDeleted>>> {
    let deals_removed = state.signals.delete(id).await?;
    Ok(ok(SignalDeleted { id, deals_removed }))
}

/// All signals with P&L and % change computed against the latest known price.
pub async fn etf_signals_data(State(state): State<AppState>) -> ApiResult<Json<ApiResponse<Vec<SignalView>>>> {
    let signals = state.signals.list(false).await?;
    let mut cache = CmpCache::default();

    let mut views = Vec::with_capacity(signals.len());
    for signal in signals {
        let cmp = cache.get(&state.prices, &signal.symbol).await?;
        views.push(SignalView::new(signal, cmp));
    }
    Ok(ok(views))
}

/// Projected deals. Price-dependent columns are recomputed on read; the
/// stored row is left alone.
pub async fn default_deals_data(State(state): State<AppState>) -> ApiResult<Json<ApiResponse<Vec<DealView>>>> {
    let deals = deal_sync::list_deals(state.db.as_ref()).await?;
    let mut cache = CmpCache::default();

    let mut views = Vec::with_capacity(deals.len());
    for deal in deals {
        let cmp = cache.get(&state.prices, &deal.symbol).await?;
        views.push(DealView::new(deal, cmp));
    }
    Ok(ok(views))
}

pub async fn sync_deals(State(state): State<AppState>) -> ApiResult<Json<ApiResponse<ReconcileReport>>> {
    let report = deal_sync::reconcile(state.db.as_ref(), &state.prices).await?;
    Ok(ok(report))
}

pub async fn create_user_deal(
    State(state): State<AppState>,
    AppJson(request): AppJson<CreateUserDealRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<user_deals::Model>>)> {
    let deal = state.user_deals.create_from_signal(request).await?;
    Ok((StatusCode::CREATED, ok(deal)))
}

pub async fn list_user_deals(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<UserDealsQuery>,
) -> ApiResult<Json<ApiResponse<Vec<user_deals::Model>>>> {
    let user_id = query.user_id.trim();
    if user_id.is_empty() {
        return Err(SyncError::InvalidInput("user_id is required".to_string()).into());
    }
    let deals = state.user_deals.list_for_user(user_id).await?;
    Ok(ok(deals))
}

pub async fn close_user_deal(
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
) -> ApiResult<Json<ApiResponse<user_deals::Model>>> {
    let deal = state.user_deals.close(id).await?;
    Ok(ok(deal))
}

pub async fn delete_user_deal(
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
) -> ApiResult<Json<ApiResponse<Value>>> {
    state.user_deals.delete(id).await?;
    Ok(ok(json!({ "id": id })))
}

pub async fn price_snapshot(
    State(state): State<AppState>,
    AppPath(raw): AppPath<String>,
) -> ApiResult<Json<ApiResponse<PriceSnapshotView>>> {
    let symbol = Symbol::parse(&raw)?;
    let cmp = state.prices.get_cmp(&symbol).await?;
    let seven_day = state.prices.get_offset_price(&symbol, SEVEN_DAY_OFFSET).await?;
    let thirty_day = state.prices.get_offset_price(&symbol, THIRTY_DAY_OFFSET).await?;

    Ok(ok(PriceSnapshotView {
        symbol: symbol.into(),
        cmp,
        seven_day,
        thirty_day,
    }))
}

//! HTTP surface of the signal dashboard.

use std::sync::Arc;

use axum::routing::{get, post, put};
use axum::Router;
use sea_orm::DatabaseConnection;
use shared::services::{SignalService, UserDealService};
use shared::MarketPrices;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod error;
pub mod extract;
pub mod routes;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub signals: SignalService,
    pub user_deals: Arc<UserDealService>,
    pub prices: MarketPrices,
}

impl AppState {
    pub fn new(db: Arc<DatabaseConnection>, prices: MarketPrices) -> Self {
        Self {
            signals: SignalService::new(db.clone()).with_prices(Arc::new(prices.clone())),
            user_deals: Arc::new(UserDealService::new(db.clone())),
            db,
            prices,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health_check))
        .route("/api/signals", get(routes::list_signals).post(routes::create_signal))
        .route("/api/signals/:id", put(routes::update_signal).delete(routes::delete_signal))
        .route("/api/signals/:id/close", post(routes::close_signal))
        .route("/api/etf-signals-data", get(routes::etf_signals_data))
        .route("/api/default-deals-data", get(routes::default_deals_data))
        .route("/api/sync", post(routes::sync_deals))
        .route("/api/deals/create-from-signal", post(routes::create_user_deal))
        .route("/api/user-deals", get(routes::list_user_deals))
        .route("/api/user-deals/:id", axum::routing::delete(routes::delete_user_deal))
        .route("/api/user-deals/:id/close", post(routes::close_user_deal))
        .route("/api/prices/:symbol", get(routes::price_snapshot))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

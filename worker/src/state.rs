use std::sync::Arc;

use sea_orm::DatabaseConnection;
use shared::services::SignalService;
use shared::{
    get_db_connection, get_redis_client, Config, JobLock, LocalJobLock, MarketPrices, PriceStore, QuoteSource,
    RedisJobLock, YahooQuoteSource,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub db: Arc<DatabaseConnection>,
    pub signals: SignalService,
    pub prices: MarketPrices,
    pub lock: Arc<dyn JobLock>,
}

impl AppState {
    pub async fn new(config: Config) -> Result<Self, anyhow::Error> {
        let db = Arc::new(get_db_connection(&config).await?);
        tracing::info!("Connected to database successfully");

        let remote: Option<Arc<dyn QuoteSource>> = if config.quote_source_enabled {
            let source = YahooQuoteSource::new(
                config.quote_base_url.clone(),
                config.quote_symbol_suffix.clone(),
                config.quote_timeout,
            )?;
            tracing::info!(base_url = %config.quote_base_url, "Remote quote source enabled");
            Some(Arc::new(source))
        } else {
            None
        };

        let lock: Arc<dyn JobLock> = match &config.redis_url {
            Some(url) => Arc::new(RedisJobLock::new(get_redis_client(url)?)),
            None => {
                tracing::warn!("REDIS_URL not set, job lock only covers this process");
                Arc::new(LocalJobLock::new())
            }
        };

        let prices = MarketPrices::new(PriceStore::new(db.clone()), remote);

        Ok(AppState {
            signals: SignalService::new(db.clone()).with_prices(Arc::new(prices.clone())),
            prices,
            config,
            db,
            lock,
        })
    }
}

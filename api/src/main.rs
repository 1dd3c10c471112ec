use std::sync::Arc;

use anyhow::Result;
use api::{router, AppState};
use migration::{Migrator, MigratorTrait};
use shared::telemetry::init_tracing;
use shared::{get_db_connection, Config, MarketPrices, PriceStore, QuoteSource, YahooQuoteSource};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;
    init_tracing(config.log_format);

    info!("Starting signal dashboard API server...");

    let db = Arc::new(get_db_connection(&config).await?);
    info!("Connected to database");

    if config.auto_migrate {
        Migrator::up(db.as_ref(), None).await?;
        info!("Migrations applied");
    }

    let remote: Option<Arc<dyn QuoteSource>> = if config.quote_source_enabled {
        Some(Arc::new(YahooQuoteSource::new(
            config.quote_base_url.clone(),
            config.quote_symbol_suffix.clone(),
            config.quote_timeout,
        )?))
    } else {
        None
    };
    let prices = MarketPrices::new(PriceStore::new(db.clone()), remote);

    let app = router(AppState::new(db, prices));

    let listener = tokio::net::TcpListener::bind(&config.api_bind_addr).await?;
    info!("API server listening on http://{}", config.api_bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

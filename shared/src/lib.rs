pub mod config;
pub mod database;
pub mod entity;
pub mod error;
pub mod lock;
pub mod models;
pub mod prices;
pub mod pricing;
pub mod redis;
pub mod repositories;
pub mod services;
pub mod symbol;
pub mod telemetry;

pub use config::Config;
pub use database::get_db_connection;
pub use error::{Result, SyncError};
pub use lock::{JobLock, LocalJobLock, LockToken};
pub use prices::{MarketPrices, PriceLookup, PriceStore, QuoteSource, YahooQuoteSource};
pub use crate::redis::{get_redis_client, Redis, RedisJobLock};
pub use symbol::Symbol;

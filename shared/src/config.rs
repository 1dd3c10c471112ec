use std::str::FromStr;
use std::time::Duration;

use chrono_tz::Tz;
use dotenv::dotenv;

use crate::error::{Result, SyncError};

pub const DEFAULT_QUOTE_BASE_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_connect_timeout: Duration,
    pub redis_url: Option<String>,
    pub api_bind_addr: String,
    pub auto_migrate: bool,
    pub price_refresh_interval: Duration,
    pub reconcile_interval: Duration,
    pub price_request_delay: Duration,
    pub quote_source_enabled: bool,
    pub quote_base_url: String,
    pub quote_symbol_suffix: String,
    pub quote_timeout: Duration,
    pub market_timezone: Tz,
    pub market_hours_only: bool,
    pub log_format: LogFormat,
}

fn var(key: &str) -> Option<String> {
    std::env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn parse_var<T: FromStr>(key: &str, default: T) -> Result<T> {
    match var(key) {
        Some(raw) => raw
            .parse()
            .map_err(|_| SyncError::Config(format!("{} has an invalid value: {:?}", key, raw))),
        None => Ok(default),
    }
}

fn secs(key: &str, default: u64) -> Result<Duration> {
    parse_var(key, default).map(Duration::from_secs)
}

impl Config {
    /// Load `.env` (if present) and read settings from the environment.
    /// `DATABASE_URL` has no default; credentials never live in source.
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let database_url = var("DATABASE_URL").ok_or_else(|| SyncError::Config("DATABASE_URL is not set".to_string()))?;

        let market_timezone = match var("MARKET_TIMEZONE") {
            Some(name) => name
                .parse::<Tz>()
                .map_err(|_| SyncError::Config(format!("MARKET_TIMEZONE is not a known zone: {:?}", name)))?,
            None => chrono_tz::Asia::Kolkata,
        };

        let log_format = match var("LOG_FORMAT").as_deref() {
            None | Some("text") => LogFormat::Text,
            Some("json") => LogFormat::Json,
            Some(other) => return Err(SyncError::Config(format!("LOG_FORMAT must be text or json, got {:?}", other))),
        };

        Ok(Config {
            database_url,
            db_max_connections: parse_var("DB_MAX_CONNECTIONS", 10)?,
            db_connect_timeout: secs("DB_CONNECT_TIMEOUT_SECS", 5)?,
            redis_url: var("REDIS_URL"),
            api_bind_addr: var("API_BIND_ADDR").unwrap_or_else(|| "0.0.0.0:9999".to_string()),
            auto_migrate: parse_var("AUTO_MIGRATE", false)?,
            price_refresh_interval: secs("PRICE_REFRESH_INTERVAL_SECS", 300)?,
            reconcile_interval: secs("RECONCILE_INTERVAL_SECS", 900)?,
            price_request_delay: parse_var("PRICE_REQUEST_DELAY_MS", 300).map(Duration::from_millis)?,
            quote_source_enabled: parse_var("QUOTE_SOURCE_ENABLED", false)?,
            quote_base_url: var("QUOTE_SOURCE_BASE_URL").unwrap_or_else(|| DEFAULT_QUOTE_BASE_URL.to_string()),
            quote_symbol_suffix: var("QUOTE_SYMBOL_SUFFIX").unwrap_or_else(|| ".NS".to_string()),
            quote_timeout: secs("QUOTE_TIMEOUT_SECS", 5)?,
            market_timezone,
            market_hours_only: parse_var("MARKET_HOURS_ONLY", true)?,
            log_format,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_var_reports_malformed_values() {
        std::env::set_var("NEO_DEALS_TEST_BAD_NUMBER", "ten");
        let err = parse_var::<u32>("NEO_DEALS_TEST_BAD_NUMBER", 1).unwrap_err();
        assert!(err.to_string().contains("NEO_DEALS_TEST_BAD_NUMBER"));
        std::env::remove_var("NEO_DEALS_TEST_BAD_NUMBER");
    }

    #[test]
    fn test_parse_var_defaults_when_unset_or_blank() {
        assert_eq!(parse_var::<u32>("NEO_DEALS_TEST_UNSET", 7).unwrap(), 7);
        std::env::set_var("NEO_DEALS_TEST_BLANK", "   ");
        assert!(parse_var::<bool>("NEO_DEALS_TEST_BLANK", true).unwrap());
        std::env::remove_var("NEO_DEALS_TEST_BLANK");
    }
}

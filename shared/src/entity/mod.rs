pub mod admin_trade_signals;
pub mod default_deals;
pub mod symbol_prices;
pub mod user_deals;

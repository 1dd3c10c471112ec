pub mod deal_sync;
pub mod price_refresh;
pub mod signal_service;
pub mod user_deal_service;

pub use deal_sync::{ReconcileReport, SyncOutcome};
pub use price_refresh::RefreshReport;
pub use signal_service::SignalService;
pub use user_deal_service::UserDealService;

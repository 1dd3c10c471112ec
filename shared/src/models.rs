use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::entity::{admin_trade_signals, default_deals};
use crate::pricing::{format_percent, DealMetrics, PositionSide};

/// Admin-supplied signal fields for create and full update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignalInput {
    pub symbol: String,
    pub etf: Option<String>,
    pub pos: Option<i32>,
    pub qty: Option<Decimal>,
    pub ep: Option<Decimal>,
    pub cmp: Option<Decimal>,
    pub chan: Option<String>,
    pub inv: Option<Decimal>,
    pub tp: Option<Decimal>,
    pub tva: Option<Decimal>,
    pub tpr: Option<Decimal>,
    pub pl: Option<Decimal>,
    pub date: Option<NaiveDate>,
    pub pr: Option<String>,
    pub pp: Option<String>,
    pub iv: Option<String>,
    pub ip: Option<String>,
    pub nt: Option<String>,
    pub qt: Option<String>,
    pub seven: Option<String>,
    pub ch: Option<String>,
    pub thirty: Option<String>,
    pub dh: Option<String>,
}

/// Prices gathered by the refresh job for one signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub cmp: Decimal,
    pub seven_day: Option<Decimal>,
    pub thirty_day: Option<Decimal>,
}

/// Signal row with derived fields computed against the freshest price.
#[derive(Debug, Clone, Serialize)]
pub struct SignalView {
    #[serde(flatten)]
    pub signal: admin_trade_signals::Model,
    pub position_type: PositionSide,
    pub live_cmp: Option<Decimal>,
    pub change_percent: Option<String>,
    pub metrics: Option<DealMetrics>,
}

impl SignalView {
    pub fn new(signal: admin_trade_signals::Model, live_cmp: Option<Decimal>) -> Self {
        let side = PositionSide::from_pos(signal.pos);
        let price = live_cmp.or(signal.cmp);
        let metrics = match (signal.ep, signal.qty, price) {
            (Some(ep), Some(qty), Some(cmp)) => Some(DealMetrics::compute(ep, cmp, qty, side, signal.tp)),
            _ => None,
        };
        let change_percent = metrics.as_ref().map(|m| format_percent(m.change_percent));

        Self {
            signal,
            position_type: side,
            live_cmp,
            change_percent,
            metrics,
        }
    }
}

/// Projected deal, with price-dependent fields recomputed when a fresher
/// price than the stored one is known.
#[derive(Debug, Clone, Serialize)]
pub struct DealView {
    #[serde(flatten)]
    pub deal: default_deals::Model,
    pub live: bool,
}

impl DealView {
    /// Closed deals keep the values stored when they were closed.
    pub fn new(mut deal: default_deals::Model, live_cmp: Option<Decimal>) -> Self {
        let side = PositionSide::from_pos(deal.pos);
        let Some(cmp) = live_cmp.filter(|_| side != PositionSide::Closed) else {
            return Self { deal, live: false };
        };

        let metrics = DealMetrics::compute(deal.entry_price, cmp, deal.qty, side, Some(deal.target_price));
        deal.current_price = cmp;
        deal.current_value = metrics.current_value;
        deal.pnl = metrics.pnl;
        deal.profit_ratio = metrics.profit_ratio;
        deal.price_change_percent = metrics.change_percent;
        deal.target_value = metrics.target_value;
        deal.target_pnl_ratio = metrics.target_pnl_ratio;

        Self { deal, live: true }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserDealRequest {
    pub user_id: String,
    pub signal_id: i32,
    pub qty: Option<Decimal>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PriceSnapshotView {
    pub symbol: String,
    pub cmp: Option<Decimal>,
    pub seven_day: Option<Decimal>,
    pub thirty_day: Option<Decimal>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_signal() -> admin_trade_signals::Model {
        admin_trade_signals::Model {
            id: 7,
            symbol: "NIFTYBEES".to_string(),
            etf: Some("Nifty BeES".to_string()),
            pos: 1,
            qty: Some(dec!(100)),
            ep: Some(dec!(50)),
            cmp: Some(dec!(52)),
            chan: None,
            inv: None,
            tp: None,
            tva: None,
            tpr: None,
            pl: None,
            date: None,
            pr: None,
            pp: None,
            iv: None,
            ip: None,
            nt: None,
            qt: None,
            seven: None,
            ch: None,
            thirty: None,
            dh: None,
            revision: 1,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_signal_view_prefers_live_price() {
        let view = SignalView::new(sample_signal(), Some(dec!(55)));
        let metrics = view.metrics.unwrap();
        assert_eq!(metrics.current_value, dec!(5500.00));
        assert_eq!(view.change_percent.as_deref(), Some("10.00%"));
    }

    #[test]
    fn test_signal_view_falls_back_to_stored_cmp() {
        let view = SignalView::new(sample_signal(), None);
        assert_eq!(view.metrics.unwrap().pnl, dec!(200.00));
        assert_eq!(view.position_type, PositionSide::Long);
    }

    #[test]
    fn test_signal_view_without_entry_price_has_no_metrics() {
        let mut signal = sample_signal();
        signal.ep = None;
        let view = SignalView::new(signal, Some(dec!(55)));
        assert!(view.metrics.is_none());
        assert!(view.change_percent.is_none());
    }

    fn sample_deal(pos: i32) -> default_deals::Model {
        default_deals::Model {
            id: 1,
            admin_signal_id: 7,
            signal_revision: 2,
            symbol: "NIFTYBEES".to_string(),
            etf: None,
            pos,
            position_type: PositionSide::from_pos(pos).as_str().to_string(),
            status: PositionSide::from_pos(pos).status().to_string(),
            qty: dec!(100),
            entry_price: dec!(50),
            current_price: dec!(52),
            investment: dec!(5000),
            current_value: dec!(5200),
            pnl: dec!(200),
            profit_ratio: dec!(4),
            price_change_percent: dec!(4),
            target_price: dec!(52.5),
            target_value: dec!(5250),
            target_pnl_ratio: dec!(5),
            entry_date: None,
            seven_day_price: None,
            seven_day_change: None,
            thirty_day_price: None,
            thirty_day_change: None,
            created_at: None,
            synced_at: None,
        }
    }

    #[test]
    fn test_deal_view_recomputes_open_deal() {
        let view = DealView::new(sample_deal(1), Some(dec!(55)));
        assert!(view.live);
        assert_eq!(view.deal.current_price, dec!(55));
        assert_eq!(view.deal.pnl, dec!(500.00));
    }

    #[test]
    fn test_deal_view_keeps_closed_deal_as_stored() {
        let view = DealView::new(sample_deal(0), Some(dec!(55)));
        assert!(!view.live);
        assert_eq!(view.deal.current_price, dec!(52));
        assert_eq!(view.deal.pnl, dec!(200));
        assert_eq!(view.deal.status, "CLOSED");
    }
}

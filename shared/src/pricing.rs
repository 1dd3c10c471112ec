//! Derived deal fields: investment, P&L, percentage change and target price.
//!
//! Every caller (projection, read-time refresh, user deals, API views) goes
//! through [`DealMetrics::compute`], so the formulas live in one place.

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Direction of a signal, decoded from the `pos` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PositionSide {
    Long,
    Short,
    Closed,
}

impl PositionSide {
    pub fn from_pos(pos: i32) -> Self {
        match pos {
            p if p > 0 => PositionSide::Long,
            p if p < 0 => PositionSide::Short,
            _ => PositionSide::Closed,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PositionSide::Long => "LONG",
            PositionSide::Short => "SHORT",
            PositionSide::Closed => "CLOSED",
        }
    }

    /// Deal status shown on the dashboard.
    pub fn status(&self) -> &'static str {
        match self {
            PositionSide::Closed => "CLOSED",
            _ => "ACTIVE",
        }
    }
}

/// Computed money fields of a deal. Money and percentages are rounded to 2dp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DealMetrics {
    pub investment: Decimal,
    pub current_value: Decimal,
    pub pnl: Decimal,
    /// pnl / investment * 100
    pub profit_ratio: Decimal,
    /// (cmp - ep) / ep * 100
    pub change_percent: Decimal,
    pub target_price: Decimal,
    pub target_value: Decimal,
    pub target_pnl_ratio: Decimal,
}

impl DealMetrics {
    /// Compute the derived fields for `qty` units entered at `entry_price`
    /// and now priced at `current_price`.
    ///
    /// `explicit_target` is the admin-entered target price; when absent the
    /// stepped heuristic of [`target_multiplier`] applies. A closed position
    /// is valued like a long one at its last price.
    pub fn compute(
        entry_price: Decimal,
        current_price: Decimal,
        qty: Decimal,
        side: PositionSide,
        explicit_target: Option<Decimal>,
    ) -> Self {
        let investment = entry_price * qty;
        let current_value = current_price * qty;
        let pnl = match side {
            PositionSide::Short => investment - current_value,
            PositionSide::Long | PositionSide::Closed => current_value - investment,
        };

        let change_percent = percent_change(entry_price, current_price).unwrap_or(Decimal::ZERO);
        let profit_ratio = ratio_percent(pnl, investment);

        let target_price = match explicit_target {
            Some(tp) if tp > Decimal::ZERO => tp,
            _ => entry_price * target_multiplier(change_percent),
        };
        let target_value = target_price * qty;
        let target_pnl_ratio = ratio_percent(target_value - investment, investment);

        Self {
            investment: round_money(investment),
            current_value: round_money(current_value),
            pnl: round_money(pnl),
            profit_ratio: round_money(profit_ratio),
            change_percent: round_money(change_percent),
            target_price: round_money(target_price),
            target_value: round_money(target_value),
            target_pnl_ratio: round_money(target_pnl_ratio),
        }
    }
}

/// Target price multiplier for a price that has moved `change_percent` since
/// entry. Applies to either side: the target tracks the price, not the P&L.
pub fn target_multiplier(change_percent: Decimal) -> Decimal {
    if change_percent > dec!(10) {
        dec!(1.25)
    } else if change_percent > dec!(5) {
        dec!(1.20)
    } else if change_percent > Decimal::ZERO {
        dec!(1.15)
    } else if change_percent > dec!(-5) {
        dec!(1.12)
    } else {
        dec!(1.10)
    }
}

/// Percentage move from `from` to `to`; `None` when `from` is zero.
pub fn percent_change(from: Decimal, to: Decimal) -> Option<Decimal> {
    if from.is_zero() {
        None
    } else {
        Some((to - from) / from * dec!(100))
    }
}

fn ratio_percent(part: Decimal, whole: Decimal) -> Decimal {
    if whole.is_zero() {
        Decimal::ZERO
    } else {
        part / whole * dec!(100)
    }
}

pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// `"4.00%"`
pub fn format_percent(value: Decimal) -> String {
    format!("{:.2}%", round_money(value))
}

/// Parse the free-text numeric columns admins type into the signal sheet.
///
/// Accepts `"12.5%"`, `"₹1,234.50"`, `" +42 "`. Placeholders such as `"--"`,
/// `"N/A"` or `"None"` mean "no value" and yield `None`.
pub fn parse_numeric(raw: &str) -> Option<Decimal> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| !matches!(c, '%' | ',' | '₹' | '$' | ' '))
        .collect();

    match cleaned.to_ascii_lowercase().as_str() {
        "" | "-" | "--" | "n/a" | "na" | "none" | "null" | "nan" => return None,
        _ => {}
    }

    let unsigned = cleaned.strip_prefix('+').unwrap_or(&cleaned);
    Decimal::from_str(unsigned).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_long_position_metrics() {
        let m = DealMetrics::compute(dec!(50.00), dec!(52.00), dec!(100), PositionSide::Long, None);
        assert_eq!(m.investment, dec!(5000.00));
        assert_eq!(m.current_value, dec!(5200.00));
        assert_eq!(m.pnl, dec!(200.00));
        assert_eq!(m.change_percent, dec!(4.00));
        assert_eq!(m.profit_ratio, dec!(4.00));
        // up 4% -> 15% target
        assert_eq!(m.target_price, dec!(57.50));
        assert_eq!(m.target_value, dec!(5750.00));
        assert_eq!(m.target_pnl_ratio, dec!(15.00));
    }

    #[test]
    fn test_short_position_inverts_pnl() {
        let m = DealMetrics::compute(dec!(50), dec!(45), dec!(10), PositionSide::Short, None);
        assert_eq!(m.investment, dec!(500));
        assert_eq!(m.current_value, dec!(450));
        assert_eq!(m.pnl, dec!(50));
        assert_eq!(m.change_percent, dec!(-10));
        assert_eq!(m.profit_ratio, dec!(10));
    }

    #[test]
    fn test_short_target_steps_on_price_change() {
        // price up 20% against a short: pnl is negative, target still steps on the move
        let m = DealMetrics::compute(dec!(100), dec!(120), dec!(1), PositionSide::Short, None);
        assert_eq!(m.change_percent, dec!(20.00));
        assert_eq!(m.profit_ratio, dec!(-20.00));
        assert_eq!(m.target_price, dec!(125.00));

        let m = DealMetrics::compute(dec!(50), dec!(45), dec!(10), PositionSide::Short, None);
        assert_eq!(m.target_price, dec!(55.00));
    }

    #[test]
    fn test_pnl_identity_holds_for_every_side() {
        let cases = [
            (dec!(101.35), dec!(99.10), dec!(7)),
            (dec!(12.5), dec!(19.75), dec!(400)),
            (dec!(250), dec!(250), dec!(3)),
        ];
        for (ep, cmp, qty) in cases {
            let long = DealMetrics::compute(ep, cmp, qty, PositionSide::Long, None);
            let short = DealMetrics::compute(ep, cmp, qty, PositionSide::Short, None);
            assert_eq!(long.investment, round_money(ep * qty));
            assert_eq!(long.pnl, long.current_value - long.investment);
            assert_eq!(short.pnl, short.investment - short.current_value);
        }
    }

    #[test]
    fn test_zero_entry_price_is_guarded() {
        let m = DealMetrics::compute(Decimal::ZERO, dec!(10), dec!(5), PositionSide::Long, None);
        assert_eq!(m.change_percent, Decimal::ZERO);
        assert_eq!(m.profit_ratio, Decimal::ZERO);
        assert_eq!(m.target_pnl_ratio, Decimal::ZERO);
    }

    #[test]
    fn test_explicit_target_wins_over_heuristic() {
        let m = DealMetrics::compute(dec!(100), dec!(120), dec!(2), PositionSide::Long, Some(dec!(150)));
        assert_eq!(m.target_price, dec!(150));
        assert_eq!(m.target_value, dec!(300));
        assert_eq!(m.target_pnl_ratio, dec!(50));
    }

    #[test]
    fn test_target_multiplier_steps() {
        assert_eq!(target_multiplier(dec!(10.01)), dec!(1.25));
        assert_eq!(target_multiplier(dec!(10)), dec!(1.20));
        assert_eq!(target_multiplier(dec!(5)), dec!(1.15));
        assert_eq!(target_multiplier(dec!(0.5)), dec!(1.15));
        assert_eq!(target_multiplier(Decimal::ZERO), dec!(1.12));
        assert_eq!(target_multiplier(dec!(-4.99)), dec!(1.12));
        assert_eq!(target_multiplier(dec!(-5)), dec!(1.10));
    }

    #[test]
    fn test_position_side_from_pos() {
        assert_eq!(PositionSide::from_pos(1), PositionSide::Long);
        assert_eq!(PositionSide::from_pos(-1), PositionSide::Short);
        assert_eq!(PositionSide::from_pos(0), PositionSide::Closed);
        assert_eq!(PositionSide::Closed.status(), "CLOSED");
        assert_eq!(PositionSide::Short.status(), "ACTIVE");
    }

    #[test]
    fn test_parse_numeric() {
        assert_eq!(parse_numeric("12.5%"), Some(dec!(12.5)));
        assert_eq!(parse_numeric("₹1,234.50"), Some(dec!(1234.50)));
        assert_eq!(parse_numeric(" +42 "), Some(dec!(42)));
        assert_eq!(parse_numeric("-3.25%"), Some(dec!(-3.25)));
        assert_eq!(parse_numeric("--"), None);
        assert_eq!(parse_numeric("N/A"), None);
        assert_eq!(parse_numeric("None"), None);
        assert_eq!(parse_numeric(""), None);
        assert_eq!(parse_numeric("abc"), None);
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(dec!(4)), "4.00%");
        assert_eq!(format_percent(dec!(-2.345)), "-2.35%");
    }
}

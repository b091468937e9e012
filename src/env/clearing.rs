//! Clearing house
//!
//! Stateless matching of simulated orders against the resting depth of one
//! snapshot. Fills walk the book level by level; when visible depth runs out
//! the fill is capped and the unfilled remainder is reported back instead of
//! failing the episode.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::book::BookSnapshot;

/// Side of a simulated order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderSide {
    Buy,
    Sell,
}

/// Outcome of matching one order against a snapshot
///
/// `security` is the quantity bought or sold, `cash` the amount spent (buy)
/// or received (sell), and `residual` the unfilled remainder of the request:
/// cash for buys, security units for sells. A non-zero residual means the
/// visible depth was exhausted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct FillReport {
    pub security: Decimal,
    pub cash: Decimal,
    pub residual: Decimal,
}

impl FillReport {
    /// True when the request outran the visible depth
    pub fn is_partial(&self) -> bool {
        self.residual > Decimal::ZERO
    }
}

/// Fill an order against one snapshot's resting depth.
///
/// For buys `requested` is cash to spend; for sells it is security units to
/// deliver. Non-positive requests are no-ops returning a zeroed report.
pub fn fill(snapshot: &BookSnapshot, side: OrderSide, requested: Decimal) -> FillReport {
    if requested <= Decimal::ZERO {
        return FillReport::default();
    }

    match side {
        OrderSide::Buy => fill_buy(snapshot, requested),
        OrderSide::Sell => fill_sell(snapshot, requested),
    }
}

fn fill_buy(snapshot: &BookSnapshot, cash_amount: Decimal) -> FillReport {
    let mut remaining = cash_amount;
    let mut bought = Decimal::ZERO;
    let mut spent = Decimal::ZERO;

    for level in snapshot.asks() {
        if remaining <= Decimal::ZERO {
            break;
        }
        if level.price <= Decimal::ZERO || level.size <= Decimal::ZERO {
            continue;
        }

        let affordable = remaining / level.price;
        if affordable > level.size {
            // Sweep the whole level and move deeper
            let notional = level.notional();
            bought += level.size;
            spent += notional;
            remaining -= notional;
        } else {
            bought += affordable;
            spent += remaining;
            remaining = Decimal::ZERO;
        }
    }

    FillReport {
        security: bought,
        cash: spent,
        residual: remaining,
    }
}

fn fill_sell(snapshot: &BookSnapshot, security_amount: Decimal) -> FillReport {
    let mut remaining = security_amount;
    let mut sold = Decimal::ZERO;
    let mut proceeds = Decimal::ZERO;

    for level in snapshot.bids() {
        if remaining <= Decimal::ZERO {
            break;
        }
        if level.size <= Decimal::ZERO {
            continue;
        }

        if remaining > level.size {
            sold += level.size;
            proceeds += level.notional();
            remaining -= level.size;
        } else {
            sold += remaining;
            proceeds += level.price * remaining;
            remaining = Decimal::ZERO;
        }
    }

    FillReport {
        security: sold,
        cash: proceeds,
        residual: remaining,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book::PriceLevel;
    use rust_decimal_macros::dec;

    fn snapshot() -> BookSnapshot {
        BookSnapshot::new(
            0,
            vec![
                PriceLevel::new(dec!(100), dec!(2)),
                PriceLevel::new(dec!(99), dec!(3)),
            ],
            vec![
                PriceLevel::new(dec!(101), dec!(1)),
                PriceLevel::new(dec!(103), dec!(4)),
            ],
        )
    }

    #[test]
    fn test_buy_fills_exactly_at_top_ask() {
        let report = fill(&snapshot(), OrderSide::Buy, dec!(101));

        assert_eq!(report.security, dec!(1.0));
        assert_eq!(report.cash, dec!(101));
        assert_eq!(report.residual, Decimal::ZERO);
    }

    #[test]
    fn test_buy_walks_into_second_level() {
        // 101 clears level one, 51.5 buys half a unit at 103
        let report = fill(&snapshot(), OrderSide::Buy, dec!(152.5));

        assert_eq!(report.security, dec!(1.5));
        assert_eq!(report.cash, dec!(152.5));
        assert!(!report.is_partial());
    }

    #[test]
    fn test_buy_beyond_total_depth_reports_residual() {
        // Total ask notional: 101 + 412 = 513
        let report = fill(&snapshot(), OrderSide::Buy, dec!(600));

        assert_eq!(report.security, dec!(5));
        assert_eq!(report.cash, dec!(513));
        assert_eq!(report.residual, dec!(87));
        assert!(report.is_partial());
    }

    #[test]
    fn test_sell_walks_bids_best_first() {
        // 2 units at 100, then 1 at 99
        let report = fill(&snapshot(), OrderSide::Sell, dec!(3));

        assert_eq!(report.security, dec!(3));
        assert_eq!(report.cash, dec!(299));
        assert_eq!(report.residual, Decimal::ZERO);
    }

    #[test]
    fn test_sell_beyond_total_depth_reports_residual() {
        let report = fill(&snapshot(), OrderSide::Sell, dec!(8));

        assert_eq!(report.security, dec!(5));
        assert_eq!(report.cash, dec!(497));
        assert_eq!(report.residual, dec!(3));
    }

    #[test]
    fn test_non_positive_requests_are_no_ops() {
        for side in [OrderSide::Buy, OrderSide::Sell] {
            let report = fill(&snapshot(), side, Decimal::ZERO);
            assert_eq!(report, FillReport::default());

            let report = fill(&snapshot(), side, dec!(-5));
            assert_eq!(report, FillReport::default());
        }
    }

    #[test]
    fn test_zero_size_levels_are_skipped() {
        let snapshot = BookSnapshot::new(
            0,
            vec![
                PriceLevel::new(dec!(100), dec!(0)),
                PriceLevel::new(dec!(99), dec!(1)),
            ],
            vec![PriceLevel::new(dec!(101), dec!(1))],
        );

        let report = fill(&snapshot, OrderSide::Sell, dec!(1));
        assert_eq!(report.cash, dec!(99));
    }
}

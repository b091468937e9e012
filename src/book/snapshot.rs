//! Order book snapshot model
//!
//! One immutable snapshot of resting depth per discrete time step.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One resting price level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceLevel {
    pub price: Decimal,
    pub size: Decimal,
}

impl PriceLevel {
    pub fn new(price: Decimal, size: Decimal) -> Self {
        Self { price, size }
    }

    /// Cash value of the whole level
    pub fn notional(&self) -> Decimal {
        self.price * self.size
    }
}

/// Immutable order book snapshot at one time step
///
/// Source ordering is not trusted: bids are re-sorted descending by price and
/// asks ascending on construction, so the best level is always first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookSnapshot {
    time: i64,
    bids: Vec<PriceLevel>,
    asks: Vec<PriceLevel>,
}

impl BookSnapshot {
    pub fn new(time: i64, mut bids: Vec<PriceLevel>, mut asks: Vec<PriceLevel>) -> Self {
        bids.sort_by(|a, b| b.price.cmp(&a.price));
        asks.sort_by(|a, b| a.price.cmp(&b.price));
        Self { time, bids, asks }
    }

    pub fn time(&self) -> i64 {
        self.time
    }

    /// Bid levels, best (highest) first
    pub fn bids(&self) -> &[PriceLevel] {
        &self.bids
    }

    /// Ask levels, best (lowest) first
    pub fn asks(&self) -> &[PriceLevel] {
        &self.asks
    }

    /// Highest resting bid
    pub fn best_bid(&self) -> Option<&PriceLevel> {
        self.bids.first()
    }

    /// Lowest resting ask
    pub fn best_ask(&self) -> Option<&PriceLevel> {
        self.asks.first()
    }

    /// Total size resting on the bid side
    pub fn bid_volume(&self) -> Decimal {
        self.bids.iter().map(|l| l.size).sum()
    }

    /// Total size resting on the ask side
    pub fn ask_volume(&self) -> Decimal {
        self.asks.iter().map(|l| l.size).sum()
    }

    /// Volume imbalance over all levels:
    /// `(ask_volume - bid_volume) / (ask_volume + bid_volume)`.
    ///
    /// Range -1 (all bids) to +1 (all asks); zero total depth yields the
    /// sentinel zero instead of NaN.
    pub fn volume_imbalance(&self) -> Decimal {
        let bid_sum = self.bid_volume();
        let ask_sum = self.ask_volume();
        let total = bid_sum + ask_sum;

        if total.is_zero() {
            return Decimal::ZERO;
        }

        (ask_sum - bid_sum) / total
    }

    /// Best bid price as an agent-facing float, zero when the side is empty
    pub fn top_bid_f32(&self) -> f32 {
        self.best_bid()
            .and_then(|l| l.price.to_f32())
            .unwrap_or(0.0)
    }

    /// Best ask price as an agent-facing float, zero when the side is empty
    pub fn top_ask_f32(&self) -> f32 {
        self.best_ask()
            .and_then(|l| l.price.to_f32())
            .unwrap_or(0.0)
    }
}

//! Portfolio ledger
//!
//! Cash and security balances for one episode. Balances stay non-negative
//! because fills never spend more cash or deliver more security than the
//! executor allocated.

use rust_decimal::Decimal;
use serde::Serialize;

use super::clearing::FillReport;

/// Mutable cash/security balances
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PortfolioLedger {
    pub cash: Decimal,
    pub security: Decimal,
}

impl PortfolioLedger {
    pub fn new(cash: Decimal, security: Decimal) -> Self {
        Self { cash, security }
    }

    /// Settle a buy fill: cash out, security in
    pub fn apply_buy(&mut self, report: &FillReport) {
        self.cash -= report.cash;
        self.security += report.security;
    }

    /// Settle a sell fill: security out, cash in
    pub fn apply_sell(&mut self, report: &FillReport) {
        self.security -= report.security;
        self.cash += report.cash;
    }
}

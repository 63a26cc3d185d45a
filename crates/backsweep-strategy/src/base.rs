//! Shared economics every reference strategy embeds by composition.
//!
//! Rust has no implementation-inheriting base class, so `BaseBook` is a
//! concrete struct a strategy holds as a field and delegates to, rather than
//! a superclass it derives from.

use backsweep_core::metrics;

use crate::traits::StrategyStats;

/// Cash/position ledger plus equity history, shared by every reference
/// strategy. Starts at `cash = 100_000`, `position = 0`.
#[derive(Debug, Clone)]
pub struct BaseBook {
    pub cash: f64,
    pub position: f64,
    pub initial_value: f64,
    pub trade_count: u64,
    pub equity_history: Vec<f64>,
    pub fee_rate: f64,
}

impl Default for BaseBook {
    fn default() -> Self {
        Self {
            cash: 100_000.0,
            position: 0.0,
            initial_value: 100_000.0,
            trade_count: 0,
            equity_history: Vec::new(),
            fee_rate: 0.0,
        }
    }
}

impl BaseBook {
    pub fn with_fee_rate(fee_rate: f64) -> Self {
        Self {
            fee_rate,
            ..Self::default()
        }
    }

    /// Mark-to-market equity at `price`.
    pub fn equity_at(&self, price: f64) -> f64 {
        self.cash + self.position * price
    }

    /// Record the current mark-to-market equity for this batch.
    pub fn push_equity(&mut self, price: f64) {
        self.equity_history.push(self.equity_at(price));
    }

    /// Attempt to buy `qty` units at `price`. Returns `false` (no mutation)
    /// if `cash < price * qty * (1 + fee_rate)`.
    pub fn execute_buy(&mut self, price: f64, qty: f64) -> bool {
        let total = price * qty * (1.0 + self.fee_rate);
        if self.cash < total {
            return false;
        }
        self.cash -= total;
        self.position += qty;
        self.trade_count += 1;
        true
    }

    /// Attempt to sell `qty` units at `price`. Returns `false` (no mutation)
    /// if `position < qty`.
    pub fn execute_sell(&mut self, price: f64, qty: f64) -> bool {
        if self.position < qty {
            return false;
        }
        self.position -= qty;
        self.cash += price * qty * (1.0 - self.fee_rate);
        self.trade_count += 1;
        true
    }

    /// Build a [`StrategyStats`] from the current ledger, pre-populating
    /// `max_dd` and `sharpe` from the equity history.
    pub fn stats(&self, name: impl Into<String>) -> StrategyStats {
        let final_equity = self.equity_history.last().copied().unwrap_or(self.initial_value);
        let roi = metrics::roi(final_equity, self.initial_value);
        StrategyStats::new(name, roi, self.trade_count)
            .with_metric("max_dd", metrics::max_drawdown(&self.equity_history))
            .with_metric("sharpe", metrics::sharpe(&self.equity_history))
            .with_metric("pnl", final_equity - self.initial_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buy_with_fee_scenario() {
        let mut book = BaseBook::with_fee_rate(0.001);
        assert!(book.execute_buy(10_000.0, 1.0));
        assert!((book.cash - 89_990.0).abs() < 1e-6);
        assert_eq!(book.position, 1.0);
        assert_eq!(book.trade_count, 1);
    }

    #[test]
    fn sell_with_fee_scenario() {
        let mut book = BaseBook::with_fee_rate(0.001);
        book.cash = 0.0;
        book.position = 1.0;
        assert!(book.execute_sell(20_000.0, 1.0));
        assert!((book.cash - 19_980.0).abs() < 1e-6);
        assert_eq!(book.position, 0.0);
        assert_eq!(book.trade_count, 1);
    }

    #[test]
    fn buy_rejected_on_insufficient_cash() {
        let mut book = BaseBook::default();
        book.cash = 10.0;
        let (cash, position, trade_count) = (book.cash, book.position, book.trade_count);
        assert!(!book.execute_buy(10_000.0, 1.0));
        assert_eq!(book.cash, cash);
        assert_eq!(book.position, position);
        assert_eq!(book.trade_count, trade_count);
    }

    #[test]
    fn sell_rejected_on_insufficient_position() {
        let mut book = BaseBook::default();
        assert!(!book.execute_sell(100.0, 1.0));
        assert_eq!(book.trade_count, 0);
    }
}

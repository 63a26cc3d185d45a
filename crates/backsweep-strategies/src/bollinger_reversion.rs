//! Bollinger-band mean reversion, computed fresh within each batch.
//!
//! The rolling window is per-batch only — there is no cross-batch history,
//! so a batch shorter than `window` never trades. This is a documented
//! limitation, not a bug: an accurate cross-batch rolling window is out of
//! scope.

use backsweep_sampler::ParamAssignment;
use backsweep_strategy::{BaseBook, Strategy, StrategyContext, StrategyStats};

pub struct BollingerReversion {
    book: BaseBook,
    window: usize,
    std_dev: f64,
    last_price: f64,
}

impl Default for BollingerReversion {
    fn default() -> Self {
        Self {
            book: BaseBook::default(),
            window: 200,
            std_dev: 2.0,
            last_price: 0.0,
        }
    }
}

impl BollingerReversion {
    pub fn boxed() -> Box<dyn Strategy> {
        Box::new(Self::default())
    }
}

impl Strategy for BollingerReversion {
    fn set_params(&mut self, params: &ParamAssignment) {
        if let Some(w) = params.get("window").and_then(|v| v.as_i64()) {
            self.window = w.max(0) as usize;
        }
        if let Some(k) = params.get("std_dev") {
            self.std_dev = k.as_f64();
        }
        if let Some(f) = params.get("fee_rate") {
            self.book.fee_rate = f.as_f64();
        }
    }

    fn on_start(&mut self, _ctx: &StrategyContext) {}

    fn on_ticks(
        &mut self,
        prices: &[f64],
        _qtys: &[f64],
        _sides: &[i8],
        _symbol_id: &[i64],
        _ctx: &StrategyContext,
    ) {
        self.last_price = *prices.last().expect("batch has at least one row");

        if prices.len() < self.window {
            self.book.push_equity(self.last_price);
            return;
        }

        let recent = &prices[prices.len() - self.window..];
        let mean = recent.iter().sum::<f64>() / recent.len() as f64;
        let variance = recent.iter().map(|p| (p - mean).powi(2)).sum::<f64>() / recent.len() as f64;
        let std = variance.sqrt();

        let upper = mean + self.std_dev * std;
        let lower = mean - self.std_dev * std;
        let current = self.last_price;

        if current < lower && self.book.position <= 0.0 {
            self.book.execute_buy(current, 1.0);
        } else if current > upper && self.book.position >= 0.0 {
            self.book.execute_sell(current, 1.0);
        }

        self.book.push_equity(current);
    }

    fn on_finish(&mut self, _ctx: &StrategyContext) {}

    fn get_stats(&self) -> StrategyStats {
        self.book
            .stats("BollingerReversion")
            .with_metric("window", self.window as f64)
            .with_metric("std_dev", self.std_dev)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_shorter_than_window_does_not_trade() {
        let mut strategy = BollingerReversion::default();
        strategy.window = 200;
        strategy.on_ticks(
            &[100.0, 101.0, 99.0],
            &[1.0, 1.0, 1.0],
            &[1, 1, -1],
            &[0, 0, 0],
            &StrategyContext,
        );
        assert_eq!(strategy.book.trade_count, 0);
        assert_eq!(strategy.book.equity_history.len(), 1);
    }

    #[test]
    fn dip_below_lower_band_triggers_buy() {
        let mut strategy = BollingerReversion::default();
        strategy.window = 5;
        strategy.std_dev = 1.0;
        let prices = [100.0, 100.0, 100.0, 100.0, 50.0];
        strategy.on_ticks(&prices, &[1.0; 5], &[1; 5], &[0; 5], &StrategyContext);
        assert_eq!(strategy.book.trade_count, 1);
        assert_eq!(strategy.book.position, 1.0);
    }

    #[test]
    fn flat_series_has_zero_band_width_and_no_trade() {
        let mut strategy = BollingerReversion::default();
        strategy.window = 4;
        let prices = [100.0, 100.0, 100.0, 100.0];
        strategy.on_ticks(&prices, &[1.0; 4], &[1; 4], &[0; 4], &StrategyContext);
        assert_eq!(strategy.book.trade_count, 0);
    }
}

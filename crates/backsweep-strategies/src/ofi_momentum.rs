//! Order-Flow-Imbalance momentum: buys into sustained taker-buy pressure,
//! sells into sustained taker-sell pressure.

use backsweep_sampler::ParamAssignment;
use backsweep_strategy::{BaseBook, Strategy, StrategyContext, StrategyStats};

/// OFI momentum strategy. `ofi_sum` is an exponentially decayed running sum
/// of signed batch order flow (`Σ qty·side`); crossing `±threshold` triggers
/// a one-unit position flip.
pub struct OfiMomentum {
    book: BaseBook,
    window: i64,
    threshold: f64,
    decay: f64,
    ofi_sum: f64,
    last_price: f64,
}

impl Default for OfiMomentum {
    fn default() -> Self {
        Self {
            book: BaseBook::default(),
            window: 100,
            threshold: 5.0,
            decay: 0.0,
            ofi_sum: 0.0,
            last_price: 0.0,
        }
    }
}

impl OfiMomentum {
    pub fn boxed() -> Box<dyn Strategy> {
        Box::new(Self::default())
    }
}

impl Strategy for OfiMomentum {
    fn set_params(&mut self, params: &ParamAssignment) {
        if let Some(w) = params.get("window").and_then(|v| v.as_i64()) {
            self.window = w;
        }
        if let Some(t) = params.get("threshold") {
            self.threshold = t.as_f64();
        }
        if let Some(f) = params.get("fee_rate") {
            self.book.fee_rate = f.as_f64();
        }
    }

    fn on_start(&mut self, _ctx: &StrategyContext) {
        self.decay = if self.window < 2 {
            0.0
        } else {
            1.0 - 1.0 / self.window as f64
        };
    }

    fn on_ticks(
        &mut self,
        prices: &[f64],
        qtys: &[f64],
        sides: &[i8],
        _symbol_id: &[i64],
        _ctx: &StrategyContext,
    ) {
        self.last_price = *prices.last().expect("batch has at least one row");
        let net_flow: f64 = qtys.iter().zip(sides).map(|(q, s)| q * *s as f64).sum();
        self.ofi_sum = self.ofi_sum * self.decay + net_flow;

        if self.ofi_sum > self.threshold && self.book.position <= 0.0 {
            self.book.execute_buy(self.last_price, 1.0);
        } else if self.ofi_sum < -self.threshold && self.book.position >= 0.0 {
            self.book.execute_sell(self.last_price, 1.0);
        }

        self.book.push_equity(self.last_price);
    }

    fn on_finish(&mut self, _ctx: &StrategyContext) {}

    fn get_stats(&self) -> StrategyStats {
        self.book
            .stats("OfiMomentum")
            .with_metric("window", self.window as f64)
            .with_metric("threshold", self.threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ofi_window_one_has_zero_decay() {
        let mut strategy = OfiMomentum::default();
        strategy.window = 1;
        strategy.on_start(&StrategyContext);
        assert_eq!(strategy.decay, 0.0);
    }

    #[test]
    fn ofi_tick_scenario_triggers_buy() {
        let mut strategy = OfiMomentum::default();
        strategy.window = 10;
        strategy.threshold = 5.0;
        strategy.on_start(&StrategyContext);
        assert!((strategy.decay - 0.9).abs() < 1e-9);

        strategy.on_ticks(&[100.0, 101.0], &[10.0, 10.0], &[1, 1], &[0, 0], &StrategyContext);

        assert!((strategy.ofi_sum - 20.0).abs() < 1e-9);
        assert_eq!(strategy.book.position, 1.0);
        assert_eq!(strategy.book.trade_count, 1);
    }

    #[test]
    fn does_not_flip_an_already_long_position() {
        let mut strategy = OfiMomentum::default();
        strategy.window = 10;
        strategy.threshold = 5.0;
        strategy.on_start(&StrategyContext);
        strategy.on_ticks(&[100.0], &[10.0], &[1], &[0], &StrategyContext);
        assert_eq!(strategy.book.trade_count, 1);
        strategy.on_ticks(&[100.0], &[10.0], &[1], &[0], &StrategyContext);
        // ofi_sum still positive and position already long -> no second buy
        assert_eq!(strategy.book.trade_count, 1);
    }
}

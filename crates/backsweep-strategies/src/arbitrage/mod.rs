//! Cross-venue arbitrage simulator.
//!
//! Does not embed [`backsweep_strategy::BaseBook`]: this strategy keeps one
//! `{usd, btc}` balance pair per venue rather than a single cash/position
//! pair, so the shared single-venue economics don't fit. Balances live
//! entirely on this instance — no process-global state.

use std::collections::HashMap;

use backsweep_core::metrics;
use backsweep_sampler::ParamAssignment;
use backsweep_strategy::{Strategy, StrategyContext, StrategyStats};

#[cfg(feature = "live")]
pub mod live;

/// Fixed trade volume in BTC.
const TRADE_VOLUME: f64 = 0.01;

/// Venue table a row's `symbol_id` indexes into. `symbol_id` values outside
/// this range are silently ignored (an unrecognized venue, not a fatal
/// error).
pub const DEFAULT_VENUES: [&str; 12] = [
    "Bitfinex",
    "Binance",
    "Coinbase",
    "Kraken",
    "Huobi",
    "OKX",
    "KuCoin",
    "Gate.io",
    "Bitstamp",
    "Gemini",
    "Poloniex",
    "Crypto.com",
];

#[derive(Debug, Clone, Copy)]
struct VenueBalance {
    usd: f64,
    btc: f64,
}

impl Default for VenueBalance {
    fn default() -> Self {
        Self {
            usd: 100_000.0,
            btc: 1.0,
        }
    }
}

/// One executed arbitrage trade.
#[derive(Debug, Clone)]
pub struct TradeRecord {
    pub buy_venue: String,
    pub sell_venue: String,
    pub cost: f64,
    pub revenue: f64,
    pub net_profit: f64,
}

pub struct CrossVenueArbitrage {
    venues: Vec<String>,
    balances: HashMap<String, VenueBalance>,
    latest_price: HashMap<String, f64>,
    min_profit: f64,
    slippage_rate: f64,
    total_profit: f64,
    trade_count: u64,
    trades: Vec<TradeRecord>,
    equity_history: Vec<f64>,
    initial_value: f64,
}

impl Default for CrossVenueArbitrage {
    fn default() -> Self {
        Self::with_venues(DEFAULT_VENUES.iter().map(|v| v.to_string()).collect())
    }
}

impl CrossVenueArbitrage {
    pub fn with_venues(venues: Vec<String>) -> Self {
        let balances: HashMap<String, VenueBalance> = venues
            .iter()
            .map(|v| (v.clone(), VenueBalance::default()))
            .collect();
        let initial_value = venues.len() as f64 * VenueBalance::default().usd;
        Self {
            venues,
            balances,
            latest_price: HashMap::new(),
            min_profit: 0.0,
            slippage_rate: 0.001,
            total_profit: 0.0,
            trade_count: 0,
            trades: Vec::new(),
            equity_history: Vec::new(),
            initial_value,
        }
    }

    pub fn boxed() -> Box<dyn Strategy> {
        Box::new(Self::default())
    }

    pub fn trades(&self) -> &[TradeRecord] {
        &self.trades
    }

    fn portfolio_value(&self) -> f64 {
        self.venues
            .iter()
            .map(|v| {
                let balance = self.balances[v];
                let price = self.latest_price.get(v).copied().unwrap_or(0.0);
                balance.usd + balance.btc * price
            })
            .sum()
    }

    fn venue_for(&self, symbol_id: i64) -> Option<&str> {
        usize::try_from(symbol_id)
            .ok()
            .and_then(|idx| self.venues.get(idx))
            .map(String::as_str)
    }
}

impl Strategy for CrossVenueArbitrage {
    fn set_params(&mut self, params: &ParamAssignment) {
        if let Some(p) = params.get("min_profit") {
            self.min_profit = p.as_f64();
        }
        if let Some(p) = params.get("slippage_rate") {
            self.slippage_rate = p.as_f64();
        }
    }

    fn on_start(&mut self, _ctx: &StrategyContext) {}

    fn on_ticks(
        &mut self,
        prices: &[f64],
        _qtys: &[f64],
        _sides: &[i8],
        symbol_id: &[i64],
        _ctx: &StrategyContext,
    ) {
        for (&price, &sym) in prices.iter().zip(symbol_id) {
            let Some(venue) = self.venue_for(sym) else {
                continue;
            };
            let venue = venue.to_string();
            self.latest_price.insert(venue.clone(), price);

            if self.latest_price.len() < 2 {
                continue;
            }

            let (buy_venue, &p_buy) = self
                .latest_price
                .iter()
                .min_by(|a, b| a.1.partial_cmp(b.1).unwrap())
                .unwrap();
            let (sell_venue, &p_sell) = self
                .latest_price
                .iter()
                .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
                .unwrap();
            let (buy_venue, sell_venue) = (buy_venue.clone(), sell_venue.clone());

            if venue != buy_venue && venue != sell_venue {
                continue;
            }
            if buy_venue == sell_venue {
                continue;
            }

            let cost = TRADE_VOLUME * p_buy * (1.0 + self.slippage_rate);
            let revenue = TRADE_VOLUME * p_sell * (1.0 - self.slippage_rate);
            let net = revenue - cost;

            let has_funds = self.balances[&buy_venue].usd >= cost;
            let has_inventory = self.balances[&sell_venue].btc >= TRADE_VOLUME;

            if has_funds && has_inventory && net > self.min_profit {
                self.balances.get_mut(&buy_venue).unwrap().usd -= cost;
                self.balances.get_mut(&buy_venue).unwrap().btc += TRADE_VOLUME;
                self.balances.get_mut(&sell_venue).unwrap().btc -= TRADE_VOLUME;
                self.balances.get_mut(&sell_venue).unwrap().usd += revenue;
                self.total_profit += net;
                self.trade_count += 1;
                self.trades.push(TradeRecord {
                    buy_venue,
                    sell_venue,
                    cost,
                    revenue,
                    net_profit: net,
                });
            }
        }

        self.equity_history.push(self.portfolio_value());
    }

    fn on_finish(&mut self, _ctx: &StrategyContext) {}

    fn get_stats(&self) -> StrategyStats {
        let final_value = self.equity_history.last().copied().unwrap_or(self.initial_value);
        StrategyStats::new("CrossVenueArbitrage", metrics::roi(final_value, self.initial_value), self.trade_count)
            .with_metric("max_dd", metrics::max_drawdown(&self.equity_history))
            .with_metric("sharpe", metrics::sharpe(&self.equity_history))
            .with_metric("total_profit", self.total_profit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn venues_ab() -> CrossVenueArbitrage {
        CrossVenueArbitrage::with_venues(vec!["A".to_string(), "B".to_string()])
    }

    #[test]
    fn single_venue_does_not_trade() {
        let mut strategy = venues_ab();
        strategy.on_ticks(&[30_000.0], &[0.0], &[1], &[0], &StrategyContext);
        assert_eq!(strategy.trade_count, 0);
    }

    #[test]
    fn arbitrage_trade_scenario() {
        let mut strategy = venues_ab();
        strategy.min_profit = 2.0;
        strategy.slippage_rate = 0.001;

        strategy.on_ticks(&[30_000.0], &[0.0], &[1], &[0], &StrategyContext);
        strategy.on_ticks(&[30_500.0], &[0.0], &[1], &[1], &StrategyContext);

        assert_eq!(strategy.trade_count, 1);
        let trade = &strategy.trades()[0];
        // cost = 0.01 * 30_000 * 1.001, revenue = 0.01 * 30_500 * 0.999
        assert!((trade.cost - 300.30).abs() < 1e-6, "cost={}", trade.cost);
        assert!((trade.revenue - 304.695).abs() < 1e-6, "revenue={}", trade.revenue);
        assert!((trade.net_profit - 4.395).abs() < 1e-6, "net={}", trade.net_profit);

        assert!((strategy.balances["A"].usd - (100_000.0 - trade.cost)).abs() < 1e-6);
        assert!((strategy.balances["B"].usd - (100_000.0 + trade.revenue)).abs() < 1e-6);
        assert!((strategy.balances["A"].btc - 1.01).abs() < 1e-9);
        assert!((strategy.balances["B"].btc - 0.99).abs() < 1e-9);
    }

    #[test]
    fn below_min_profit_does_not_trade() {
        let mut strategy = venues_ab();
        strategy.min_profit = 1000.0;
        strategy.on_ticks(&[30_000.0], &[0.0], &[1], &[0], &StrategyContext);
        strategy.on_ticks(&[30_500.0], &[0.0], &[1], &[1], &StrategyContext);
        assert_eq!(strategy.trade_count, 0);
    }

    #[test]
    fn unknown_symbol_id_is_ignored() {
        let mut strategy = venues_ab();
        strategy.on_ticks(&[30_000.0], &[0.0], &[1], &[99], &StrategyContext);
        assert!(strategy.latest_price.is_empty());
    }
}
